//! Request descriptor: everything the guard chain and the terminal handler need
//! to know about one inbound request.

use crate::error::{ApiError, ErrorCause};
use crate::model::{Entity, Filter, Model, QueryOptions};
use crate::request::{parse_query, Action, HttpVerb, Plurality};
use serde_json::{json, Map, Value};

/// Raw material collected by the route before descriptor building.
#[derive(Clone, Debug)]
pub struct RequestContext {
    /// Correlation token, echoed in logs and error messages.
    pub id: String,
    pub verb: HttpVerb,
    pub plurality: Plurality,
    /// Id segment of a singular route, if any.
    pub url_id: Option<String>,
    pub query: Vec<(String, String)>,
    /// Parsed JSON body, `Value::Null` when the request has none.
    pub body: Value,
}

#[derive(Clone, Debug)]
pub struct RequestDescriptor {
    pub id: String,
    pub model: String,
    pub plurality: Plurality,
    pub action: Action,
    pub verb: HttpVerb,
    pub filter: Filter,
    pub options: QueryOptions,
    pub raw: Map<String, Value>,
    pub body: Value,
    pub url_id: Option<String>,
    /// Entity designated by `url_id`, fetched before any guard runs.
    pub target: Option<Entity>,
}

impl RequestDescriptor {
    /// Resolve the request against `model`.
    ///
    /// An explicit id in the URL overrides any query filter and must name an
    /// existing entity; inserting at an explicit id is refused.
    pub async fn build(ctx: RequestContext, model: &dyn Model) -> Result<Self, ApiError> {
        let parsed = parse_query(&ctx.query)?;
        let mut descriptor = Self {
            id: ctx.id,
            model: model.name().to_string(),
            plurality: ctx.plurality,
            action: ctx.verb.action(),
            verb: ctx.verb,
            filter: parsed.filter,
            options: parsed.options,
            raw: parsed.raw,
            body: ctx.body,
            url_id: None,
            target: None,
        };

        let url_id = match (descriptor.plurality, ctx.url_id) {
            (Plurality::Singular, Some(id)) if !id.is_empty() => id,
            _ => return Ok(descriptor),
        };
        if descriptor.action == Action::Insert {
            return Err(ApiError::method_not_allowed(Some(ErrorCause::Request(
                "POST (insert) to explicit ID is forbidden".into(),
            ))));
        }

        let mut by_id = Filter::new();
        by_id.insert("id".into(), Value::String(url_id.clone()));
        let target = model
            .find(&by_id, &QueryOptions::default())
            .await?
            .ok_or_else(|| ApiError::not_found(None))?;

        descriptor.filter = by_id;
        descriptor.url_id = Some(url_id);
        descriptor.target = Some(target);
        Ok(descriptor)
    }

    /// Log-friendly view: drops the target entity, reports whether it was found.
    pub fn loggable(&self) -> Value {
        json!({
            "model": self.model,
            "action": self.action,
            "plurality": self.plurality,
            "filter": self.filter,
            "options": self.options,
            "body": self.body,
            "urlId": self.url_id,
            "targetFound": self.url_id.as_ref().map(|_| self.target.is_some()),
        })
    }

    /// Body as a single JSON object.
    pub fn body_object(&self) -> Option<&Map<String, Value>> {
        self.body.as_object()
    }
}
