//! Terminal CRUD handlers: find, insert, update, delete, replace.

use crate::error::{ApiError, ErrorCause};
use crate::model::{Entity, Model};
use crate::request::{Action, Plurality, RequestDescriptor};
use crate::response::{maybe_empty_set, maybe_entity, no_content};
use axum::http::StatusCode;
use axum::response::Response;
use serde_json::{Map, Value};

/// Run the built-in handler for `action`.
pub async fn execute(
    action: Action,
    plurality: Plurality,
    request: &RequestDescriptor,
    model: &dyn Model,
) -> Result<Response, ApiError> {
    match action {
        Action::Find => find(plurality, request, model).await,
        Action::Insert => insert(plurality, request, model).await,
        Action::Update => update(plurality, request, model).await,
        Action::Delete => delete(plurality, request, model).await,
        Action::Replace => replace(plurality, request, model).await,
    }
}

fn require_filter(request: &RequestDescriptor) -> Result<(), ApiError> {
    if request.filter.is_empty() {
        return Err(ApiError::where_clause_required(request.verb.as_str()));
    }
    Ok(())
}

fn single_object(body: &Value) -> Result<Map<String, Value>, ApiError> {
    body.as_object().cloned().ok_or_else(|| {
        ApiError::malformed_query(Some(ErrorCause::Request("Expected a single object".into())))
    })
}

fn object_array(body: &Value) -> Result<Vec<Map<String, Value>>, ApiError> {
    let not_array = || ApiError::malformed_query(Some(ErrorCause::Request("Expected an array of objects".into())));
    body.as_array()
        .ok_or_else(not_array)?
        .iter()
        .map(|item| item.as_object().cloned().ok_or_else(not_array))
        .collect()
}

/// No filter means everything.
pub async fn find(plurality: Plurality, request: &RequestDescriptor, model: &dyn Model) -> Result<Response, ApiError> {
    match plurality {
        Plurality::Singular => {
            let found = model.find(&request.filter, &request.options).await?;
            Ok(maybe_entity(found, StatusCode::OK))
        }
        Plurality::Plural => {
            let found = model.find_many(&request.filter, &request.options).await?;
            Ok(maybe_empty_set(found, StatusCode::OK))
        }
    }
}

pub async fn insert(plurality: Plurality, request: &RequestDescriptor, model: &dyn Model) -> Result<Response, ApiError> {
    match plurality {
        Plurality::Singular => {
            let attributes = single_object(&request.body)?;
            let created = model.persist(model.spawn(attributes)).await?;
            Ok(maybe_entity(Some(created), StatusCode::CREATED))
        }
        Plurality::Plural => {
            let items = object_array(&request.body)?;
            let created = model.persist_many(model.spawn_many(items)).await?;
            Ok(maybe_empty_set(created, StatusCode::CREATED))
        }
    }
}

pub async fn update(plurality: Plurality, request: &RequestDescriptor, model: &dyn Model) -> Result<Response, ApiError> {
    require_filter(request)?;
    let changes = single_object(&request.body)?;
    match plurality {
        Plurality::Singular => {
            let updated = model.update(&request.filter, &changes, &request.options).await?;
            Ok(maybe_entity(updated, StatusCode::OK))
        }
        Plurality::Plural => {
            let updated = model.update_many(&request.filter, &changes, &request.options).await?;
            Ok(maybe_empty_set(updated, StatusCode::OK))
        }
    }
}

/// Always 204, however many records matched.
pub async fn delete(plurality: Plurality, request: &RequestDescriptor, model: &dyn Model) -> Result<Response, ApiError> {
    require_filter(request)?;
    match plurality {
        Plurality::Singular => model.delete(&request.filter, &request.options).await?,
        Plurality::Plural => model.delete_many(&request.filter, &request.options).await?,
    }
    Ok(no_content())
}

/// Overwrite every attribute but the identity. Nothing to replace gives 204.
pub async fn replace(plurality: Plurality, request: &RequestDescriptor, model: &dyn Model) -> Result<Response, ApiError> {
    require_filter(request)?;
    let attributes = single_object(&request.body)?;
    let replaced = |mut entity: Entity| {
        entity.replace_attributes(attributes.clone());
        entity
    };
    match plurality {
        Plurality::Singular => {
            let Some(found) = model.find(&request.filter, &request.options).await? else {
                return Ok(maybe_entity(None, StatusCode::OK));
            };
            let persisted = model.persist(replaced(found)).await?;
            Ok(maybe_entity(Some(persisted), StatusCode::OK))
        }
        Plurality::Plural => {
            let found = model.find_many(&request.filter, &request.options).await?;
            let persisted = model.persist_many(found.into_iter().map(replaced).collect()).await?;
            Ok(maybe_empty_set(persisted, StatusCode::OK))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiErrorKind;
    use crate::model::{Filter, QueryOptions};
    use crate::request::HttpVerb;
    use crate::store::MemoryModel;
    use serde_json::json;

    fn descriptor(verb: HttpVerb, plurality: Plurality, filter: Value, body: Value) -> RequestDescriptor {
        RequestDescriptor {
            id: "test".into(),
            model: "PhoneBook".into(),
            plurality,
            action: verb.action(),
            verb,
            filter: filter.as_object().cloned().unwrap_or_default(),
            options: QueryOptions::default(),
            raw: Map::new(),
            body,
            url_id: None,
            target: None,
        }
    }

    fn phonebook() -> MemoryModel {
        let model = MemoryModel::new("PhoneBook").required(["name"]);
        model
            .seed(vec![
                json!({"name": "Alice", "email": "dup@x.com"}).as_object().cloned().unwrap_or_default(),
                json!({"name": "Bob", "email": "dup@x.com"}).as_object().cloned().unwrap_or_default(),
            ])
            .unwrap();
        model
    }

    #[tokio::test]
    async fn writes_without_filter_never_reach_the_model() {
        let model = phonebook();
        for verb in [HttpVerb::Patch, HttpVerb::Delete, HttpVerb::Put] {
            for plurality in Plurality::ALL {
                let request = descriptor(verb, plurality, json!({}), json!({"name": "Zed"}));
                let err = execute(verb.action(), plurality, &request, &model).await.unwrap_err();
                assert_eq!(err.kind(), ApiErrorKind::MalformedQuery);
                assert_eq!(
                    err.to_json("test")["message"],
                    json!(format!("{} requires a \"where\" clause", verb))
                );
            }
        }
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn find_without_match_is_no_content() {
        let model = phonebook();
        let request = descriptor(HttpVerb::Get, Plurality::Plural, json!({"email": "x@y.com"}), Value::Null);
        let response = execute(Action::Find, Plurality::Plural, &request, &model).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let request = descriptor(HttpVerb::Get, Plurality::Singular, json!({"email": "x@y.com"}), Value::Null);
        let response = execute(Action::Find, Plurality::Singular, &request, &model).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn insert_checks_body_shape() {
        let model = phonebook();
        let request = descriptor(HttpVerb::Post, Plurality::Singular, json!({}), json!([{"name": "A"}]));
        let err = execute(Action::Insert, Plurality::Singular, &request, &model).await.unwrap_err();
        assert_eq!(err.kind(), ApiErrorKind::MalformedQuery);
        let request = descriptor(HttpVerb::Post, Plurality::Plural, json!({}), json!([{"name": "A"}, 3]));
        let err = execute(Action::Insert, Plurality::Plural, &request, &model).await.unwrap_err();
        assert_eq!(err.kind(), ApiErrorKind::MalformedQuery);
        assert_eq!(model.len(), 2);
    }

    #[tokio::test]
    async fn insert_validation_failure_is_forbidden() {
        let model = phonebook();
        let request = descriptor(HttpVerb::Post, Plurality::Singular, json!({}), json!({"email": "a@b.c"}));
        let err = execute(Action::Insert, Plurality::Singular, &request, &model).await.unwrap_err();
        assert_eq!(err.kind(), ApiErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn replace_keeps_identity_and_drops_old_attributes() {
        let model = phonebook();
        let request = descriptor(HttpVerb::Put, Plurality::Plural, json!({"email": "dup@x.com"}), json!({"name": "Same"}));
        let response = execute(Action::Replace, Plurality::Plural, &request, &model).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let stored = model.find_many(&Filter::new(), &QueryOptions::default()).await.unwrap();
        assert_eq!(stored.len(), 2);
        assert!(stored.iter().all(|e| e.attributes.get("email").is_none() && e.attributes["name"] == json!("Same")));
    }

    #[tokio::test]
    async fn replace_without_match_is_no_content_not_not_found() {
        let model = phonebook();
        let request = descriptor(HttpVerb::Put, Plurality::Singular, json!({"email": "none"}), json!({"name": "X"}));
        let response = execute(Action::Replace, Plurality::Singular, &request, &model).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }
}
