//! Model routes generated from the resolved API.
//!
//! Each exposed model gets `/{singular}`, `/{singular}/:id` and `/{plural}`;
//! the base path itself answers OPTIONS with the full API map.

use crate::config::ResolvedApi;
use crate::error::{ApiError, ErrorCause};
use crate::extractors::JsonAccept;
use crate::guard;
use crate::handlers::{api_map, route_options};
use crate::request::{HttpVerb, Plurality, RequestContext, RequestDescriptor};
use crate::state::{ApiState, RouteState};
use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, NestedPath, Path, Query, State},
    http::Method,
    response::Response,
    routing::{get, options, MethodRouter},
    Json, Router,
};
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

type QueryPairs = Result<Query<Vec<(String, String)>>, QueryRejection>;

fn base_url(nested: Option<NestedPath>) -> String {
    nested
        .map(|n| n.as_str().trim_end_matches('/').to_string())
        .unwrap_or_default()
}

fn parse_body(body: &Bytes) -> Result<Value, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body).map_err(|e| ApiError::malformed_query(Some(ErrorCause::Syntax(e.to_string()))))
}

impl RouteState {
    async fn dispatch(&self, method: Method, url_id: Option<String>, query: QueryPairs, body: Bytes) -> Response {
        let request_id = Uuid::new_v4().to_string();
        tracing::info!(
            request_id = %request_id,
            method = %method,
            model = %self.exposed.name,
            plurality = %self.plurality,
            url_id = ?url_id,
            "request received"
        );
        match self.answer(&request_id, method, url_id, query, body).await {
            Ok(response) => {
                tracing::debug!(request_id = %request_id, status = %response.status(), "request answered");
                response
            }
            Err(err) => err.respond(&request_id),
        }
    }

    async fn answer(
        &self,
        request_id: &str,
        method: Method,
        url_id: Option<String>,
        query: QueryPairs,
        body: Bytes,
    ) -> Result<Response, ApiError> {
        let verb = HttpVerb::from_method(&method).ok_or_else(|| {
            ApiError::method_not_allowed(Some(ErrorCause::Request(format!("{} is not served", method))))
        })?;
        let Query(query) =
            query.map_err(|e| ApiError::malformed_query(Some(ErrorCause::Syntax(e.body_text()))))?;
        let ctx = RequestContext {
            id: request_id.to_string(),
            verb,
            plurality: self.plurality,
            url_id,
            query,
            body: parse_body(&body)?,
        };
        let model = self.exposed.model.as_ref();
        let mut request = RequestDescriptor::build(ctx, model).await?;
        tracing::debug!(request_id = %request_id, request = %request.loggable(), "request resolved");
        let chain = self.exposed.chain(verb, self.plurality);
        guard::run(&chain, &mut request, model).await
    }
}

async fn serve_collection(
    State(route): State<RouteState>,
    _accept: JsonAccept,
    method: Method,
    query: QueryPairs,
    body: Bytes,
) -> Response {
    route.dispatch(method, None, query, body).await
}

async fn serve_item(
    State(route): State<RouteState>,
    _accept: JsonAccept,
    method: Method,
    Path(id): Path<String>,
    query: QueryPairs,
    body: Bytes,
) -> Response {
    route.dispatch(method, Some(id), query, body).await
}

async fn serve_route_options(
    State(route): State<RouteState>,
    _accept: JsonAccept,
    nested: Option<NestedPath>,
) -> Json<Value> {
    Json(route_options(&route.exposed, route.plurality, &base_url(nested)))
}

async fn serve_api_map(State(state): State<ApiState>, _accept: JsonAccept, nested: Option<NestedPath>) -> Json<Value> {
    Json(api_map(&state.api, &base_url(nested)))
}

fn collection_methods() -> MethodRouter<RouteState> {
    get(serve_collection)
        .post(serve_collection)
        .patch(serve_collection)
        .put(serve_collection)
        .delete(serve_collection)
        .options(serve_route_options)
}

fn item_methods() -> MethodRouter<RouteState> {
    get(serve_item)
        .post(serve_item)
        .patch(serve_item)
        .put(serve_item)
        .delete(serve_item)
        .options(serve_route_options)
}

/// Routes for every model of `api`, to be nested under the base path.
pub fn model_routes(api: Arc<ResolvedApi>) -> Router {
    let mut router = Router::new()
        .route("/", options(serve_api_map))
        .with_state(ApiState { api: api.clone() });
    for exposed in &api.models {
        let singular = RouteState {
            exposed: exposed.clone(),
            plurality: Plurality::Singular,
        };
        let plural = RouteState {
            exposed: exposed.clone(),
            plurality: Plurality::Plural,
        };
        router = router
            .merge(
                Router::new()
                    .route(&format!("/{}", exposed.singular), collection_methods())
                    .route(&format!("/{}/:id", exposed.singular), item_methods())
                    .with_state(singular),
            )
            .merge(
                Router::new()
                    .route(&format!("/{}", exposed.plural), collection_methods())
                    .with_state(plural),
            );
    }
    router
}
