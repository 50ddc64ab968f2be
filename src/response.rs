//! Response shaping for CRUD results.

use crate::model::Entity;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

/// 204 when nothing was found, otherwise `status` with the entity.
pub fn maybe_entity(entity: Option<Entity>, status: StatusCode) -> Response {
    match entity {
        None => StatusCode::NO_CONTENT.into_response(),
        Some(entity) => (status, Json(entity.to_json())).into_response(),
    }
}

/// 204 for an empty set, otherwise `status` with the array.
pub fn maybe_empty_set(entities: Vec<Entity>, status: StatusCode) -> Response {
    if entities.is_empty() {
        return StatusCode::NO_CONTENT.into_response();
    }
    let body: Vec<Value> = entities.iter().map(Entity::to_json).collect();
    (status, Json(body)).into_response()
}

pub fn no_content() -> Response {
    StatusCode::NO_CONTENT.into_response()
}
