//! Content negotiation: every generated route answers JSON only.

use crate::error::{ApiError, ErrorCause};
use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header::ACCEPT, request::Parts},
};
use mime::Mime;

pub const JSON_MIME: &str = "application/json";

/// Guard extractor: rejects with 415 unless the `Accept` header allows `application/json`.
#[derive(Clone, Copy, Debug)]
pub struct JsonAccept;

/// `application/json`, `application/*` or `*/*`; parameters are ignored.
fn is_json_range(range: &Mime) -> bool {
    let (kind, subtype) = (range.type_(), range.subtype());
    (kind == mime::STAR && subtype == mime::STAR)
        || (kind == mime::APPLICATION && (subtype == mime::STAR || subtype == mime::JSON))
}

/// True when one media range of the `Accept` list admits `application/json`.
/// Entries that do not parse as media ranges are skipped.
pub fn accepts_json(accept: &str) -> bool {
    accept
        .split(',')
        .filter_map(|entry| entry.trim().to_ascii_lowercase().parse::<Mime>().ok())
        .any(|range| is_json_range(&range))
}

#[async_trait]
impl<S> FromRequestParts<S> for JsonAccept
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let accept = parts
            .headers
            .get(ACCEPT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        if accepts_json(accept) {
            return Ok(JsonAccept);
        }
        Err(ApiError::unsupported_media_type(Some(ErrorCause::Request(format!(
            "Unsupported Accept MIME \"{}\". This API only supports \"{}\"",
            accept, JSON_MIME
        )))))
    }
}
