//! Query-string translation into filter and options.

use crate::error::{ApiError, ErrorCause};
use crate::model::{Filter, QueryOptions};
use serde_json::{Map, Value};

/// Option fields lifted out of the query string.
pub const QUERY_OPTIONS: [&str; 4] = ["skip", "limit", "sort", "page"];

/// Parameters carrying a JSON-encoded sub-document.
pub const JSON_PARAMS: [&str; 3] = ["query", "options", "where"];

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParsedQuery {
    /// Every parameter, with the JSON ones decoded.
    pub raw: Map<String, Value>,
    pub filter: Filter,
    pub options: QueryOptions,
}

fn syntax_error(message: String) -> ApiError {
    ApiError::malformed_query(Some(ErrorCause::Syntax(message)))
}

/// Parse raw query pairs. Repeated keys keep the last value.
pub fn parse_query(params: &[(String, String)]) -> Result<ParsedQuery, ApiError> {
    let mut raw = Map::new();
    for (key, value) in params {
        let decoded = if JSON_PARAMS.contains(&key.as_str()) {
            serde_json::from_str(value)
                .map_err(|e| syntax_error(format!("parameter '{}' is not valid JSON: {}", key, e)))?
        } else {
            Value::String(value.clone())
        };
        raw.insert(key.clone(), decoded);
    }

    let options = parse_options(&raw)?;
    let filter = match raw.get("where").or_else(|| raw.get("query")) {
        Some(Value::Object(map)) => map.clone(),
        Some(Value::Null) => Filter::new(),
        Some(other) => {
            return Err(ApiError::malformed_query(Some(ErrorCause::Request(format!(
                "expected the where clause to be an object, got {}",
                other
            )))))
        }
        None => raw
            .iter()
            .filter(|(k, _)| !QUERY_OPTIONS.contains(&k.as_str()) && !JSON_PARAMS.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
    };

    Ok(ParsedQuery { raw, filter, options })
}

/// Decoded `options` document first, then top-level option fields over it.
fn parse_options(raw: &Map<String, Value>) -> Result<QueryOptions, ApiError> {
    let mut fields = match raw.get("options") {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(map)) => map.clone(),
        Some(other) => return Err(syntax_error(format!("options must be an object, got {}", other))),
    };
    for key in QUERY_OPTIONS {
        if let Some(value) = raw.get(key) {
            fields.insert(key.to_string(), value.clone());
        }
    }

    Ok(QueryOptions {
        skip: count_option(&fields, "skip")?,
        limit: count_option(&fields, "limit")?,
        page: count_option(&fields, "page")?,
        sort: fields.get("sort").filter(|v| !v.is_null()).cloned(),
    })
}

fn count_option(fields: &Map<String, Value>, key: &str) -> Result<Option<u64>, ApiError> {
    let parsed = match fields.get(key) {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
        Some(_) => None,
    };
    parsed
        .map(Some)
        .ok_or_else(|| syntax_error(format!("option '{}' must be a non-negative integer", key)))
}
