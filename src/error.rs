//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

/// Mount-time configuration failures. These abort startup.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("tried to configure the API with unknown model '{key}' (known models: {known:?})")]
    UnknownModel { key: String, known: Vec<String> },
    #[error("invalid model pattern '{key}': {reason}")]
    InvalidPattern { key: String, reason: String },
    #[error("invalid route name '{name}' for model {model}")]
    InvalidRouteName { model: String, name: String },
    #[error("duplicate route: /{0}")]
    DuplicateRoute(String),
    #[error("config load: {0}")]
    Load(String),
}

/// Failures reported by a data-access layer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    /// One entity failed its schema rules.
    #[error("{0}")]
    Validation(String),
    /// Several entities failed; one message per failing entity.
    #[error("{message}")]
    SetValidation { message: String, errors: Vec<String> },
    #[error("{0}")]
    Backend(String),
}

/// What caused an [`ApiError`]. Serialized as the `error` field of the body.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorCause {
    #[error("{message}")]
    Validation { message: String, validation_errors: Option<Vec<String>> },
    #[error("{0}")]
    Syntax(String),
    #[error("{0}")]
    Request(String),
    #[error("{0}")]
    Native(String),
}

impl ErrorCause {
    pub fn name(&self) -> &'static str {
        match self {
            ErrorCause::Validation { validation_errors: Some(_), .. } => "SetValidationError",
            ErrorCause::Validation { .. } => "ValidationError",
            ErrorCause::Syntax(_) => "SyntaxError",
            ErrorCause::Request(_) => "ApiError",
            ErrorCause::Native(_) => "Error",
        }
    }

    fn is_validation(&self) -> bool {
        matches!(self, ErrorCause::Validation { .. })
    }

    fn to_json(&self) -> Value {
        json!({ "name": self.name(), "message": self.to_string() })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApiErrorKind {
    MalformedQuery,
    Forbidden,
    NotFound,
    MethodNotAllowed,
    UnsupportedMediaType,
    ServerError,
}

impl ApiErrorKind {
    pub fn status(self) -> StatusCode {
        match self {
            ApiErrorKind::MalformedQuery => StatusCode::BAD_REQUEST,
            ApiErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ApiErrorKind::NotFound => StatusCode::NOT_FOUND,
            ApiErrorKind::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiErrorKind::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiErrorKind::ServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn default_message(self) -> &'static str {
        match self {
            ApiErrorKind::MalformedQuery => "The query contains syntax error(s)",
            ApiErrorKind::Forbidden => "Access to this resource is forbidden",
            ApiErrorKind::NotFound => "The requested resource does not exist",
            ApiErrorKind::MethodNotAllowed => "The method used on this resource is not allowed",
            ApiErrorKind::UnsupportedMediaType => "The requested media type is not supported",
            ApiErrorKind::ServerError => "An internal error occurred",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Error,
}

/// Request-scoped error, rendered as a JSON body with a fixed status per kind.
#[derive(Error, Debug, Clone)]
#[error("{message}")]
pub struct ApiError {
    kind: ApiErrorKind,
    message: String,
    ancestor: Option<ErrorCause>,
    /// Verbatim messages skip the `Request <id> triggered ...` rendering.
    verbatim: bool,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, ancestor: Option<ErrorCause>) -> Self {
        let mut message = kind.default_message().to_string();
        if let Some(cause) = &ancestor {
            if kind != ApiErrorKind::ServerError {
                message.push_str("\nOriginal message: ");
                message.push_str(&cause.to_string());
            }
        }
        Self {
            kind,
            message,
            ancestor,
            verbatim: false,
        }
    }

    pub fn forbidden(ancestor: Option<ErrorCause>) -> Self {
        Self::new(ApiErrorKind::Forbidden, ancestor)
    }

    pub fn not_found(ancestor: Option<ErrorCause>) -> Self {
        Self::new(ApiErrorKind::NotFound, ancestor)
    }

    pub fn method_not_allowed(ancestor: Option<ErrorCause>) -> Self {
        Self::new(ApiErrorKind::MethodNotAllowed, ancestor)
    }

    pub fn malformed_query(ancestor: Option<ErrorCause>) -> Self {
        Self::new(ApiErrorKind::MalformedQuery, ancestor)
    }

    pub fn server_error(ancestor: Option<ErrorCause>) -> Self {
        Self::new(ApiErrorKind::ServerError, ancestor)
    }

    pub fn unsupported_media_type(ancestor: Option<ErrorCause>) -> Self {
        Self::new(ApiErrorKind::UnsupportedMediaType, ancestor)
    }

    /// Refusal of a write verb that carries no filter.
    pub fn where_clause_required(verb: &str) -> Self {
        Self {
            kind: ApiErrorKind::MalformedQuery,
            message: format!("{} requires a \"where\" clause", verb),
            ancestor: None,
            verbatim: true,
        }
    }

    pub fn kind(&self) -> ApiErrorKind {
        self.kind
    }

    pub fn status(&self) -> StatusCode {
        self.kind.status()
    }

    pub fn ancestor(&self) -> Option<&ErrorCause> {
        self.ancestor.as_ref()
    }

    pub fn log_level(&self) -> LogLevel {
        match &self.ancestor {
            Some(cause) if cause.is_validation() => LogLevel::Debug,
            _ => LogLevel::Error,
        }
    }

    pub fn validation_errors(&self) -> Option<&[String]> {
        match &self.ancestor {
            Some(ErrorCause::Validation { validation_errors, .. }) => validation_errors.as_deref(),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.ancestor.as_ref().map(ErrorCause::name).unwrap_or("ApiResponseError")
    }

    pub fn make_message(&self, request_id: &str) -> String {
        if self.verbatim {
            return self.message.clone();
        }
        let quoted = Value::String(self.message.clone()).to_string();
        if self.log_level() == LogLevel::Debug {
            format!("Request {} triggered a validation error: message is {}", request_id, quoted)
        } else {
            format!("Request {} triggered an error: message is {}", request_id, quoted)
        }
    }

    pub fn to_json(&self, request_id: &str) -> Value {
        let error = match (&self.ancestor, self.kind) {
            (_, ApiErrorKind::ServerError) | (None, _) => Value::Null,
            (Some(cause), _) => cause.to_json(),
        };
        json!({
            "message": self.make_message(request_id),
            "statusCode": self.status().as_u16(),
            "error": error,
            "name": self.name(),
            "validationErrors": self.validation_errors(),
        })
    }

    /// Log at the error's own level and build the HTTP response.
    pub fn respond(&self, request_id: &str) -> Response {
        let message = self.make_message(request_id);
        match self.log_level() {
            LogLevel::Debug => tracing::debug!(request_id, status = %self.status(), "{}", message),
            LogLevel::Error => tracing::error!(
                request_id,
                status = %self.status(),
                ancestor = ?self.ancestor,
                "{}",
                message
            ),
        }
        (self.status(), Json(self.to_json(request_id))).into_response()
    }
}

/// Classify a data-access failure. Validation failures become Forbidden,
/// everything else a ServerError.
pub fn wrap(error: DataError) -> ApiError {
    match error {
        DataError::Validation(message) => ApiError::forbidden(Some(ErrorCause::Validation {
            message,
            validation_errors: None,
        })),
        DataError::SetValidation { message, errors } => ApiError::forbidden(Some(ErrorCause::Validation {
            message,
            validation_errors: Some(errors),
        })),
        DataError::Backend(message) => ApiError::server_error(Some(ErrorCause::Native(message))),
    }
}

impl From<DataError> for ApiError {
    fn from(error: DataError) -> Self {
        wrap(error)
    }
}

impl IntoResponse for ApiError {
    /// Used where no request id exists yet (extractor rejections).
    fn into_response(self) -> Response {
        self.respond("UNKNOWN")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_failure_maps_to_forbidden_at_debug_level() {
        let err = wrap(DataError::Validation("name is required".into()));
        assert_eq!(err.kind(), ApiErrorKind::Forbidden);
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
        assert_eq!(err.log_level(), LogLevel::Debug);
        assert_eq!(err.name(), "ValidationError");
        assert!(err.validation_errors().is_none());
    }

    #[test]
    fn set_validation_failure_flattens_messages() {
        let err = wrap(DataError::SetValidation {
            message: "2 entities failed validation".into(),
            errors: vec!["name is required".into(), "name is required".into()],
        });
        let body = err.to_json("abc");
        assert_eq!(body["statusCode"], 403);
        assert_eq!(body["name"], "SetValidationError");
        assert_eq!(body["validationErrors"].as_array().map(Vec::len), Some(2));
        assert_eq!(
            body["message"],
            "Request abc triggered a validation error: message is \"Access to this resource is forbidden\\nOriginal message: 2 entities failed validation\""
        );
    }

    #[test]
    fn backend_failure_is_a_server_error_without_leaking_details() {
        let err = wrap(DataError::Backend("connection reset by peer".into()));
        assert_eq!(err.kind(), ApiErrorKind::ServerError);
        assert_eq!(err.log_level(), LogLevel::Error);
        let body = err.to_json("r1");
        assert_eq!(body["error"], Value::Null);
        assert!(!body["message"].as_str().unwrap_or_default().contains("connection reset"));
        assert!(err.ancestor().is_some());
    }

    #[test]
    fn question_mark_wraps_data_errors() {
        fn failing() -> Result<(), ApiError> {
            Err(DataError::Backend("boom".into()))?;
            Ok(())
        }
        let err = failing().unwrap_err();
        assert_eq!(err.kind(), ApiErrorKind::ServerError);
        assert_eq!(err.name(), "Error");
    }

    #[test]
    fn where_clause_message_is_rendered_verbatim() {
        let body = ApiError::where_clause_required("PATCH").to_json("r2");
        assert_eq!(body["message"], "PATCH requires a \"where\" clause");
        assert_eq!(body["statusCode"], 400);
        assert_eq!(body["validationErrors"], Value::Null);
    }
}
