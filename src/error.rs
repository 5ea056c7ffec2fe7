//! Error types shared by the scoring engine and its collaborators.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// Errors surfaced by registry, ledger, storage and scoring operations.
///
/// DNS failures never appear here: the deliverability checker downgrades
/// them to a weaker score instead of failing the call.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed email, domain or request field.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Unknown id or target.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Duplicate temp-domain registration.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Attempt to edit or delete a builtin temp-domain entry.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Caller does not have enough remaining calls for the request.
    #[error("Quota exceeded: {required} calls required, {remaining} remaining")]
    QuotaExceeded { required: u32, remaining: u32 },

    /// Document store failure.
    #[error("Storage error: {0}")]
    Storage(#[from] mongodb::error::Error),

    /// Redis cache failure.
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// A built-in or configured pattern failed to compile.
    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),

    /// Invalid or missing configuration value.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Stable machine-readable code used by the REST and GraphQL surfaces.
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidInput(_) => "INVALID_INPUT",
            Error::NotFound(_) => "NOT_FOUND",
            Error::Conflict(_) => "CONFLICT",
            Error::Forbidden(_) => "FORBIDDEN",
            Error::QuotaExceeded { .. } => "QUOTA_EXCEEDED",
            Error::Storage(_) => "STORAGE_ERROR",
            Error::Cache(_) => "CACHE_ERROR",
            Error::Serde(_) => "SERIALIZATION_ERROR",
            Error::Pattern(_) => "PATTERN_ERROR",
            Error::Config(_) => "CONFIGURATION_ERROR",
        }
    }

    /// Whether the error is the caller's fault rather than a system fault.
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::QuotaExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "error": self.code(),
            "message": self.to_string()
        }))
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_map_to_4xx() {
        assert_eq!(
            Error::InvalidInput("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(Error::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(Error::Conflict("x".into()).status_code(), StatusCode::CONFLICT);
        assert_eq!(Error::Forbidden("x".into()).status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            Error::QuotaExceeded {
                required: 3,
                remaining: 1
            }
            .status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert!(Error::Conflict("dup".into()).is_client_error());
    }

    #[test]
    fn test_system_errors_map_to_500() {
        let err = Error::Config("bad".into());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.is_client_error());
        assert_eq!(err.code(), "CONFIGURATION_ERROR");
    }

    #[actix_web::test]
    async fn test_error_response_body() {
        let resp = Error::Forbidden("builtin entry".into()).error_response();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let body = actix_web::body::to_bytes(resp.into_body()).await.unwrap();
        let body_json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body_json["error"], "FORBIDDEN");
        assert_eq!(body_json["message"], "Forbidden: builtin entry");
    }
}
