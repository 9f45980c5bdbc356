//! HTTP error mapping for alchemy-server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Unknown element (404)
    #[error("Element not found: {0}")]
    NotFound(String),

    /// Malformed URL, query or body (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Algorithm outside the accepted set (400)
    #[error("Invalid algorithm: {0}")]
    InvalidAlgorithm(String),

    /// Response serialization failed (500)
    #[error("Encode error: {0}")]
    Encode(String),

    /// Search or worker failure (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<alchemy_common::Error> for ApiError {
    fn from(err: alchemy_common::Error) -> Self {
        use alchemy_common::Error;
        match err {
            Error::UnknownElement(name) => ApiError::NotFound(name),
            Error::MalformedRequest(msg) => ApiError::BadRequest(msg),
            Error::InvalidAlgorithm(name) => ApiError::InvalidAlgorithm(name),
            Error::Encode(e) => ApiError::Encode(e.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Internal(format!("search task failed: {}", err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::InvalidAlgorithm(_) => (StatusCode::BAD_REQUEST, "INVALID_ALGORITHM"),
            ApiError::Encode(_) => (StatusCode::INTERNAL_SERVER_ERROR, "ENCODE_ERROR"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        if status.is_server_error() {
            error!("{}", self);
        }

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
