//! HTTP error responses.
//!
//! Domain errors are mapped by [`ErrorKind`]. Client errors carry the error's own
//! message; server errors are logged and replaced with a generic one.

use crate::errors::{Error, ErrorKind};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Result type returned by every handler
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Error returned by handlers
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No usable caller identity on the request
    #[error("Authentication required: {0}")]
    Unauthorized(String),

    /// Anything raised by the core
    #[error(transparent)]
    Domain(#[from] Error),
}

impl ApiError {
    /// Status code and client-facing message
    fn status_and_message(&self) -> (StatusCode, String) {
        let err = match self {
            Self::Unauthorized(msg) => return (StatusCode::UNAUTHORIZED, msg.clone()),
            Self::Domain(err) => err,
        };

        match err.kind() {
            ErrorKind::NotFound => (StatusCode::NOT_FOUND, err.to_string()),
            ErrorKind::Forbidden => (StatusCode::FORBIDDEN, err.to_string()),
            ErrorKind::BadRequest => (StatusCode::BAD_REQUEST, err.to_string()),
            ErrorKind::Conflict => (StatusCode::CONFLICT, "Resource already exists".to_string()),
            ErrorKind::ForeignKeyViolation => {
                tracing::error!(error = %err, "Foreign key violation");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ErrorKind::Internal => {
                tracing::error!(error = ?err, "Unexpected error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = self.status_and_message();
        if status.is_client_error() {
            tracing::debug!(%status, error = %error_message, "Request rejected");
        }

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
