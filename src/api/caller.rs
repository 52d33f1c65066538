//! Caller identity.
//!
//! Authentication happens upstream; it forwards the authenticated user's numeric id
//! in the `x-user-id` header.

use super::error::ApiError;
use axum::{extract::FromRequestParts, http::request::Parts};

/// Header carrying the authenticated user id
pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated user making the request.
/// Use `Option<Caller>` for routes that also serve anonymous callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller(pub i64);

impl Caller {
    /// The caller's user id
    #[must_use]
    pub const fn user_id(self) -> i64 {
        self.0
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized(format!("Missing {USER_ID_HEADER} header")))?;

        match raw.trim().parse::<i64>() {
            Ok(id) if id > 0 => Ok(Self(id)),
            _ => {
                tracing::warn!(value = raw, "Rejected malformed caller id");
                Err(ApiError::Unauthorized(format!(
                    "Invalid {USER_ID_HEADER} header"
                )))
            }
        }
    }
}
