//! Error types for lotus-api
//!
//! Client-caused errors carry their detail to the response. Server-side
//! failures are logged here and answered with a generic message.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::services::UpstreamError;
use crate::validation::ValidationError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// One or more fields failed validation (400)
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Body is not parseable JSON (400)
    #[error("Invalid request body: {0}")]
    BadBody(String),

    /// Email already on the newsletter list (400)
    #[error("Email is already subscribed")]
    DuplicateSubscription,

    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Storage failure (500, detail suppressed)
    #[error("Storage error: {0}")]
    Storage(#[from] lotus_common::Error),

    /// AI or email provider failure (429 / 402 / 500)
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadBody(rejection.body_text())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadBody(_) | ApiError::DuplicateSubscription => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Upstream(UpstreamError::RateLimited) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Upstream(UpstreamError::QuotaExhausted) => StatusCode::PAYMENT_REQUIRED,
            ApiError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match self {
            ApiError::Validation(err) => json!({
                "success": false,
                "error": "Validation failed",
                "details": err.fields,
            }),
            ApiError::Storage(ref err) => {
                error!("Storage failure: {}", err);
                json!({
                    "success": false,
                    "error": "Internal server error",
                })
            }
            ApiError::Upstream(UpstreamError::Other(ref detail)) => {
                error!("Upstream failure: {}", detail);
                json!({
                    "success": false,
                    "error": "Failed to generate image",
                })
            }
            other => json!({
                "success": false,
                "error": other.to_string(),
            }),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::Validation(ValidationError::single("email", "is required")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::DuplicateSubscription.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::Storage(lotus_common::Error::Internal("x".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Upstream(UpstreamError::RateLimited).status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            ApiError::Upstream(UpstreamError::QuotaExhausted).status(),
            StatusCode::PAYMENT_REQUIRED
        );
        assert_eq!(
            ApiError::Upstream(UpstreamError::EmptyResult).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
