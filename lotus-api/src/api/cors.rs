//! CORS preflight handling
//!
//! `CorsLayer` only intercepts real preflights (those carrying
//! `Access-Control-Request-Method`). Any other `OPTIONS` request still has
//! to get an empty 200 with permissive headers, so each route registers
//! [`preflight`] for that method.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::IntoResponse;

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_HEADERS: &str = "Content-Type, Authorization";
pub const ALLOW_METHODS: &str = "GET, POST, OPTIONS";

/// OPTIONS handler: empty body, permissive CORS headers
pub async fn preflight() -> impl IntoResponse {
    (
        StatusCode::OK,
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static(ALLOW_ORIGIN)),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(ALLOW_HEADERS)),
            (header::ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOW_METHODS)),
        ],
    )
}
