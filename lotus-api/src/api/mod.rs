//! HTTP API handlers for lotus-api
//!
//! Every route also answers `OPTIONS` with an empty CORS preflight response.

pub mod blog_image;
pub mod contact;
pub mod cors;
pub mod health;
pub mod meditation;
pub mod newsletter;
pub mod subscribe;

pub use blog_image::blog_image_routes;
pub use contact::contact_routes;
pub use health::health_routes;
pub use meditation::meditation_routes;
pub use newsletter::newsletter_routes;
pub use subscribe::subscribe_routes;

use serde::Serialize;

/// Body of simple success responses
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}
