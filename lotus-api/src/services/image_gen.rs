//! Blog image generation through an OpenAI-compatible AI gateway
//!
//! The gateway is asked for a chat completion with image output; the image
//! comes back as a URL (usually a base64 `data:` URL) inside the first
//! choice's message.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Outbound calls give up after this long
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Failure talking to an external AI or email service
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    /// Provider answered 429
    #[error("Rate limit exceeded, please try again later")]
    RateLimited,

    /// Provider answered 402 (credits or quota used up)
    #[error("AI usage quota exhausted, please add credits")]
    QuotaExhausted,

    /// Provider answered OK but returned no image
    #[error("No image was returned by the generator")]
    EmptyResult,

    /// Anything else: transport errors, other statuses, bad payloads
    #[error("Upstream service error: {0}")]
    Other(String),
}

impl UpstreamError {
    /// Classify a non-success HTTP status from a provider
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            429 => UpstreamError::RateLimited,
            402 => UpstreamError::QuotaExhausted,
            _ => UpstreamError::Other(format!("status {}: {}", status, body)),
        }
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        UpstreamError::Other(err.to_string())
    }
}

/// Produces an image for a text prompt
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Returns a URL (possibly a `data:` URL) of the generated image
    async fn generate(&self, prompt: &str) -> Result<String, UpstreamError>;
}

/// [`ImageGenerator`] backed by a chat-completions gateway
pub struct GatewayImageGenerator {
    http_client: Client,
    endpoint: String,
    model: String,
    /// `None` leaves generation disabled; every call fails with `Other`
    api_key: Option<String>,
}

impl GatewayImageGenerator {
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http_client: Client::builder().timeout(DEFAULT_TIMEOUT).build()?,
            endpoint: endpoint.into(),
            model: model.into(),
            api_key,
        })
    }

    fn request_body(&self, prompt: &str) -> Value {
        json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "modalities": ["image", "text"],
        })
    }
}

#[async_trait]
impl ImageGenerator for GatewayImageGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, UpstreamError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| UpstreamError::Other("image generation is not configured".to_string()))?;

        debug!(model = %self.model, "Requesting blog image");

        let response = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&self.request_body(prompt))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Image gateway returned {}: {}", status, body);
            return Err(UpstreamError::from_status(status.as_u16(), &body));
        }

        let payload: Value = response.json().await?;
        extract_image_url(&payload).ok_or(UpstreamError::EmptyResult)
    }
}

/// Pull the first image URL out of a chat-completions reply
pub fn extract_image_url(payload: &Value) -> Option<String> {
    payload
        .pointer("/choices/0/message/images/0/image_url/url")
        .and_then(Value::as_str)
        .filter(|url| !url.is_empty())
        .map(str::to_string)
}
