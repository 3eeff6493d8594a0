//! Blog image generation endpoint
//!
//! The call to the image generator is this handler's primary action, so
//! its failures are returned to the client with their own status codes
//! (429 rate limited, 402 quota exhausted, 500 otherwise).

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use super::cors::preflight;
use crate::validation::{validate_blog_image, BlogImageInput};
use crate::{ApiError, ApiResult, AppState};

/// Characters of the image URL echoed back to the client
pub const IMAGE_URL_PREVIEW_LEN: usize = 100;

#[derive(Debug, Serialize)]
pub struct BlogImageResponse {
    pub success: bool,
    pub message: String,
    pub image_url: String,
}

/// Prompt sent to the image generator for one post
pub fn build_prompt(input: &BlogImageInput) -> String {
    let mut prompt = format!(
        "Create a serene, high-quality blog header image for a meditation and wellness article titled \"{}\".",
        input.title
    );
    if let Some(excerpt) = &input.excerpt {
        prompt.push_str(&format!(" The article is about: {}.", excerpt));
    }
    if let Some(category) = &input.category {
        prompt.push_str(&format!(" Category: {}.", category));
    }
    prompt.push_str(
        " Use soft natural light, calm colors and a peaceful mood. No text or lettering in the image. 16:9 aspect ratio.",
    );
    prompt
}

/// Shorten long (typically base64 `data:`) URLs for the response body
pub fn preview_url(url: &str) -> String {
    match url.char_indices().nth(IMAGE_URL_PREVIEW_LEN) {
        Some((cut, _)) => format!("{}...", &url[..cut]),
        None => url.to_string(),
    }
}

/// POST /api/generate-blog-image
///
/// **Request:** `{"post_id", "title", "excerpt"?, "category"?}`
/// **Response:** `{"success": true, "message": "...", "image_url": "<first 100 chars>..."}`
pub async fn generate_blog_image(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<BlogImageResponse>> {
    let Json(raw) = payload?;
    let input = validate_blog_image(&raw)?;

    let prompt = build_prompt(&input);
    let image_url = state.images.generate(&prompt).await?;

    if !state.store.update_post_image(&input.post_id, &image_url).await? {
        return Err(ApiError::NotFound(format!("blog post {}", input.post_id)));
    }

    info!(post_id = %input.post_id, "Blog image generated");

    Ok(Json(BlogImageResponse {
        success: true,
        message: "Image generated and saved successfully".to_string(),
        image_url: preview_url(&image_url),
    }))
}

pub fn blog_image_routes() -> Router<AppState> {
    Router::new().route(
        "/api/generate-blog-image",
        post(generate_blog_image).options(preflight),
    )
}
