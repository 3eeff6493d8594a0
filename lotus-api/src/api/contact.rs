//! Contact form endpoint

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use chrono::{DateTime, Utc};
use lotus_common::db::{ContactSubmission, CONTACT_STATUS_NEW};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use super::cors::preflight;
use super::MessageResponse;
use crate::services::subscriptions::DEFAULT_SOURCE;
use crate::validation::{validate_contact, ContactInput};
use crate::{ApiResult, AppState};

pub const DEFAULT_CATEGORY: &str = "general";

/// Apply handler-side defaults to a validated contact form
pub fn build_submission(input: ContactInput, now: DateTime<Utc>) -> ContactSubmission {
    let subject = input
        .subject
        .unwrap_or_else(|| format!("Message from {}", input.name));

    ContactSubmission {
        guid: Uuid::new_v4(),
        subject,
        category: input.category.unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        source: input.source.unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
        submitted_at: input.timestamp.unwrap_or(now),
        status: CONTACT_STATUS_NEW.to_string(),
        name: input.name,
        email: input.email,
        message: input.message,
    }
}

/// POST /api/contact
///
/// **Request:** `{"name", "email", "message", "subject"?, "category"?, "source"?, "timestamp"?}`
/// **Response:** `{"success": true, "message": "..."}`
pub async fn submit_contact(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Json(raw) = payload?;
    let input = validate_contact(&raw)?;

    let submission = build_submission(input, Utc::now());
    state.store.insert_contact(&submission).await?;

    info!(guid = %submission.guid, category = %submission.category, "Contact submission stored");

    Ok(Json(MessageResponse::ok(
        "Thank you for your message. We'll get back to you soon.",
    )))
}

pub fn contact_routes() -> Router<AppState> {
    Router::new().route("/api/contact", post(submit_contact).options(preflight))
}
