//! General subscribe and unsubscribe endpoints
//!
//! Unlike the newsletter signup, subscribing an address that is already
//! active succeeds without changes.

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use chrono::Utc;
use serde_json::Value;
use tracing::info;

use super::cors::preflight;
use super::MessageResponse;
use crate::services::subscriptions::{upsert_subscriber, Outcome, SubscriptionPolicy};
use crate::validation::{validate_email_only, validate_subscribe};
use crate::{ApiError, ApiResult, AppState};

/// POST /api/subscribe
///
/// **Request:** `{"email", "name"?, "preferences"?: {"new_posts", "weekly_digest", "monthly_digest"}}`
/// **Response:** `{"success": true, "message": "..."}`
///
/// A welcome email is queued for new and returning subscribers. Its delivery
/// never affects the response.
pub async fn subscribe(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Json(raw) = payload?;
    let input = validate_subscribe(&raw)?;

    let outcome = upsert_subscriber(state.store.as_ref(), &input, Utc::now()).await?;
    if !SubscriptionPolicy::AcceptDuplicates.accepts(outcome) {
        return Err(ApiError::DuplicateSubscription);
    }

    if outcome.is_new_subscription() {
        let mailer = state.mailer.clone();
        let email = input.email.clone();
        let name = input.name.clone();
        state.notifier.spawn("welcome-email", async move {
            mailer.send_welcome(&email, name.as_deref()).await
        });
    }

    let message = match outcome {
        Outcome::Created => "Successfully subscribed!",
        Outcome::Reactivated => "Welcome back! You have been resubscribed.",
        Outcome::AlreadyActive | Outcome::Duplicate => "You are already subscribed.",
    };
    Ok(Json(MessageResponse::ok(message)))
}

/// POST /api/unsubscribe
///
/// **Request:** `{"email"}`
///
/// Always reports success so the endpoint cannot be used to probe the list.
pub async fn unsubscribe(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Json(raw) = payload?;
    let email = validate_email_only(&raw)?;

    if state.store.unsubscribe(&email, Utc::now()).await? {
        info!(email = %email, "Subscriber unsubscribed");
    }

    Ok(Json(MessageResponse::ok("You have been unsubscribed.")))
}

pub fn subscribe_routes() -> Router<AppState> {
    Router::new()
        .route("/api/subscribe", post(subscribe).options(preflight))
        .route("/api/unsubscribe", post(unsubscribe).options(preflight))
}
