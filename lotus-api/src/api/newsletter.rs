//! Newsletter signup endpoint

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use chrono::Utc;
use serde_json::Value;

use super::cors::preflight;
use super::MessageResponse;
use crate::services::subscriptions::{upsert_newsletter, Outcome, SubscriptionPolicy};
use crate::validation::validate_newsletter;
use crate::{ApiError, ApiResult, AppState};

/// POST /api/newsletter-signup
///
/// **Request:** `{"email", "source"?, "timestamp"?}`
///
/// **Errors:**
/// - 400: invalid email, or the address is already an active subscriber
/// - 500: storage failure
pub async fn newsletter_signup(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Json(raw) = payload?;
    let input = validate_newsletter(&raw)?;

    let outcome = upsert_newsletter(state.store.as_ref(), &input, Utc::now()).await?;
    if !SubscriptionPolicy::RejectDuplicates.accepts(outcome) {
        return Err(ApiError::DuplicateSubscription);
    }

    let message = match outcome {
        Outcome::Reactivated => "Welcome back! Your newsletter subscription has been reactivated.",
        _ => "Thank you for subscribing to our newsletter!",
    };
    Ok(Json(MessageResponse::ok(message)))
}

pub fn newsletter_routes() -> Router<AppState> {
    Router::new().route(
        "/api/newsletter-signup",
        post(newsletter_signup).options(preflight),
    )
}
