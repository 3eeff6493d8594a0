//! Meditation progress endpoint
//!
//! GET returns the caller's session history with statistics; POST logs a
//! session and returns the refreshed history. Callers are identified by
//! the configured [`IdentityResolver`](crate::services::IdentityResolver).

use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use lotus_common::db::MeditationSession;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use super::cors::preflight;
use crate::services::stats::{compute_stats, Stats};
use crate::validation::validate_session;
use crate::{ApiResult, AppState};

#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub sessions: Vec<MeditationSession>,
    pub stats: Stats,
}

/// Fetch the full history for `user_id` and aggregate it
async fn load_progress(state: &AppState, user_id: &str) -> ApiResult<ProgressResponse> {
    let sessions = state.store.list_sessions(user_id).await?;
    let stats = compute_stats(&sessions, Utc::now());
    Ok(ProgressResponse { sessions, stats })
}

/// GET /api/meditation-progress
pub async fn get_progress(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<ProgressResponse>> {
    let user_id = state.identity.resolve(&headers);
    let progress = load_progress(&state, &user_id).await?;
    debug!(user_id = %user_id, sessions = progress.sessions.len(), "Progress loaded");
    Ok(Json(progress))
}

/// POST /api/meditation-progress
///
/// **Request:** `{"id", "date", "duration"?, "type"?, "mood_before"?, "mood_after"?, "notes"?}`
/// **Response:** `{"sessions": [...], "stats": {...}}` read back after the insert
pub async fn log_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<ProgressResponse>> {
    let Json(raw) = payload?;
    let input = validate_session(&raw)?;
    let user_id = state.identity.resolve(&headers);

    let session = MeditationSession {
        user_id: user_id.clone(),
        session_id: input.id,
        date: input.date,
        duration: input.duration,
        session_type: input.session_type,
        mood_before: input.mood_before,
        mood_after: input.mood_after,
        notes: input.notes,
        created_at: Utc::now(),
    };
    state.store.insert_session(&session).await?;
    info!(user_id = %user_id, session_id = %session.session_id, "Meditation session logged");

    Ok(Json(load_progress(&state, &user_id).await?))
}

pub fn meditation_routes() -> Router<AppState> {
    Router::new().route(
        "/api/meditation-progress",
        get(get_progress).post(log_session).options(preflight),
    )
}
