//! lotus-api library interface
//!
//! Request handlers for the Lotus meditation site: contact form, newsletter
//! signup, general subscribe/unsubscribe, meditation progress tracking and
//! blog image generation.

pub mod api;
pub mod error;
pub mod services;
pub mod validation;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use lotus_common::db::{SqliteStore, Store};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::services::{
    GatewayImageGenerator, HeaderFingerprint, IdentityResolver, ImageGenerator, LogMailer, Mailer,
    Notifier,
};

/// Application state shared across handlers
///
/// Every external collaborator is injected here so tests can substitute fakes.
#[derive(Clone)]
pub struct AppState {
    /// Persistence for all site records
    pub store: Arc<dyn Store>,
    /// Welcome email delivery (best-effort)
    pub mailer: Arc<dyn Mailer>,
    /// Blog image generation (primary action of its handler)
    pub images: Arc<dyn ImageGenerator>,
    /// Derives meditation user ids from request headers
    pub identity: Arc<dyn IdentityResolver>,
    /// Runs detached side effects
    pub notifier: Notifier,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        mailer: Arc<dyn Mailer>,
        images: Arc<dyn ImageGenerator>,
        identity: Arc<dyn IdentityResolver>,
    ) -> Self {
        Self {
            store,
            mailer,
            images,
            identity,
            notifier: Notifier::new(),
            startup_time: Utc::now(),
        }
    }

    /// State over a SQLite pool with email logged only, image generation
    /// disabled and the default client-id fingerprint
    pub fn with_sqlite(pool: SqlitePool) -> Result<Self, reqwest::Error> {
        let images = GatewayImageGenerator::new(
            lotus_common::config::DEFAULT_IMAGE_ENDPOINT,
            lotus_common::config::DEFAULT_IMAGE_MODEL,
            None,
        )?;
        Ok(Self::new(
            Arc::new(SqliteStore::new(pool)),
            Arc::new(LogMailer),
            Arc::new(images),
            Arc::new(HeaderFingerprint::new(
                lotus_common::config::DEFAULT_IDENTITY_HEADER,
            )),
        ))
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::contact_routes())
        .merge(api::newsletter_routes())
        .merge(api::subscribe_routes())
        .merge(api::meditation_routes())
        .merge(api::blog_image_routes())
        .merge(api::health_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
