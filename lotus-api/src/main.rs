//! lotus-api - request handlers for the Lotus meditation site
//!
//! Serves the contact form, newsletter and subscriber signups, meditation
//! progress tracking and blog image generation over JSON/HTTP.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use lotus_common::config::{
    resolve_database_path, TomlConfig, DEFAULT_IMAGE_ENDPOINT, DEFAULT_IMAGE_MODEL,
    DEFAULT_MAIL_ENDPOINT,
};
use lotus_common::db::{init_database, SqliteStore};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lotus_api::services::mailer::DEFAULT_FROM;
use lotus_api::services::{GatewayImageGenerator, HeaderFingerprint, LogMailer, Mailer, ResendMailer};
use lotus_api::{build_router, AppState};

/// Command-line arguments for lotus-api
#[derive(Parser, Debug)]
#[command(name = "lotus-api")]
#[command(about = "Request handlers for the Lotus meditation site")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "8787", env = "LOTUS_PORT")]
    port: u16,

    /// Address to bind
    #[arg(short, long, default_value = "127.0.0.1", env = "LOTUS_BIND")]
    bind: std::net::IpAddr,

    /// SQLite database file (overrides config file)
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Path to config.toml
    #[arg(short, long, env = "LOTUS_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = TomlConfig::load(args.config.as_deref())
        .context("Failed to load configuration")?;

    // RUST_LOG wins over the configured level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("lotus_api={0},lotus_common={0},tower_http=info", config.logging.level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting lotus-api v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let db_path = resolve_database_path(args.database.as_deref(), "LOTUS_DATABASE", &config);
    info!("Database path: {}", db_path.display());
    let pool = init_database(&db_path)
        .await
        .context("Failed to initialize database")?;

    let mailer: Arc<dyn Mailer> = match config.mail_api_key() {
        Some(key) => {
            info!("Welcome emails enabled");
            Arc::new(ResendMailer::new(
                config.mail.endpoint.clone().unwrap_or_else(|| DEFAULT_MAIL_ENDPOINT.to_string()),
                key,
                config.mail.from.clone().unwrap_or_else(|| DEFAULT_FROM.to_string()),
                config.mail.site_url.clone(),
            )?)
        }
        None => {
            warn!("No mail API key configured; welcome emails will only be logged");
            Arc::new(LogMailer)
        }
    };

    let image_key = config.image_api_key();
    if image_key.is_none() {
        warn!("No image API key configured; blog image generation will fail");
    }
    let images = GatewayImageGenerator::new(
        config.image.endpoint.clone().unwrap_or_else(|| DEFAULT_IMAGE_ENDPOINT.to_string()),
        config.image.model.clone().unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string()),
        image_key,
    )?;

    let identity_header = config.identity_header();
    info!("Meditation users fingerprinted by '{}' header", identity_header);

    let state = AppState::new(
        Arc::new(SqliteStore::new(pool)),
        mailer,
        Arc::new(images),
        Arc::new(HeaderFingerprint::new(identity_header)),
    );
    let notifier = state.notifier.clone();
    let app = build_router(state);

    let addr = SocketAddr::new(args.bind, args.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("lotus-api listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Let queued welcome emails finish before exiting
    let pending = notifier.in_flight();
    if pending > 0 {
        info!("Waiting for {} background task(s) to finish", pending);
    }
    notifier.drain().await;
    info!("lotus-api stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
