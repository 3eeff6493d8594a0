//! Service layer: pure computation and outbound collaborators

pub mod identity;
pub mod image_gen;
pub mod mailer;
pub mod notifier;
pub mod stats;
pub mod subscriptions;

pub use identity::{HeaderFingerprint, IdentityResolver};
pub use image_gen::{GatewayImageGenerator, ImageGenerator, UpstreamError};
pub use mailer::{LogMailer, Mailer, ResendMailer};
pub use notifier::Notifier;
pub use stats::{compute_stats, Stats, WEEKLY_GOAL};
pub use subscriptions::{Outcome, SubscriptionPolicy};
