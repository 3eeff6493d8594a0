//! Storage collaborator interface
//!
//! Every handler talks to persistence through [`Store`] so the backing
//! database can be swapped for a fake in tests. Implementations must enforce
//! one row per (lower-cased) email in both subscriber tables and report a
//! violated constraint as [`Error::UniqueViolation`](crate::Error::UniqueViolation).

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::models::{ContactSubmission, MeditationSession, NewsletterSubscriber, Preferences, Subscriber};
use crate::Result;

#[async_trait]
pub trait Store: Send + Sync {
    async fn insert_contact(&self, submission: &ContactSubmission) -> Result<()>;

    async fn find_newsletter_subscriber(&self, email: &str) -> Result<Option<NewsletterSubscriber>>;

    async fn insert_newsletter_subscriber(&self, subscriber: &NewsletterSubscriber) -> Result<()>;

    /// Set `is_active` and stamp `resubscribed_at` on an existing row
    async fn reactivate_newsletter_subscriber(&self, email: &str, at: DateTime<Utc>) -> Result<()>;

    async fn find_subscriber(&self, email: &str) -> Result<Option<Subscriber>>;

    async fn insert_subscriber(&self, subscriber: &Subscriber) -> Result<()>;

    /// Clear `unsubscribed_at`; name and preferences are overwritten only
    /// when given, otherwise the stored values stay
    async fn revive_subscriber(
        &self,
        email: &str,
        name: Option<&str>,
        preferences: Option<&Preferences>,
    ) -> Result<()>;

    /// Stamp `unsubscribed_at` on an active subscriber.
    /// Returns false when no active subscriber matched.
    async fn unsubscribe(&self, email: &str, at: DateTime<Utc>) -> Result<bool>;

    async fn insert_session(&self, session: &MeditationSession) -> Result<()>;

    /// All sessions of one user, most recent first
    async fn list_sessions(&self, user_id: &str) -> Result<Vec<MeditationSession>>;

    /// Returns false when no post has the given id
    async fn update_post_image(&self, post_id: &str, image_url: &str) -> Result<bool>;
}
