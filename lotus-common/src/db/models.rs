//! Database models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status assigned to every freshly received contact submission
pub const CONTACT_STATUS_NEW: &str = "new";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactSubmission {
    pub guid: Uuid,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub category: String,
    pub message: String,
    pub submitted_at: DateTime<Utc>,
    pub source: String,
    pub status: String,
}

/// Row of the `newsletter_subscribers` table
///
/// Activity is tracked by `is_active`; a deactivated row is revived in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsletterSubscriber {
    pub email: String,
    pub is_active: bool,
    pub subscribed_at: DateTime<Utc>,
    pub resubscribed_at: Option<DateTime<Utc>>,
    pub source: String,
}

/// Mailing preferences of a general subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub new_posts: bool,
    pub weekly_digest: bool,
    pub monthly_digest: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            new_posts: true,
            weekly_digest: true,
            monthly_digest: false,
        }
    }
}

/// Row of the `subscribers` table
///
/// `unsubscribed_at` is `None` exactly while the subscription is active.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscriber {
    pub email: String,
    pub name: Option<String>,
    pub confirmed: bool,
    pub preferences: Preferences,
    pub created_at: DateTime<Utc>,
    pub unsubscribed_at: Option<DateTime<Utc>>,
}

impl Subscriber {
    pub fn is_active(&self) -> bool {
        self.unsubscribed_at.is_none()
    }
}

/// One logged meditation session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeditationSession {
    pub user_id: String,
    pub session_id: String,
    pub date: DateTime<Utc>,
    /// Minutes; absent durations count as zero in statistics
    pub duration: Option<u32>,
    #[serde(rename = "type")]
    pub session_type: Option<String>,
    pub mood_before: Option<String>,
    pub mood_after: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}
