//! Subscription state management
//!
//! Both subscriber tables follow the same upsert shape (create, revive an
//! inactive row, or leave an active row alone) but disagree on what an
//! active duplicate means. [`SubscriptionPolicy`] keeps that difference
//! explicit at each call site.

use chrono::{DateTime, Utc};
use lotus_common::db::{NewsletterSubscriber, Store, Subscriber};
use lotus_common::Result;
use tracing::{debug, info};

use crate::validation::{NewsletterInput, SubscribeInput};

/// Default value of `source` when the client does not send one
pub const DEFAULT_SOURCE: &str = "website";

/// Result of an upsert against a subscriber table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// New row inserted
    Created,
    /// Inactive row flipped back to active
    Reactivated,
    /// Row already active; nothing written
    AlreadyActive,
    /// Insert lost a race against a concurrent insert of the same email
    Duplicate,
}

impl Outcome {
    /// Whether the subscriber is newly on the list (welcome-worthy)
    pub fn is_new_subscription(self) -> bool {
        matches!(self, Outcome::Created | Outcome::Reactivated)
    }
}

/// How a call site treats an email that is already subscribed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionPolicy {
    /// Newsletter signup: an active duplicate is a client error
    RejectDuplicates,
    /// General subscribe: an active duplicate is a successful no-op
    AcceptDuplicates,
}

impl SubscriptionPolicy {
    pub fn accepts(self, outcome: Outcome) -> bool {
        match self {
            SubscriptionPolicy::RejectDuplicates => outcome.is_new_subscription(),
            SubscriptionPolicy::AcceptDuplicates => true,
        }
    }
}

/// Maps a UNIQUE violation on insert to `Duplicate`; other errors pass through
fn created_or_duplicate(result: Result<()>) -> Result<Outcome> {
    match result {
        Ok(()) => Ok(Outcome::Created),
        Err(e) if e.is_unique_violation() => Ok(Outcome::Duplicate),
        Err(e) => Err(e),
    }
}

/// Upsert into `newsletter_subscribers`, keyed by lower-cased email
pub async fn upsert_newsletter(
    store: &dyn Store,
    input: &NewsletterInput,
    now: DateTime<Utc>,
) -> Result<Outcome> {
    let outcome = match store.find_newsletter_subscriber(&input.email).await? {
        None => {
            let subscriber = NewsletterSubscriber {
                email: input.email.clone(),
                is_active: true,
                subscribed_at: input.timestamp.unwrap_or(now),
                resubscribed_at: None,
                source: input.source.clone().unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
            };
            created_or_duplicate(store.insert_newsletter_subscriber(&subscriber).await)?
        }
        Some(existing) if !existing.is_active => {
            store.reactivate_newsletter_subscriber(&input.email, now).await?;
            Outcome::Reactivated
        }
        Some(_) => Outcome::AlreadyActive,
    };

    log_outcome("newsletter", &input.email, outcome);
    Ok(outcome)
}

/// Upsert into `subscribers`, keyed by lower-cased email
pub async fn upsert_subscriber(
    store: &dyn Store,
    input: &SubscribeInput,
    now: DateTime<Utc>,
) -> Result<Outcome> {
    let outcome = match store.find_subscriber(&input.email).await? {
        None => {
            let subscriber = Subscriber {
                email: input.email.clone(),
                name: input.name.clone(),
                confirmed: true,
                preferences: input.preferences.unwrap_or_default(),
                created_at: now,
                unsubscribed_at: None,
            };
            created_or_duplicate(store.insert_subscriber(&subscriber).await)?
        }
        Some(existing) if !existing.is_active() => {
            store
                .revive_subscriber(&input.email, input.name.as_deref(), input.preferences.as_ref())
                .await?;
            Outcome::Reactivated
        }
        Some(_) => Outcome::AlreadyActive,
    };

    log_outcome("subscribers", &input.email, outcome);
    Ok(outcome)
}

fn log_outcome(list: &str, email: &str, outcome: Outcome) {
    match outcome {
        Outcome::Created | Outcome::Reactivated => {
            info!(list, email, ?outcome, "Subscription recorded")
        }
        Outcome::AlreadyActive | Outcome::Duplicate => {
            debug!(list, email, ?outcome, "Subscription already present")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policies_are_asymmetric() {
        use Outcome::*;
        let reject = SubscriptionPolicy::RejectDuplicates;
        let accept = SubscriptionPolicy::AcceptDuplicates;

        for outcome in [Created, Reactivated] {
            assert!(reject.accepts(outcome));
            assert!(accept.accepts(outcome));
        }
        for outcome in [AlreadyActive, Duplicate] {
            assert!(!reject.accepts(outcome));
            assert!(accept.accepts(outcome));
        }
    }

    #[test]
    fn test_unique_violation_becomes_duplicate() {
        let outcome = created_or_duplicate(Err(lotus_common::Error::UniqueViolation(
            "UNIQUE constraint failed".to_string(),
        )))
        .unwrap();
        assert_eq!(outcome, Outcome::Duplicate);

        let err = created_or_duplicate(Err(lotus_common::Error::Internal("boom".to_string())));
        assert!(err.is_err());
    }
}
