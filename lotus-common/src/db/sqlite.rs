//! SQLite implementation of [`Store`]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use super::models::{ContactSubmission, MeditationSession, NewsletterSubscriber, Preferences, Subscriber};
use super::store::Store;
use crate::time::{from_storage, to_storage};
use crate::{Error, Result};

/// Store backed by a `sqlx` SQLite pool
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn optional_timestamp(value: Option<String>) -> Result<Option<DateTime<Utc>>> {
    value.as_deref().map(from_storage).transpose()
}

fn newsletter_from_row(row: &SqliteRow) -> Result<NewsletterSubscriber> {
    let subscribed_at: String = row.try_get("subscribed_at")?;
    Ok(NewsletterSubscriber {
        email: row.try_get("email")?,
        is_active: row.try_get("is_active")?,
        subscribed_at: from_storage(&subscribed_at)?,
        resubscribed_at: optional_timestamp(row.try_get("resubscribed_at")?)?,
        source: row.try_get("source")?,
    })
}

fn subscriber_from_row(row: &SqliteRow) -> Result<Subscriber> {
    let preferences: String = row.try_get("preferences")?;
    let preferences: Preferences = serde_json::from_str(&preferences)
        .map_err(|e| Error::Internal(format!("Failed to deserialize preferences: {}", e)))?;
    let created_at: String = row.try_get("created_at")?;

    Ok(Subscriber {
        email: row.try_get("email")?,
        name: row.try_get("name")?,
        confirmed: row.try_get("confirmed")?,
        preferences,
        created_at: from_storage(&created_at)?,
        unsubscribed_at: optional_timestamp(row.try_get("unsubscribed_at")?)?,
    })
}

fn session_from_row(row: &SqliteRow) -> Result<MeditationSession> {
    let date: String = row.try_get("date")?;
    let created_at: String = row.try_get("created_at")?;
    let duration: Option<i64> = row.try_get("duration")?;

    Ok(MeditationSession {
        user_id: row.try_get("user_id")?,
        session_id: row.try_get("session_id")?,
        date: from_storage(&date)?,
        duration: duration.map(|d| d.clamp(0, u32::MAX as i64) as u32),
        session_type: row.try_get("type")?,
        mood_before: row.try_get("mood_before")?,
        mood_after: row.try_get("mood_after")?,
        notes: row.try_get("notes")?,
        created_at: from_storage(&created_at)?,
    })
}

#[async_trait]
impl Store for SqliteStore {
    async fn insert_contact(&self, submission: &ContactSubmission) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO contact_submissions (
                guid, name, email, subject, category, message, submitted_at, source, status
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(submission.guid.to_string())
        .bind(&submission.name)
        .bind(&submission.email)
        .bind(&submission.subject)
        .bind(&submission.category)
        .bind(&submission.message)
        .bind(to_storage(&submission.submitted_at))
        .bind(&submission.source)
        .bind(&submission.status)
        .execute(&self.pool)
        .await
        .map_err(Error::from_insert)?;

        Ok(())
    }

    async fn find_newsletter_subscriber(&self, email: &str) -> Result<Option<NewsletterSubscriber>> {
        let row = sqlx::query(
            "SELECT email, is_active, subscribed_at, resubscribed_at, source
             FROM newsletter_subscribers WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(newsletter_from_row).transpose()
    }

    async fn insert_newsletter_subscriber(&self, subscriber: &NewsletterSubscriber) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO newsletter_subscribers (email, is_active, subscribed_at, resubscribed_at, source)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&subscriber.email)
        .bind(subscriber.is_active)
        .bind(to_storage(&subscriber.subscribed_at))
        .bind(subscriber.resubscribed_at.as_ref().map(to_storage))
        .bind(&subscriber.source)
        .execute(&self.pool)
        .await
        .map_err(Error::from_insert)?;

        Ok(())
    }

    async fn reactivate_newsletter_subscriber(&self, email: &str, at: DateTime<Utc>) -> Result<()> {
        let result = sqlx::query(
            "UPDATE newsletter_subscribers SET is_active = 1, resubscribed_at = ? WHERE email = ?",
        )
        .bind(to_storage(&at))
        .bind(email)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("newsletter subscriber {}", email)));
        }
        Ok(())
    }

    async fn find_subscriber(&self, email: &str) -> Result<Option<Subscriber>> {
        let row = sqlx::query(
            "SELECT email, name, confirmed, preferences, created_at, unsubscribed_at
             FROM subscribers WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(subscriber_from_row).transpose()
    }

    async fn insert_subscriber(&self, subscriber: &Subscriber) -> Result<()> {
        let preferences = serde_json::to_string(&subscriber.preferences)
            .map_err(|e| Error::Internal(format!("Failed to serialize preferences: {}", e)))?;

        sqlx::query(
            r#"
            INSERT INTO subscribers (email, name, confirmed, preferences, created_at, unsubscribed_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&subscriber.email)
        .bind(&subscriber.name)
        .bind(subscriber.confirmed)
        .bind(preferences)
        .bind(to_storage(&subscriber.created_at))
        .bind(subscriber.unsubscribed_at.as_ref().map(to_storage))
        .execute(&self.pool)
        .await
        .map_err(Error::from_insert)?;

        Ok(())
    }

    async fn revive_subscriber(
        &self,
        email: &str,
        name: Option<&str>,
        preferences: Option<&Preferences>,
    ) -> Result<()> {
        let preferences = preferences
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| Error::Internal(format!("Failed to serialize preferences: {}", e)))?;

        let result = sqlx::query(
            r#"
            UPDATE subscribers
            SET unsubscribed_at = NULL,
                name = COALESCE(?, name),
                preferences = COALESCE(?, preferences)
            WHERE email = ?
            "#,
        )
        .bind(name)
        .bind(preferences)
        .bind(email)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("subscriber {}", email)));
        }
        Ok(())
    }

    async fn unsubscribe(&self, email: &str, at: DateTime<Utc>) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE subscribers SET unsubscribed_at = ? WHERE email = ? AND unsubscribed_at IS NULL",
        )
        .bind(to_storage(&at))
        .bind(email)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn insert_session(&self, session: &MeditationSession) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO meditation_sessions (
                user_id, session_id, date, duration, type,
                mood_before, mood_after, notes, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&session.user_id)
        .bind(&session.session_id)
        .bind(to_storage(&session.date))
        .bind(session.duration.map(i64::from))
        .bind(&session.session_type)
        .bind(&session.mood_before)
        .bind(&session.mood_after)
        .bind(&session.notes)
        .bind(to_storage(&session.created_at))
        .execute(&self.pool)
        .await
        .map_err(Error::from_insert)?;

        Ok(())
    }

    async fn list_sessions(&self, user_id: &str) -> Result<Vec<MeditationSession>> {
        let rows = sqlx::query(
            r#"
            SELECT user_id, session_id, date, duration, type,
                   mood_before, mood_after, notes, created_at
            FROM meditation_sessions
            WHERE user_id = ?
            ORDER BY date DESC, row_id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(session_from_row).collect()
    }

    async fn update_post_image(&self, post_id: &str, image_url: &str) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE blog_posts SET image_url = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
        )
        .bind(image_url)
        .bind(post_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
