//! Shared fakes for lotus-api integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use chrono::{DateTime, Utc};
use http_body_util::BodyExt;
use lotus_api::services::{HeaderFingerprint, ImageGenerator, Mailer, UpstreamError};
use lotus_api::{build_router, AppState};
use lotus_common::config::DEFAULT_IDENTITY_HEADER;
use lotus_common::db::{
    ContactSubmission, MeditationSession, NewsletterSubscriber, Preferences, Store, Subscriber,
};
use lotus_common::{Error, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// In-memory store that counts writes and can be told to fail
#[derive(Default)]
pub struct FakeStore {
    pub inner: Mutex<FakeStoreState>,
}

#[derive(Default)]
pub struct FakeStoreState {
    pub contacts: Vec<ContactSubmission>,
    pub newsletter: HashMap<String, NewsletterSubscriber>,
    pub subscribers: HashMap<String, Subscriber>,
    pub sessions: Vec<MeditationSession>,
    pub posts: HashMap<String, Option<String>>,
    pub inserts: usize,
    pub updates: usize,
    /// Every write fails with a database error
    pub fail_writes: bool,
    /// Every read fails with a database error
    pub fail_reads: bool,
    /// Subscriber inserts fail as if a concurrent request won the race
    pub lose_insert_race: bool,
}

impl FakeStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn state(&self) -> std::sync::MutexGuard<'_, FakeStoreState> {
        self.inner.lock().unwrap()
    }

    pub fn writes(&self) -> usize {
        let state = self.state();
        state.inserts + state.updates
    }

    fn read_check(&self) -> Result<()> {
        if self.state().fail_reads {
            return Err(Error::Internal("disk on fire".to_string()));
        }
        Ok(())
    }

    fn write_check(&self) -> Result<()> {
        if self.state().fail_writes {
            return Err(Error::Internal("disk on fire".to_string()));
        }
        Ok(())
    }

    fn race_check(&self) -> Result<()> {
        if self.state().lose_insert_race {
            return Err(Error::UniqueViolation("UNIQUE constraint failed".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl Store for FakeStore {
    async fn insert_contact(&self, submission: &ContactSubmission) -> Result<()> {
        self.write_check()?;
        let mut state = self.state();
        state.inserts += 1;
        state.contacts.push(submission.clone());
        Ok(())
    }

    async fn find_newsletter_subscriber(&self, email: &str) -> Result<Option<NewsletterSubscriber>> {
        self.read_check()?;
        Ok(self.state().newsletter.get(email).cloned())
    }

    async fn insert_newsletter_subscriber(&self, subscriber: &NewsletterSubscriber) -> Result<()> {
        self.write_check()?;
        self.race_check()?;
        let mut state = self.state();
        if state.newsletter.contains_key(&subscriber.email) {
            return Err(Error::UniqueViolation(subscriber.email.clone()));
        }
        state.inserts += 1;
        state.newsletter.insert(subscriber.email.clone(), subscriber.clone());
        Ok(())
    }

    async fn reactivate_newsletter_subscriber(&self, email: &str, at: DateTime<Utc>) -> Result<()> {
        self.write_check()?;
        let mut state = self.state();
        state.updates += 1;
        let row = state
            .newsletter
            .get_mut(email)
            .ok_or_else(|| Error::NotFound(email.to_string()))?;
        row.is_active = true;
        row.resubscribed_at = Some(at);
        Ok(())
    }

    async fn find_subscriber(&self, email: &str) -> Result<Option<Subscriber>> {
        self.read_check()?;
        Ok(self.state().subscribers.get(email).cloned())
    }

    async fn insert_subscriber(&self, subscriber: &Subscriber) -> Result<()> {
        self.write_check()?;
        self.race_check()?;
        let mut state = self.state();
        if state.subscribers.contains_key(&subscriber.email) {
            return Err(Error::UniqueViolation(subscriber.email.clone()));
        }
        state.inserts += 1;
        state.subscribers.insert(subscriber.email.clone(), subscriber.clone());
        Ok(())
    }

    async fn revive_subscriber(
        &self,
        email: &str,
        name: Option<&str>,
        preferences: Option<&Preferences>,
    ) -> Result<()> {
        self.write_check()?;
        let mut state = self.state();
        state.updates += 1;
        let row = state
            .subscribers
            .get_mut(email)
            .ok_or_else(|| Error::NotFound(email.to_string()))?;
        row.unsubscribed_at = None;
        if let Some(name) = name {
            row.name = Some(name.to_string());
        }
        if let Some(preferences) = preferences {
            row.preferences = *preferences;
        }
        Ok(())
    }

    async fn unsubscribe(&self, email: &str, at: DateTime<Utc>) -> Result<bool> {
        self.write_check()?;
        let mut guard = self.state();
        let state = &mut *guard;
        match state.subscribers.get_mut(email) {
            Some(row) if row.unsubscribed_at.is_none() => {
                row.unsubscribed_at = Some(at);
                state.updates += 1;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn insert_session(&self, session: &MeditationSession) -> Result<()> {
        self.write_check()?;
        let mut state = self.state();
        state.inserts += 1;
        state.sessions.push(session.clone());
        Ok(())
    }

    async fn list_sessions(&self, user_id: &str) -> Result<Vec<MeditationSession>> {
        self.read_check()?;
        let mut sessions: Vec<MeditationSession> = self
            .state()
            .sessions
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(sessions)
    }

    async fn update_post_image(&self, post_id: &str, image_url: &str) -> Result<bool> {
        self.write_check()?;
        let mut guard = self.state();
        let state = &mut *guard;
        match state.posts.get_mut(post_id) {
            Some(url) => {
                *url = Some(image_url.to_string());
                state.updates += 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Mailer that records recipients and optionally fails
#[derive(Default)]
pub struct FakeMailer {
    pub sent: Mutex<Vec<(String, Option<String>)>>,
    pub fail: bool,
}

impl FakeMailer {
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Default::default()
        })
    }

    pub fn sent(&self) -> Vec<(String, Option<String>)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for FakeMailer {
    async fn send_welcome(&self, email: &str, name: Option<&str>) -> std::result::Result<(), UpstreamError> {
        self.sent
            .lock()
            .unwrap()
            .push((email.to_string(), name.map(str::to_string)));
        if self.fail {
            return Err(UpstreamError::Other("mail provider down".to_string()));
        }
        Ok(())
    }
}

/// Image generator returning a canned result
pub struct FakeImages {
    pub result: std::result::Result<String, UpstreamError>,
    pub prompts: Mutex<Vec<String>>,
}

impl FakeImages {
    pub fn returning(result: std::result::Result<String, UpstreamError>) -> Arc<Self> {
        Arc::new(Self {
            result,
            prompts: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl ImageGenerator for FakeImages {
    async fn generate(&self, prompt: &str) -> std::result::Result<String, UpstreamError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.result.clone()
    }
}

/// Fakes wired into one application
pub struct TestApp {
    pub store: Arc<FakeStore>,
    pub mailer: Arc<FakeMailer>,
    pub images: Arc<FakeImages>,
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with(
            FakeStore::new(),
            Arc::new(FakeMailer::default()),
            FakeImages::returning(Ok("https://images.example/generated.png".to_string())),
        )
    }

    pub fn with(store: Arc<FakeStore>, mailer: Arc<FakeMailer>, images: Arc<FakeImages>) -> Self {
        let state = AppState::new(
            store.clone(),
            mailer.clone(),
            images.clone(),
            Arc::new(HeaderFingerprint::new(DEFAULT_IDENTITY_HEADER)),
        );
        Self {
            store,
            mailer,
            images,
            state,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        build_router(self.state.clone()).oneshot(request).await.unwrap()
    }
}

/// Client id sent by every helper-built request
pub const TEST_CLIENT_ID: &str = "3f9c2a17-test-client";

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header(DEFAULT_IDENTITY_HEADER, TEST_CLIENT_ID)
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(DEFAULT_IDENTITY_HEADER, TEST_CLIENT_ID)
        .body(Body::empty())
        .unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).expect("Should parse JSON")
}
