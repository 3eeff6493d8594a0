//! Input validation for every request kind
//!
//! Validators take the raw JSON body and either return a normalized, typed
//! record (strings trimmed, email lower-cased) or a [`ValidationError`]
//! listing every offending field. They never touch storage.

use chrono::{DateTime, Utc};
use lotus_common::db::Preferences;
use lotus_common::time::parse_date;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_EMAIL_LEN: usize = 255;
pub const MAX_MESSAGE_LEN: usize = 5000;
pub const MAX_SUBJECT_LEN: usize = 200;
pub const MAX_CATEGORY_LEN: usize = 50;
pub const MAX_SOURCE_LEN: usize = 50;

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

/// Field path → reason for every rule a request broke
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub fields: BTreeMap<String, String>,
}

impl ValidationError {
    pub fn single(field: &str, reason: impl Into<String>) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(field.to_string(), reason.into());
        Self { fields }
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.fields.keys().map(String::as_str).collect();
        write!(f, "invalid fields: {}", names.join(", "))
    }
}

impl std::error::Error for ValidationError {}

/// Normalized contact form
#[derive(Debug, Clone, PartialEq)]
pub struct ContactInput {
    pub name: String,
    pub email: String,
    pub message: String,
    pub subject: Option<String>,
    pub category: Option<String>,
    pub source: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Normalized newsletter signup
#[derive(Debug, Clone, PartialEq)]
pub struct NewsletterInput {
    pub email: String,
    pub source: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Normalized general subscribe request
#[derive(Debug, Clone, PartialEq)]
pub struct SubscribeInput {
    pub email: String,
    pub name: Option<String>,
    /// `None` when the request carried no preferences object
    pub preferences: Option<Preferences>,
}

/// Normalized meditation session payload
#[derive(Debug, Clone, PartialEq)]
pub struct SessionInput {
    pub id: String,
    pub date: DateTime<Utc>,
    pub duration: Option<u32>,
    pub session_type: Option<String>,
    pub mood_before: Option<String>,
    pub mood_after: Option<String>,
    pub notes: Option<String>,
}

/// Normalized blog image request
#[derive(Debug, Clone, PartialEq)]
pub struct BlogImageInput {
    pub post_id: String,
    pub title: String,
    pub excerpt: Option<String>,
    pub category: Option<String>,
}

/// Collects field errors while reading values out of a JSON object
struct FieldReader<'a> {
    object: Option<&'a Map<String, Value>>,
    errors: ValidationError,
}

impl<'a> FieldReader<'a> {
    fn new(raw: &'a Value) -> Self {
        let mut errors = ValidationError::default();
        let object = raw.as_object();
        if object.is_none() {
            errors.fields.insert("body".to_string(), "must be a JSON object".to_string());
        }
        Self { object, errors }
    }

    fn fail(&mut self, field: &str, reason: impl Into<String>) {
        self.errors.fields.entry(field.to_string()).or_insert_with(|| reason.into());
    }

    fn get(&self, field: &str) -> Option<&'a Value> {
        self.object
            .and_then(|o| o.get(field))
            .filter(|v| !v.is_null())
    }

    /// Trimmed string; empty strings read as absent
    fn string(&mut self, field: &str, max: Option<usize>) -> Option<String> {
        let value = match self.get(field)? {
            Value::String(s) => s.trim().to_string(),
            _ => {
                self.fail(field, "must be a string");
                return None;
            }
        };
        if value.is_empty() {
            return None;
        }
        if let Some(max) = max {
            if value.chars().count() > max {
                self.fail(field, format!("must be at most {} characters", max));
                return None;
            }
        }
        Some(value)
    }

    fn required_string(&mut self, field: &str, max: Option<usize>) -> Option<String> {
        let present = self.get(field).is_some();
        let value = self.string(field, max);
        if value.is_none() && !self.errors.contains(field) {
            self.fail(field, if present { "must not be empty" } else { "is required" });
        }
        value
    }

    /// String or number, stored as text
    fn text_or_number(&mut self, field: &str) -> Option<String> {
        match self.get(field)? {
            Value::Number(n) => Some(n.to_string()),
            Value::String(_) => self.string(field, None),
            _ => {
                self.fail(field, "must be a string or number");
                None
            }
        }
    }

    /// Length cap applies to the lower-cased form
    fn email(&mut self) -> Option<String> {
        let email = self.required_string("email", None)?.to_lowercase();
        if email.chars().count() > MAX_EMAIL_LEN {
            self.fail("email", format!("must be at most {} characters", MAX_EMAIL_LEN));
            return None;
        }
        if !is_valid_email(&email) {
            self.fail("email", "must be a valid email address");
            return None;
        }
        Some(email)
    }

    fn timestamp(&mut self, field: &str) -> Option<DateTime<Utc>> {
        let raw = self.string(field, None)?;
        let parsed = parse_date(&raw);
        if parsed.is_none() {
            self.fail(field, "must be an ISO 8601 date or timestamp");
        }
        parsed
    }

    fn finish<T>(self, build: impl FnOnce() -> Option<T>) -> Result<T, ValidationError> {
        if !self.errors.fields.is_empty() {
            return Err(self.errors);
        }
        build().ok_or(self.errors)
    }
}

/// Email format check shared by every handler
pub fn is_valid_email(email: &str) -> bool {
    email.chars().count() <= MAX_EMAIL_LEN && EMAIL_PATTERN.is_match(email)
}

pub fn validate_contact(raw: &Value) -> Result<ContactInput, ValidationError> {
    let mut r = FieldReader::new(raw);
    let name = r.required_string("name", Some(MAX_NAME_LEN));
    let email = r.email();
    let message = r.required_string("message", Some(MAX_MESSAGE_LEN));
    let subject = r.string("subject", Some(MAX_SUBJECT_LEN));
    let category = r.string("category", Some(MAX_CATEGORY_LEN));
    let source = r.string("source", Some(MAX_SOURCE_LEN));
    let timestamp = r.timestamp("timestamp");

    r.finish(|| {
        Some(ContactInput {
            name: name?,
            email: email?,
            message: message?,
            subject,
            category,
            source,
            timestamp,
        })
    })
}

pub fn validate_newsletter(raw: &Value) -> Result<NewsletterInput, ValidationError> {
    let mut r = FieldReader::new(raw);
    let email = r.email();
    let source = r.string("source", Some(MAX_SOURCE_LEN));
    let timestamp = r.timestamp("timestamp");

    r.finish(|| {
        Some(NewsletterInput {
            email: email?,
            source,
            timestamp,
        })
    })
}

pub fn validate_subscribe(raw: &Value) -> Result<SubscribeInput, ValidationError> {
    let mut r = FieldReader::new(raw);
    let email = r.email();
    let name = r.string("name", None);
    let preferences = read_preferences(&mut r);

    r.finish(|| {
        Some(SubscribeInput {
            email: email?,
            name,
            preferences,
        })
    })
}

/// Email-only payload (unsubscribe)
pub fn validate_email_only(raw: &Value) -> Result<String, ValidationError> {
    let mut r = FieldReader::new(raw);
    let email = r.email();
    r.finish(|| email)
}

/// Supplied preferences with per-key defaults; `None` when absent
fn read_preferences(r: &mut FieldReader<'_>) -> Option<Preferences> {
    let defaults = Preferences::default();
    let object = match r.get("preferences")? {
        Value::Object(o) => o,
        _ => {
            r.fail("preferences", "must be an object");
            return None;
        }
    };

    let mut flag = |key: &str, default: bool| match object.get(key) {
        None | Some(Value::Null) => default,
        Some(Value::Bool(b)) => *b,
        Some(_) => {
            r.fail(&format!("preferences.{}", key), "must be a boolean");
            default
        }
    };

    Some(Preferences {
        new_posts: flag("new_posts", defaults.new_posts),
        weekly_digest: flag("weekly_digest", defaults.weekly_digest),
        monthly_digest: flag("monthly_digest", defaults.monthly_digest),
    })
}

pub fn validate_session(raw: &Value) -> Result<SessionInput, ValidationError> {
    let mut r = FieldReader::new(raw);
    let id = r.required_string("id", None);
    let date = if r.get("date").is_none() {
        r.fail("date", "is required");
        None
    } else {
        r.timestamp("date")
    };

    let duration = match r.get("duration") {
        None => None,
        Some(v) => match v.as_u64().and_then(|d| u32::try_from(d).ok()) {
            Some(d) => Some(d),
            None => {
                r.fail("duration", "must be a non-negative whole number of minutes");
                None
            }
        },
    };

    let session_type = r.string("type", None);
    let mood_before = r.text_or_number("mood_before");
    let mood_after = r.text_or_number("mood_after");
    let notes = r.string("notes", None);

    r.finish(|| {
        Some(SessionInput {
            id: id?,
            date: date?,
            duration,
            session_type,
            mood_before,
            mood_after,
            notes,
        })
    })
}

pub fn validate_blog_image(raw: &Value) -> Result<BlogImageInput, ValidationError> {
    let mut r = FieldReader::new(raw);
    let post_id = r.text_or_number("post_id");
    if post_id.is_none() && !r.errors.contains("post_id") {
        r.fail("post_id", "is required");
    }
    let title = r.required_string("title", None);
    let excerpt = r.string("excerpt", None);
    let category = r.string("category", None);

    r.finish(|| {
        Some(BlogImageInput {
            post_id: post_id?,
            title: title?,
            excerpt,
            category,
        })
    })
}
