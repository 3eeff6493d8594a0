//! User identity for the meditation tracker
//!
//! There are no accounts: a user is whoever sends the same header value.
//! This is a fingerprint, not authentication. Two visitors with identical
//! headers share a history, and a changed header starts a new one.
//!
//! Only the first 12 bytes of the header survive truncation, so the header
//! must vary early. Browser user agents all start with `Mozilla/5.0 ` and
//! would collapse into one id; the default is a client-generated
//! `x-client-id` instead.

use axum::http::HeaderMap;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Length of a derived user id
pub const FINGERPRINT_LEN: usize = 16;

/// Value fingerprinted when the header is missing
const ANONYMOUS: &str = "anonymous";

/// Derives a stable user id from request metadata
pub trait IdentityResolver: Send + Sync {
    fn resolve(&self, headers: &HeaderMap) -> String;
}

/// Base64 of one header value, truncated to [`FINGERPRINT_LEN`]
#[derive(Debug, Clone)]
pub struct HeaderFingerprint {
    header: String,
}

impl HeaderFingerprint {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into().to_ascii_lowercase(),
        }
    }
}

impl IdentityResolver for HeaderFingerprint {
    fn resolve(&self, headers: &HeaderMap) -> String {
        let value = headers
            .get(self.header.as_str())
            .map(|v| v.as_bytes())
            .filter(|v| !v.is_empty())
            .unwrap_or(ANONYMOUS.as_bytes());

        let mut encoded = STANDARD.encode(value);
        encoded.truncate(FINGERPRINT_LEN);
        encoded
    }
}
