//! Welcome email delivery

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tracing::info;

use super::image_gen::UpstreamError;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

pub const DEFAULT_FROM: &str = "Lotus <hello@lotus.local>";

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_welcome(&self, email: &str, name: Option<&str>) -> Result<(), UpstreamError>;
}

/// Mailer used when no email API key is configured: logs and succeeds
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_welcome(&self, email: &str, name: Option<&str>) -> Result<(), UpstreamError> {
        info!(email, name, "Email delivery not configured; skipping welcome email");
        Ok(())
    }
}

/// Sends mail through an HTTP email API (Resend-compatible JSON body)
pub struct ResendMailer {
    http_client: Client,
    endpoint: String,
    api_key: String,
    from: String,
    site_url: Option<String>,
}

impl ResendMailer {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        from: impl Into<String>,
        site_url: Option<String>,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http_client: Client::builder().timeout(DEFAULT_TIMEOUT).build()?,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            from: from.into(),
            site_url,
        })
    }
}

/// Subject and HTML body of the welcome email
pub fn welcome_message(name: Option<&str>, site_url: Option<&str>) -> (String, String) {
    let greeting = name.map(str::trim).filter(|n| !n.is_empty()).unwrap_or("friend");
    let link = site_url
        .map(|url| format!(r#"<p><a href="{}">Visit the site</a> whenever you need a quiet moment.</p>"#, url))
        .unwrap_or_default();

    let subject = "Welcome to Lotus".to_string();
    let html = format!(
        "<h1>Welcome, {}!</h1>\
         <p>Thank you for subscribing. You'll receive new guided meditations, \
         reflections and retreat news according to your preferences.</p>{}",
        escape_html(greeting),
        link
    );
    (subject, html)
}

fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send_welcome(&self, email: &str, name: Option<&str>) -> Result<(), UpstreamError> {
        let (subject, html) = welcome_message(name, self.site_url.as_deref());

        let response = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "from": self.from,
                "to": [email],
                "subject": subject,
                "html": html,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::from_status(status.as_u16(), &body));
        }

        info!(email, "Welcome email sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_welcome_message_uses_name() {
        let (subject, html) = welcome_message(Some(" Ada "), Some("https://example.com"));
        assert_eq!(subject, "Welcome to Lotus");
        assert!(html.contains("Welcome, Ada!"));
        assert!(html.contains("https://example.com"));
    }

    #[test]
    fn test_welcome_message_without_name_or_site() {
        let (_, html) = welcome_message(None, None);
        assert!(html.contains("Welcome, friend!"));
        assert!(!html.contains("href"));
    }

    #[test]
    fn test_welcome_message_escapes_name() {
        let (_, html) = welcome_message(Some("<b>Eve</b>"), None);
        assert!(html.contains("&lt;b&gt;Eve&lt;/b&gt;"));
    }

    #[tokio::test]
    async fn test_log_mailer_always_succeeds() {
        assert!(LogMailer.send_welcome("a@b.co", None).await.is_ok());
    }
}
