//! Outbound mail.
//!
//! Delivery is a black box behind the [`Mailer`] trait: the production
//! implementation posts JSON to an HTTP mail provider. Callers treat a
//! delivery failure as a warning, not an error; tokens are persisted
//! before mail is attempted, so an administrator can always hand the link
//! over out-of-band.

use async_trait::async_trait;
use eyre::Result;
use serde_json::json;

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<()>;
}

/// Posts `{from, to, subject, html}` to a configured provider endpoint.
pub struct HttpMailer {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    from: String,
}

impl HttpMailer {
    pub fn new(endpoint: String, api_key: Option<String>, from: String) -> Self {
        HttpMailer {
            client: reqwest::Client::new(),
            endpoint,
            api_key,
            from,
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<()> {
        let mut request = self.client.post(&self.endpoint).json(&json!({
            "from": self.from,
            "to": to,
            "subject": subject,
            "html": html,
        }));

        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        response.error_for_status()?;

        tracing::debug!("Mail sent to {}: {}", to, subject);
        Ok(())
    }
}

/// Logs and drops mail. Used in tests and in deployments without a
/// provider configured.
pub struct NoopMailer;

#[async_trait]
impl Mailer for NoopMailer {
    async fn send(&self, to: &str, subject: &str, _html: &str) -> Result<()> {
        tracing::info!("Mail delivery disabled; dropping mail to {}: {}", to, subject);
        Ok(())
    }
}
