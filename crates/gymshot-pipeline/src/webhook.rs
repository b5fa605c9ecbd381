use async_trait::async_trait;
use gymshot_core::{GymshotError, Result, WebhookPayload};
use std::time::Duration;
use tracing::{info, warn};

/// Destination for translated records.
#[async_trait]
pub trait WebhookSink: Send + Sync {
    /// Where deliveries go (for logging).
    fn target(&self) -> &str;

    /// Deliver one payload. Any non-2xx status or transport failure is an error.
    async fn deliver(&self, payload: &WebhookPayload) -> Result<()>;
}

/// Posts payloads as JSON to a fixed URL.
pub struct HttpWebhook {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl HttpWebhook {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            timeout,
        }
    }
}

#[async_trait]
impl WebhookSink for HttpWebhook {
    fn target(&self) -> &str {
        &self.url
    }

    async fn deliver(&self, payload: &WebhookPayload) -> Result<()> {
        let resp = self
            .client
            .post(&self.url)
            .timeout(self.timeout)
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                let msg = if e.is_timeout() {
                    "request timed out".to_string()
                } else if e.is_connect() {
                    format!("connection failed: {e}")
                } else {
                    format!("request failed: {e}")
                };
                warn!(url = %self.url, error = %msg, "webhook delivery failed");
                GymshotError::Webhook(msg)
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body: String = resp
                .text()
                .await
                .unwrap_or_default()
                .chars()
                .take(1000)
                .collect();
            warn!(url = %self.url, status = status.as_u16(), "webhook delivery failed with HTTP error");
            return Err(GymshotError::Webhook(format!("HTTP {status}: {body}")));
        }

        info!(url = %self.url, status = status.as_u16(), raw = payload.is_raw(), "webhook delivered");
        Ok(())
    }
}
