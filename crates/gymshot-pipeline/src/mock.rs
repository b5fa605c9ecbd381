//! In-memory webhook sink for tests.

use async_trait::async_trait;
use gymshot_core::{GymshotError, Result, WebhookPayload};
use parking_lot::Mutex;
use std::sync::Arc;

use crate::webhook::WebhookSink;

/// Records every payload; optionally fails each delivery with a fixed status.
pub struct MockWebhook {
    deliveries: Arc<Mutex<Vec<WebhookPayload>>>,
    fail_status: Option<u16>,
}

impl MockWebhook {
    /// A sink that accepts everything.
    pub fn accepting() -> Self {
        Self {
            deliveries: Arc::new(Mutex::new(vec![])),
            fail_status: None,
        }
    }

    /// A sink that records the payload and then answers with `status`.
    pub fn failing(status: u16) -> Self {
        Self {
            deliveries: Arc::new(Mutex::new(vec![])),
            fail_status: Some(status),
        }
    }

    /// Every payload received so far, including failed deliveries.
    pub fn deliveries(&self) -> Vec<WebhookPayload> {
        self.deliveries.lock().clone()
    }
}

#[async_trait]
impl WebhookSink for MockWebhook {
    fn target(&self) -> &str {
        "mock://webhook"
    }

    async fn deliver(&self, payload: &WebhookPayload) -> Result<()> {
        self.deliveries.lock().push(payload.clone());
        match self.fail_status {
            Some(status) => Err(GymshotError::Webhook(format!("HTTP {status}"))),
            None => Ok(()),
        }
    }
}
