//! Mock vision provider for deterministic testing.
//!
//! Returns pre-configured replies without making any HTTP calls.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

use crate::provider::*;
use gymshot_core::{GymshotError, Result};

/// A pre-configured reply from the mock provider.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// A successful completion with this text.
    Text(String),
    /// A transport / HTTP failure.
    Error(String),
    /// A 2xx body without `choices[0].message.content`.
    Unexpected(serde_json::Value),
}

/// A mock provider that replays queued replies in order.
///
/// # Example
/// ```
/// use gymshot_vision::mock::MockVisionProvider;
/// let provider = MockVisionProvider::new("test")
///     .with_response(r#"{"name": "Przysiad"}"#);
/// ```
pub struct MockVisionProvider {
    replies: Mutex<VecDeque<MockReply>>,
    /// Track all requests received (for assertions in tests).
    requests: Arc<Mutex<Vec<VisionRequest>>>,
    name: String,
}

impl MockVisionProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            requests: Arc::new(Mutex::new(vec![])),
            name: name.into(),
        }
    }

    /// Queue a successful text reply.
    pub fn with_response(self, text: &str) -> Self {
        self.replies.lock().push_back(MockReply::Text(text.to_string()));
        self
    }

    /// Queue a transport error.
    pub fn with_error(self, error: &str) -> Self {
        self.replies.lock().push_back(MockReply::Error(error.to_string()));
        self
    }

    /// Queue a response body of an unexpected shape.
    pub fn with_unexpected(self, body: serde_json::Value) -> Self {
        self.replies.lock().push_back(MockReply::Unexpected(body));
        self
    }

    /// Shared handle to the requests received so far.
    pub fn recorded_requests(&self) -> Arc<Mutex<Vec<VisionRequest>>> {
        Arc::clone(&self.requests)
    }

    /// Source paths of every request, in call order.
    pub fn requested_sources(&self) -> Vec<Vec<std::path::PathBuf>> {
        self.requests.lock().iter().map(|r| r.sources()).collect()
    }

    fn next_reply(&self) -> MockReply {
        self.replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| MockReply::Error("mock: no more queued replies".into()))
    }
}

#[async_trait]
impl VisionProvider for MockVisionProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: &VisionRequest) -> Result<VisionResponse> {
        self.requests.lock().push(request.clone());
        match self.next_reply() {
            MockReply::Text(content) => Ok(VisionResponse {
                content,
                usage: Usage {
                    input_tokens: 1000,
                    output_tokens: 200,
                },
            }),
            MockReply::Error(msg) => Err(GymshotError::VisionProvider(msg)),
            MockReply::Unexpected(body) => Err(GymshotError::UnexpectedResponse {
                body: body.to_string(),
            }),
        }
    }
}
