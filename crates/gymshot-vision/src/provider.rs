use async_trait::async_trait;
use gymshot_core::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A single image, already base64-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    /// Where the bytes came from (for logging and archival).
    pub source: PathBuf,
    /// Standard base64 of the file contents.
    pub data: String,
}

/// A request to a vision model: one user message with text + images.
#[derive(Debug, Clone)]
pub struct VisionRequest {
    /// Model identifier, e.g. "openai/gpt-4.1-mini".
    pub model: String,
    /// Instruction text sent before the images.
    pub prompt: String,
    pub images: Vec<EncodedImage>,
}

impl VisionRequest {
    pub fn sources(&self) -> Vec<PathBuf> {
        self.images.iter().map(|i| i.source.clone()).collect()
    }
}

/// The model's reply.
#[derive(Debug, Clone)]
pub struct VisionResponse {
    /// Text of `choices[0].message.content`.
    pub content: String,
    pub usage: Usage,
}

/// Token usage statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl Usage {
    pub fn total_tokens(&self) -> u64 {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}

/// Trait implemented by each vision backend.
#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// Human-readable name, e.g. "openrouter".
    fn name(&self) -> &str;

    /// Send the request and return the model's text reply.
    ///
    /// Network failures and non-2xx statuses are `VisionProvider` errors; a
    /// 2xx body without a text reply is `UnexpectedResponse`.
    async fn complete(&self, request: &VisionRequest) -> Result<VisionResponse>;
}
