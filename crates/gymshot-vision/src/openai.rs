use async_trait::async_trait;
use gymshot_core::{GymshotError, Result};
use std::time::Duration;
use tracing::debug;

use crate::provider::*;

pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Every image is sent under this media type regardless of its extension;
/// the hosted models sniff the actual format.
const DATA_URL_MEDIA_TYPE: &str = "image/jpeg";

/// OpenAI-compatible chat-completions provider (OpenRouter, OpenAI, vLLM, …)
pub struct OpenAiCompatProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    provider_name: String,
    referer: Option<String>,
    title: Option<String>,
    timeout: Option<Duration>,
}

impl OpenAiCompatProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: OPENROUTER_BASE_URL.into(),
            provider_name: "openrouter".into(),
            referer: None,
            title: None,
            timeout: None,
        }
    }

    /// Use a custom base URL (OpenAI, a local gateway, a test server…)
    pub fn with_base_url(mut self, url: impl Into<String>, name: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self.provider_name = name.into();
        self
    }

    /// `HTTP-Referer` / `X-Title` headers used by OpenRouter for app attribution.
    pub fn with_attribution(mut self, referer: Option<String>, title: Option<String>) -> Self {
        self.referer = referer;
        self.title = title;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

/// Build the chat-completions body: a single user message whose content is the
/// prompt followed by one `image_url` part per image.
pub fn build_body(request: &VisionRequest) -> serde_json::Value {
    let mut content = vec![serde_json::json!({
        "type": "text",
        "text": request.prompt,
    })];
    for image in &request.images {
        content.push(serde_json::json!({
            "type": "image_url",
            "image_url": {
                "url": format!("data:{DATA_URL_MEDIA_TYPE};base64,{}", image.data),
            }
        }));
    }

    serde_json::json!({
        "model": &request.model,
        "messages": [
            {
                "role": "user",
                "content": content,
            }
        ],
    })
}

/// Pull `choices[0].message.content` out of a completion response.
pub fn parse_completion(data: &serde_json::Value) -> Result<VisionResponse> {
    let content = data["choices"]
        .as_array()
        .and_then(|choices| choices.first())
        .and_then(|choice| choice["message"]["content"].as_str());

    let Some(content) = content else {
        return Err(GymshotError::UnexpectedResponse {
            body: serde_json::to_string_pretty(data).unwrap_or_else(|_| data.to_string()),
        });
    };

    let usage_data = &data["usage"];
    Ok(VisionResponse {
        content: content.to_string(),
        usage: Usage {
            input_tokens: usage_data["prompt_tokens"].as_u64().unwrap_or(0),
            output_tokens: usage_data["completion_tokens"].as_u64().unwrap_or(0),
        },
    })
}

#[async_trait]
impl VisionProvider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.provider_name
    }

    async fn complete(&self, request: &VisionRequest) -> Result<VisionResponse> {
        let body = build_body(request);
        debug!(
            provider = %self.provider_name,
            model = %request.model,
            images = request.images.len(),
            "sending vision request"
        );

        let mut builder = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json");
        if let Some(ref referer) = self.referer {
            builder = builder.header("HTTP-Referer", referer);
        }
        if let Some(ref title) = self.title {
            builder = builder.header("X-Title", title);
        }
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let resp = builder
            .json(&body)
            .send()
            .await
            .map_err(|e| GymshotError::VisionProvider(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(GymshotError::VisionProvider(format!("HTTP {status}: {text}")));
        }

        let data: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| GymshotError::VisionProvider(e.to_string()))?;

        parse_completion(&data)
    }
}
