use serde::Serialize;

/// Body posted to the webhook.
///
/// `Record` carries the translated model output as-is (extra top-level fields
/// included); `Raw` is the fallback used when the output is not valid JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WebhookPayload {
    Record(serde_json::Value),
    Raw { raw_content: String },
}

impl WebhookPayload {
    pub fn raw(text: impl Into<String>) -> Self {
        WebhookPayload::Raw {
            raw_content: text.into(),
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, WebhookPayload::Raw { .. })
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            WebhookPayload::Record(value) => value.clone(),
            WebhookPayload::Raw { raw_content } => {
                serde_json::json!({ "raw_content": raw_content })
            }
        }
    }
}
