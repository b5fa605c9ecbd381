use thiserror::Error;

/// Unified error type for the gymshot crates.
#[derive(Error, Debug)]
pub enum GymshotError {
    // ── Startup errors ─────────────────────────────────────────
    #[error("missing API credential: set vision.api_key in gymshot.toml or OPENROUTER_API_KEY")]
    MissingCredential,

    #[error("config error: {0}")]
    Config(String),

    // ── Vision API errors ──────────────────────────────────────
    #[error("vision provider error: {0}")]
    VisionProvider(String),

    #[error("unexpected response format: {body}")]
    UnexpectedResponse { body: String },

    // ── Webhook errors ─────────────────────────────────────────
    #[error("webhook delivery failed: {0}")]
    Webhook(String),

    // ── Generic wrappers ───────────────────────────────────────
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, GymshotError>;
