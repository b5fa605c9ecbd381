use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration, mapped to `gymshot.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GymshotConfig {
    pub vision: VisionConfig,
    pub webhook: WebhookConfig,
    pub paths: PathsConfig,
    pub schedule: ScheduleConfig,
    pub logging: LoggingConfig,
}

// ── Vision ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    /// Base URL of an OpenAI-compatible API; `/chat/completions` is appended.
    pub api_url: String,
    /// Model identifier, e.g. "openai/gpt-4.1-mini".
    pub model: String,
    /// Bearer credential. Can also be set via OPENROUTER_API_KEY.
    /// Config file takes priority over environment variable.
    pub api_key: Option<String>,
    /// Sent as `HTTP-Referer` (OpenRouter app attribution).
    pub referer: Option<String>,
    /// Sent as `X-Title` (OpenRouter app attribution).
    pub title: Option<String>,
    pub request_timeout_secs: u64,
    /// File whose contents replace the built-in extraction prompt.
    pub prompt_file: Option<PathBuf>,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            api_url: "https://openrouter.ai/api/v1".into(),
            model: "openai/gpt-4.1-mini".into(),
            api_key: None,
            referer: Some("http://localhost:3000".into()),
            title: Some("Exercise Analysis Script".into()),
            request_timeout_secs: 120,
            prompt_file: None,
        }
    }
}

// ── Webhook ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    pub url: String,
    pub timeout_secs: u64,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:5678/webhook/e95230af-88db-49e0-bebd-ad5fd19fde45".into(),
            timeout_secs: 30,
        }
    }
}

// ── Paths ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Screenshots waiting to be processed.
    pub pending_dir: PathBuf,
    /// Processed screenshots are moved here.
    pub archive_dir: PathBuf,
    /// Batches abandoned after repeated unexpected API responses.
    pub quarantine_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            pending_dir: PathBuf::from("screens"),
            archive_dir: PathBuf::from("old"),
            quarantine_dir: PathBuf::from("failed"),
        }
    }
}

// ── Schedule ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Images sent to the model per request.
    pub batch_size: usize,
    /// Pause after every iteration that reached the vision API.
    pub poll_interval_secs: u64,
    /// Extra pause after a failed vision API call.
    pub retry_backoff_secs: u64,
    /// Unexpected-shape responses tolerated for one batch before it is
    /// quarantined. 0 = retry forever.
    pub max_unexpected_attempts: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            batch_size: 2,
            poll_interval_secs: 30,
            retry_backoff_secs: 5,
            max_unexpected_attempts: 3,
        }
    }
}

impl ScheduleConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_secs(self.retry_backoff_secs)
    }
}

// ── Logging ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    pub level: String,
    /// Output format: "pretty", "json", "compact".
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}

// ── Credential ─────────────────────────────────────────────────

impl GymshotConfig {
    /// The vision API key, or `MissingCredential` if none was configured.
    pub fn require_api_key(&self) -> gymshot_core::Result<&str> {
        match self.vision.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(gymshot_core::GymshotError::MissingCredential),
        }
    }

    /// Copy of the config safe to print: the API key is masked.
    pub fn redacted(&self) -> GymshotConfig {
        let mut config = self.clone();
        if let Some(key) = config.vision.api_key.as_mut() {
            *key = mask_secret(key);
        }
        config
    }
}

fn mask_secret(secret: &str) -> String {
    let visible: String = secret.chars().take(6).collect();
    if secret.chars().count() <= 10 {
        "****".into()
    } else {
        format!("{visible}****")
    }
}

// ── Validation ─────────────────────────────────────────────────

/// A single config validation issue.
#[derive(Debug)]
pub struct ConfigWarning {
    pub field: String,
    pub message: String,
    pub severity: WarningSeverity,
    pub hint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningSeverity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self.severity {
            WarningSeverity::Error => "error",
            WarningSeverity::Warning => "warning",
            WarningSeverity::Info => "info",
        };
        write!(f, "{}: {}: {}", label, self.field, self.message)?;
        if let Some(ref h) = self.hint {
            write!(f, " ({})", h)?;
        }
        Ok(())
    }
}

impl GymshotConfig {
    /// Validate the config and return a list of warnings.
    /// Returns `Err` with all messages joined if any severity is Error.
    pub fn validate(&self) -> Result<Vec<ConfigWarning>, String> {
        let mut warnings = Vec::new();

        // ── Vision ───
        if self.vision.model.trim().is_empty() {
            warnings.push(ConfigWarning {
                field: "vision.model".into(),
                message: "model is empty".into(),
                severity: WarningSeverity::Error,
                hint: Some("Set to e.g. 'openai/gpt-4.1-mini'".into()),
            });
        }
        if !is_http_url(&self.vision.api_url) {
            warnings.push(ConfigWarning {
                field: "vision.api_url".into(),
                message: format!("'{}' is not an http(s) URL", self.vision.api_url),
                severity: WarningSeverity::Error,
                hint: Some("Use e.g. 'https://openrouter.ai/api/v1'".into()),
            });
        }
        if self.vision.request_timeout_secs == 0 {
            warnings.push(ConfigWarning {
                field: "vision.request_timeout_secs".into(),
                message: "timeout is 0; every request would fail immediately".into(),
                severity: WarningSeverity::Error,
                hint: Some("Vision calls with two images can take a minute; try 120".into()),
            });
        }
        if let Some(ref file) = self.vision.prompt_file
            && !file.exists()
        {
            warnings.push(ConfigWarning {
                field: "vision.prompt_file".into(),
                message: format!("{} does not exist", file.display()),
                severity: WarningSeverity::Error,
                hint: None,
            });
        }

        // ── Webhook ───
        if !is_http_url(&self.webhook.url) {
            warnings.push(ConfigWarning {
                field: "webhook.url".into(),
                message: format!("'{}' is not an http(s) URL", self.webhook.url),
                severity: WarningSeverity::Error,
                hint: None,
            });
        }
        if self.webhook.timeout_secs == 0 {
            warnings.push(ConfigWarning {
                field: "webhook.timeout_secs".into(),
                message: "timeout is 0; every delivery would fail immediately".into(),
                severity: WarningSeverity::Error,
                hint: Some("Set to e.g. 30".into()),
            });
        }

        // ── Paths ───
        if self.paths.pending_dir == self.paths.archive_dir {
            warnings.push(ConfigWarning {
                field: "paths.archive_dir".into(),
                message: "archive directory is the pending directory; images would be reprocessed forever".into(),
                severity: WarningSeverity::Error,
                hint: None,
            });
        }
        if self.paths.pending_dir == self.paths.quarantine_dir {
            warnings.push(ConfigWarning {
                field: "paths.quarantine_dir".into(),
                message: "quarantine directory is the pending directory".into(),
                severity: WarningSeverity::Error,
                hint: None,
            });
        }

        // ── Schedule ───
        if self.schedule.batch_size == 0 {
            warnings.push(ConfigWarning {
                field: "schedule.batch_size".into(),
                message: "batch size is 0; nothing would ever be selected".into(),
                severity: WarningSeverity::Error,
                hint: Some("The prompt is written for 2 screenshots per exercise".into()),
            });
        } else if self.schedule.batch_size != 2 {
            warnings.push(ConfigWarning {
                field: "schedule.batch_size".into(),
                message: format!("batch size is {}", self.schedule.batch_size),
                severity: WarningSeverity::Info,
                hint: Some("The prompt is written for 2 screenshots per exercise".into()),
            });
        }
        if self.schedule.poll_interval_secs == 0 {
            warnings.push(ConfigWarning {
                field: "schedule.poll_interval_secs".into(),
                message: "no pause between iterations".into(),
                severity: WarningSeverity::Warning,
                hint: Some("Provider rate limits may kick in".into()),
            });
        }
        if self.schedule.max_unexpected_attempts == 0 {
            warnings.push(ConfigWarning {
                field: "schedule.max_unexpected_attempts".into(),
                message: "quarantine disabled; a batch the model cannot answer is retried forever".into(),
                severity: WarningSeverity::Warning,
                hint: None,
            });
        }

        // ── Logging ───
        let valid_formats = ["pretty", "json", "compact"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            warnings.push(ConfigWarning {
                field: "logging.format".into(),
                message: format!("unknown log format '{}'", self.logging.format),
                severity: WarningSeverity::Warning,
                hint: Some(format!("Valid values: {}", valid_formats.join(", "))),
            });
        }
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            warnings.push(ConfigWarning {
                field: "logging.level".into(),
                message: format!("unknown log level '{}'", self.logging.level),
                severity: WarningSeverity::Warning,
                hint: Some(format!("Valid values: {}", valid_levels.join(", "))),
            });
        }

        let errors: Vec<String> = warnings
            .iter()
            .filter(|w| w.severity == WarningSeverity::Error)
            .map(|w| format!("{}: {}", w.field, w.message))
            .collect();

        if !errors.is_empty() {
            return Err(format!("Configuration errors:\n  • {}", errors.join("\n  • ")));
        }

        Ok(warnings)
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}
