use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::schema::GymshotConfig;

pub const CONFIG_FILE_NAME: &str = "gymshot.toml";

/// Loads the gymshot configuration once at startup.
pub struct ConfigLoader {
    config: GymshotConfig,
    config_path: PathBuf,
}

impl ConfigLoader {
    /// Resolve the config path:
    /// explicit path > GYMSHOT_CONFIG env > ./gymshot.toml > <config dir>/gymshot/gymshot.toml
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        if let Some(p) = explicit {
            return p.to_path_buf();
        }
        if let Ok(p) = std::env::var("GYMSHOT_CONFIG") {
            return PathBuf::from(p);
        }
        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.exists() {
            return local;
        }
        dirs::config_dir()
            .map(|d| d.join("gymshot").join(CONFIG_FILE_NAME))
            .unwrap_or(local)
    }

    /// Load the config from disk, falling back to defaults.
    pub fn load(path: Option<&Path>) -> gymshot_core::Result<Self> {
        let config_path = Self::resolve_path(path);
        let config = if config_path.exists() {
            info!(?config_path, "loading configuration");
            Self::read_file(&config_path)?
        } else {
            warn!(?config_path, "config file not found, using defaults");
            GymshotConfig::default()
        };

        let config = Self::apply_env_overrides(config);
        Self::check(&config)?;

        Ok(Self {
            config,
            config_path,
        })
    }

    pub fn get(&self) -> &GymshotConfig {
        &self.config
    }

    pub fn into_config(self) -> GymshotConfig {
        self.config
    }

    /// Path the config was (or would have been) loaded from.
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Apply env var overrides (GYMSHOT_MODEL, GYMSHOT_WEBHOOK_URL, etc.)
    fn apply_env_overrides(mut config: GymshotConfig) -> GymshotConfig {
        if let Ok(v) = std::env::var("GYMSHOT_MODEL") {
            config.vision.model = v;
        }
        if let Ok(v) = std::env::var("GYMSHOT_WEBHOOK_URL") {
            config.webhook.url = v;
        }
        if let Ok(v) = std::env::var("GYMSHOT_PENDING_DIR") {
            config.paths.pending_dir = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("GYMSHOT_ARCHIVE_DIR") {
            config.paths.archive_dir = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("GYMSHOT_LOG_LEVEL") {
            config.logging.level = v;
        }
        // API key: config file takes priority, env is the fallback.
        if config.vision.api_key.is_none()
            && let Ok(v) = std::env::var("OPENROUTER_API_KEY")
        {
            config.vision.api_key = Some(v);
        }
        config
    }

    fn read_file(path: &Path) -> gymshot_core::Result<GymshotConfig> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str::<GymshotConfig>(&raw).map_err(|e| {
            gymshot_core::GymshotError::Config(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    /// Log warnings, fail on errors.
    fn check(config: &GymshotConfig) -> gymshot_core::Result<()> {
        match config.validate() {
            Ok(warnings) => {
                for w in &warnings {
                    warn!("{}", w);
                }
                Ok(())
            }
            Err(e) => Err(gymshot_core::GymshotError::Config(e)),
        }
    }
}
