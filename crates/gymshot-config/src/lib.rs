//! # gymshot-config
//!
//! Configuration for gymshot. Reads `gymshot.toml`, then applies environment
//! variable overrides, then CLI overrides, each layer winning over the previous one.

pub mod loader;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::GymshotConfig;
pub use schema::{
    ConfigWarning, LoggingConfig, PathsConfig, ScheduleConfig, VisionConfig, WarningSeverity,
    WebhookConfig,
};
