//! # gymshot-core
//!
//! Shared vocabulary for the gymshot workspace: the unified error type, the
//! exercise record the vision model is asked to produce, and the payload
//! shape forwarded to the webhook.

pub mod error;
pub mod payload;
pub mod record;

pub use error::{GymshotError, Result};
pub use payload::WebhookPayload;
pub use record::{ExerciseRecord, ExerciseType, MuscleGroup, SetupEntry};
