//! # gymshot-pipeline
//!
//! The polling pipeline that turns exercise screenshots into webhook
//! deliveries. One iteration:
//!
//! 1. [`selector`] picks the next batch from the pending directory.
//! 2. [`request`] base64-encodes it and builds the vision request around
//!    the extraction [`prompt`].
//! 3. The model's reply goes through [`translator`], which unwraps fenced
//!    JSON and renames muscle groups via [`mapping`].
//! 4. [`webhook`] delivers the result and [`archiver`] moves the images out
//!    of the pending directory.
//!
//! [`pipeline`] drives these steps as an explicit state machine.

pub mod archiver;
pub mod mapping;
pub mod mock;
pub mod pipeline;
pub mod prompt;
pub mod request;
pub mod selector;
pub mod translator;
pub mod webhook;

pub use archiver::{ArchiveReport, Archiver};
pub use mapping::{MappingOutcome, MuscleGroupTable};
pub use pipeline::{IterationOutcome, LoopState, Pipeline, PipelineSettings, RunSummary};
pub use request::{EncodedBatch, RequestBuilder};
pub use selector::select_batch;
pub use translator::{Extraction, Translation, extract_json, translate};
pub use webhook::{HttpWebhook, WebhookSink};
