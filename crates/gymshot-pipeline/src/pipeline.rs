//! # Polling pipeline
//!
//! Drives one batch at a time through
//! `Selecting → Encoding → Requesting → Translating → Dispatching → Archiving`
//! and back to `Selecting`, until the pending directory is empty or the
//! cancellation token fires.
//!
//! Pacing is fixed: after every iteration that reached the vision API the
//! loop waits `poll_interval`; a failed API call adds `retry_backoff` first.
//! An iteration whose images were all unreadable re-selects immediately.
//!
//! Failures of the vision API leave the batch pending so it is retried on
//! the next pass. A reply of unexpected shape does the same, but after
//! `max_unexpected_attempts` consecutive such replies for the same batch the
//! images are moved to the quarantine directory instead.

use gymshot_config::GymshotConfig;
use gymshot_core::{GymshotError, Result};
use gymshot_vision::{OpenAiCompatProvider, VisionProvider};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::archiver::Archiver;
use crate::mapping::MuscleGroupTable;
use crate::prompt::load_prompt;
use crate::request::RequestBuilder;
use crate::selector::select_batch;
use crate::translator::translate;
use crate::webhook::{HttpWebhook, WebhookSink};

/// Directories and pacing for a pipeline.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub pending_dir: PathBuf,
    pub archive_dir: PathBuf,
    pub quarantine_dir: PathBuf,
    pub batch_size: usize,
    pub poll_interval: Duration,
    pub retry_backoff: Duration,
    /// 0 disables quarantine.
    pub max_unexpected_attempts: u32,
}

impl PipelineSettings {
    pub fn from_config(config: &GymshotConfig) -> Self {
        Self {
            pending_dir: config.paths.pending_dir.clone(),
            archive_dir: config.paths.archive_dir.clone(),
            quarantine_dir: config.paths.quarantine_dir.clone(),
            batch_size: config.schedule.batch_size,
            poll_interval: config.schedule.poll_interval(),
            retry_backoff: config.schedule.retry_backoff(),
            max_unexpected_attempts: config.schedule.max_unexpected_attempts,
        }
    }
}

/// Where the loop currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Selecting,
    Encoding,
    /// Nothing in the batch could be read; it is archived without an API call.
    ArchivingOnly,
    Requesting,
    Backoff,
    Translating,
    Dispatching,
    Archiving,
    Quarantining,
    Terminated,
}

/// How one iteration ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IterationOutcome {
    /// The pending directory had no images left.
    Drained,
    /// No image of the batch could be read; the batch was archived.
    Unreadable { archived: usize },
    /// The vision API call failed; the batch stays pending.
    VisionFailed { error: String },
    /// The API answered with an unexpected shape.
    UnexpectedResponse { attempts: u32, quarantined: bool },
    /// A payload was sent to the webhook (successfully or not) and the batch archived.
    Delivered {
        raw: bool,
        webhook_ok: bool,
        archived: usize,
    },
}

impl IterationOutcome {
    /// Pause before the next iteration, or `None` to continue immediately.
    pub fn next_delay(&self, settings: &PipelineSettings) -> Option<Duration> {
        let delay = match self {
            IterationOutcome::Drained => return None,
            // Nothing moved means the same files come back next time.
            IterationOutcome::Unreadable { archived: 0 } => settings.poll_interval,
            IterationOutcome::Unreadable { .. } => return None,
            IterationOutcome::VisionFailed { .. } => settings.retry_backoff + settings.poll_interval,
            IterationOutcome::UnexpectedResponse { .. } | IterationOutcome::Delivered { .. } => {
                settings.poll_interval
            }
        };
        (!delay.is_zero()).then_some(delay)
    }
}

/// Counters for a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub batches: u64,
    pub delivered: u64,
    pub raw_fallbacks: u64,
    pub webhook_failures: u64,
    pub vision_failures: u64,
    pub unexpected_responses: u64,
    pub quarantined: u64,
    pub unreadable: u64,
    pub images_archived: u64,
    pub cancelled: bool,
}

impl RunSummary {
    fn record(&mut self, outcome: &IterationOutcome) {
        match outcome {
            IterationOutcome::Drained => return,
            IterationOutcome::Unreadable { archived } => {
                self.unreadable += 1;
                self.images_archived += *archived as u64;
            }
            IterationOutcome::VisionFailed { .. } => self.vision_failures += 1,
            IterationOutcome::UnexpectedResponse { quarantined, .. } => {
                self.unexpected_responses += 1;
                if *quarantined {
                    self.quarantined += 1;
                }
            }
            IterationOutcome::Delivered {
                raw,
                webhook_ok,
                archived,
            } => {
                if *webhook_ok {
                    self.delivered += 1;
                } else {
                    self.webhook_failures += 1;
                }
                if *raw {
                    self.raw_fallbacks += 1;
                }
                self.images_archived += *archived as u64;
            }
        }
        self.batches += 1;
    }
}

/// The screenshot → webhook pipeline.
pub struct Pipeline {
    provider: Arc<dyn VisionProvider>,
    webhook: Arc<dyn WebhookSink>,
    builder: RequestBuilder,
    table: MuscleGroupTable,
    archiver: Archiver,
    quarantine: Archiver,
    settings: PipelineSettings,
    state: LoopState,
    /// Batch that last got an unexpected reply, and how many times in a row.
    unexpected_streak: Option<(Vec<PathBuf>, u32)>,
}

impl Pipeline {
    pub fn new(
        provider: Arc<dyn VisionProvider>,
        webhook: Arc<dyn WebhookSink>,
        builder: RequestBuilder,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            provider,
            webhook,
            builder,
            table: MuscleGroupTable::builtin().clone(),
            archiver: Archiver::new(settings.archive_dir.clone()),
            quarantine: Archiver::new(settings.quarantine_dir.clone()),
            settings,
            state: LoopState::Idle,
            unexpected_streak: None,
        }
    }

    /// Wire the OpenRouter provider and HTTP webhook described by `config`.
    ///
    /// Fails when no API key is configured or the prompt override is unreadable.
    pub fn from_config(config: &GymshotConfig) -> Result<Self> {
        let api_key = config.require_api_key()?.to_string();
        let provider = OpenAiCompatProvider::new(api_key)
            .with_base_url(config.vision.api_url.clone(), "openrouter")
            .with_attribution(config.vision.referer.clone(), config.vision.title.clone())
            .with_timeout(Duration::from_secs(config.vision.request_timeout_secs));
        let webhook = HttpWebhook::new(
            config.webhook.url.clone(),
            Duration::from_secs(config.webhook.timeout_secs),
        );
        let prompt = load_prompt(config.vision.prompt_file.as_deref())?;
        let builder = RequestBuilder::new(config.vision.model.clone(), prompt);

        Ok(Self::new(
            Arc::new(provider),
            Arc::new(webhook),
            builder,
            PipelineSettings::from_config(config),
        ))
    }

    /// Replace the muscle-group table.
    pub fn with_table(mut self, table: MuscleGroupTable) -> Self {
        self.table = table;
        self
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    fn transition(&mut self, next: LoopState) {
        debug!(from = ?self.state, to = ?next, "state transition");
        self.state = next;
    }

    /// Process a single batch.
    pub async fn run_once(&mut self) -> IterationOutcome {
        self.transition(LoopState::Selecting);
        let batch = select_batch(&self.settings.pending_dir, self.settings.batch_size);
        if batch.is_empty() {
            info!(dir = %self.settings.pending_dir.display(), "no more images to process");
            self.transition(LoopState::Terminated);
            return IterationOutcome::Drained;
        }
        info!(batch = ?file_names(&batch), "processing images");

        self.transition(LoopState::Encoding);
        let encoded = self.builder.build(&batch).await;
        if encoded.is_empty() {
            self.transition(LoopState::ArchivingOnly);
            warn!("no readable images in batch, archiving them to keep the queue moving");
            let report = self.archiver.archive(&batch);
            return IterationOutcome::Unreadable {
                archived: report.moved.len(),
            };
        }

        self.transition(LoopState::Requesting);
        info!(
            provider = self.provider.name(),
            model = self.builder.model(),
            images = encoded.request.images.len(),
            "sending request to vision API"
        );
        let response = match self.provider.complete(&encoded.request).await {
            Ok(response) => response,
            Err(GymshotError::UnexpectedResponse { body }) => {
                return self.handle_unexpected(batch, &body);
            }
            Err(e) => {
                self.transition(LoopState::Backoff);
                error!(error = %e, "vision API request failed, batch left pending");
                return IterationOutcome::VisionFailed {
                    error: e.to_string(),
                };
            }
        };
        self.unexpected_streak = None;
        info!(
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "received model reply"
        );
        debug!(content = %response.content, "model reply");

        self.transition(LoopState::Translating);
        let translation = translate(&response.content, &self.table);
        for note in &translation.notes {
            info!("{note}");
        }
        for warning in &translation.warnings {
            warn!("{warning}");
        }
        for issue in &translation.contract_issues {
            warn!(issue = %issue, "record does not match the requested shape");
        }
        let raw = translation.payload.is_raw();
        if raw {
            warn!("model reply is not valid JSON, sending raw content");
        }
        debug!(
            extraction = translation.extraction,
            payload = %translation.payload.to_json(),
            "translated payload"
        );

        self.transition(LoopState::Dispatching);
        let webhook_ok = match self.webhook.deliver(&translation.payload).await {
            Ok(()) => true,
            Err(e) => {
                warn!(target_url = self.webhook.target(), error = %e, "webhook failed, archiving anyway");
                false
            }
        };

        self.transition(LoopState::Archiving);
        let report = self.archiver.archive(&batch);
        IterationOutcome::Delivered {
            raw,
            webhook_ok,
            archived: report.moved.len(),
        }
    }

    fn handle_unexpected(&mut self, batch: Vec<PathBuf>, body: &str) -> IterationOutcome {
        warn!(body = %body, "unexpected response format, batch left pending");

        let attempts = match self.unexpected_streak.as_mut() {
            Some((streak_batch, count)) if *streak_batch == batch => {
                *count += 1;
                *count
            }
            _ => {
                self.unexpected_streak = Some((batch.clone(), 1));
                1
            }
        };

        let limit = self.settings.max_unexpected_attempts;
        if limit > 0 && attempts >= limit {
            self.transition(LoopState::Quarantining);
            let report = self.quarantine.archive(&batch);
            warn!(
                attempts,
                dir = %self.quarantine.dir().display(),
                moved = report.moved.len(),
                "giving up on batch, moved to quarantine"
            );
            self.unexpected_streak = None;
            return IterationOutcome::UnexpectedResponse {
                attempts,
                quarantined: true,
            };
        }

        IterationOutcome::UnexpectedResponse {
            attempts,
            quarantined: false,
        }
    }

    /// Run until the pending directory is drained or `cancel` fires.
    ///
    /// Cancellation interrupts both the pauses and an in-flight iteration.
    /// An interrupted batch was not archived and stays pending.
    pub async fn run(&mut self, cancel: CancellationToken) -> RunSummary {
        let mut summary = RunSummary::default();

        loop {
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!(state = ?self.state, "shutdown requested, stopping");
                    summary.cancelled = true;
                    break;
                }
                outcome = self.run_once() => outcome,
            };
            summary.record(&outcome);

            if outcome == IterationOutcome::Drained {
                break;
            }

            if let Some(delay) = outcome.next_delay(&self.settings) {
                debug!(seconds = delay.as_secs_f64(), "waiting before next iteration");
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        info!("shutdown requested, stopping");
                        summary.cancelled = true;
                        break;
                    }
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        }

        self.transition(LoopState::Terminated);
        info!(?summary, "pipeline finished");
        summary
    }
}

fn file_names(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| {
            p.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| p.display().to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> PipelineSettings {
        PipelineSettings {
            pending_dir: "screens".into(),
            archive_dir: "old".into(),
            quarantine_dir: "failed".into(),
            batch_size: 2,
            poll_interval: Duration::from_secs(30),
            retry_backoff: Duration::from_secs(5),
            max_unexpected_attempts: 3,
        }
    }

    #[test]
    fn test_next_delay_per_outcome() {
        let s = settings();
        assert_eq!(IterationOutcome::Drained.next_delay(&s), None);
        assert_eq!(IterationOutcome::Unreadable { archived: 2 }.next_delay(&s), None);
        assert_eq!(
            IterationOutcome::VisionFailed { error: "x".into() }.next_delay(&s),
            Some(Duration::from_secs(35))
        );
        assert_eq!(
            IterationOutcome::Delivered {
                raw: false,
                webhook_ok: false,
                archived: 2
            }
            .next_delay(&s),
            Some(Duration::from_secs(30))
        );
    }

    #[test]
    fn test_unreadable_batch_that_could_not_be_moved_waits() {
        let s = settings();
        assert_eq!(
            IterationOutcome::Unreadable { archived: 0 }.next_delay(&s),
            Some(Duration::from_secs(30))
        );
        assert_eq!(IterationOutcome::Unreadable { archived: 1 }.next_delay(&s), None);
    }

    #[test]
    fn test_zero_delays_continue_immediately() {
        let mut s = settings();
        s.poll_interval = Duration::ZERO;
        s.retry_backoff = Duration::ZERO;
        assert_eq!(
            IterationOutcome::VisionFailed { error: "x".into() }.next_delay(&s),
            None
        );
    }

    #[test]
    fn test_summary_counts() {
        let mut summary = RunSummary::default();
        summary.record(&IterationOutcome::VisionFailed { error: "x".into() });
        summary.record(&IterationOutcome::Delivered {
            raw: true,
            webhook_ok: false,
            archived: 2,
        });
        summary.record(&IterationOutcome::Drained);
        assert_eq!(summary.batches, 2);
        assert_eq!(summary.vision_failures, 1);
        assert_eq!(summary.webhook_failures, 1);
        assert_eq!(summary.raw_fallbacks, 1);
        assert_eq!(summary.images_archived, 2);
        assert_eq!(summary.delivered, 0);
    }
}
