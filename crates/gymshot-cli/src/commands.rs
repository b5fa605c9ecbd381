use anyhow::{Context, anyhow};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use std::io::Read;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use gymshot_config::loader::CONFIG_FILE_NAME;
use gymshot_config::{ConfigLoader, GymshotConfig, LoggingConfig};
use gymshot_pipeline::{IterationOutcome, MuscleGroupTable, Pipeline, RunSummary, translate};

const INIT_HEADER: &str = "# gymshot configuration\n\
# vision.api_key falls back to the OPENROUTER_API_KEY environment variable.\n\n";

/// gymshot: exercise screenshots in, structured exercise records out
#[derive(Parser)]
#[command(name = "gymshot", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to gymshot.toml config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level override (e.g. debug, info, warn, error)
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all log output (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process the pending directory until it is empty (Ctrl-C to stop)
    Run {
        /// Directory holding screenshots to process
        #[arg(long)]
        pending_dir: Option<PathBuf>,
        /// Directory processed screenshots are moved to
        #[arg(long)]
        archive_dir: Option<PathBuf>,
    },
    /// Process a single batch and exit
    Once,
    /// Translate saved model output into a webhook payload (no network)
    Translate {
        /// File holding the model reply, or `-` for stdin
        input: String,
    },
    /// Show the effective configuration (API key masked)
    Config {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write a default gymshot.toml in the current directory
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Generate shell completions for bash, zsh, or fish
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        // Neither needs (or should be blocked by) an existing config.
        if let Commands::Init { force } = self.command {
            return Self::cmd_init(force);
        }
        if let Commands::Completions { shell } = self.command {
            return Self::cmd_completions(shell);
        }

        let loader = ConfigLoader::load(self.config.as_deref())
            .context("failed to load configuration")?;
        let config_path = loader.path().to_path_buf();
        let config = loader.into_config();

        // --verbose > --quiet > --log-level > config
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            self.log_level.as_deref().unwrap_or(&config.logging.level)
        };
        init_tracing(&config.logging, log_level);
        info!(path = %config_path.display(), "configuration loaded");

        match self.command {
            Commands::Run {
                pending_dir,
                archive_dir,
            } => Self::cmd_run(config, pending_dir, archive_dir).await,
            Commands::Once => Self::cmd_once(config).await,
            Commands::Translate { input } => Self::cmd_translate(&input),
            Commands::Config { json } => Self::cmd_config(&config, json),
            Commands::Init { .. } | Commands::Completions { .. } => Ok(()),
        }
    }

    async fn cmd_run(
        mut config: GymshotConfig,
        pending_dir: Option<PathBuf>,
        archive_dir: Option<PathBuf>,
    ) -> anyhow::Result<()> {
        if let Some(dir) = pending_dir {
            config.paths.pending_dir = dir;
        }
        if let Some(dir) = archive_dir {
            config.paths.archive_dir = dir;
        }
        config.validate().map_err(|e| anyhow!(e))?;

        let mut pipeline = Pipeline::from_config(&config)?;
        info!(
            model = %config.vision.model,
            pending = %config.paths.pending_dir.display(),
            archive = %config.paths.archive_dir.display(),
            webhook = %config.webhook.url,
            "starting pipeline"
        );

        let cancel = CancellationToken::new();
        let signal_token = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("received Ctrl-C, shutting down");
                signal_token.cancel();
            }
        });

        let summary = pipeline.run(cancel).await;
        println!("{}", describe_summary(&summary));
        Ok(())
    }

    async fn cmd_once(config: GymshotConfig) -> anyhow::Result<()> {
        let mut pipeline = Pipeline::from_config(&config)?;
        let outcome = pipeline.run_once().await;
        println!("{}", describe_outcome(&outcome));
        Ok(())
    }

    fn cmd_translate(input: &str) -> anyhow::Result<()> {
        let text = if input == "-" {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        } else {
            std::fs::read_to_string(input).with_context(|| format!("failed to read {input}"))?
        };

        let translation = translate(&text, MuscleGroupTable::builtin());
        info!(extraction = translation.extraction, "translated model output");
        for note in &translation.notes {
            info!("{note}");
        }
        for warning in &translation.warnings {
            warn!("{warning}");
        }
        for issue in &translation.contract_issues {
            warn!(issue = %issue, "record does not match the requested shape");
        }

        println!("{}", serde_json::to_string_pretty(&translation.payload)?);
        Ok(())
    }

    fn cmd_config(config: &GymshotConfig, json: bool) -> anyhow::Result<()> {
        let redacted = config.redacted();
        if json {
            println!("{}", serde_json::to_string_pretty(&redacted)?);
        } else {
            println!("{}", toml::to_string_pretty(&redacted)?);
        }
        Ok(())
    }

    fn cmd_init(force: bool) -> anyhow::Result<()> {
        let path = std::env::current_dir()?.join(CONFIG_FILE_NAME);
        if path.exists() && !force {
            println!("{} already exists (use --force to overwrite)", path.display());
            return Ok(());
        }

        std::fs::write(&path, default_config_toml()?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Created {}", path.display());
        println!("Set OPENROUTER_API_KEY (or vision.api_key), then run: gymshot run");
        Ok(())
    }

    fn cmd_completions(shell: Shell) -> anyhow::Result<()> {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "gymshot", &mut std::io::stdout());
        Ok(())
    }
}

/// Install the global subscriber. `RUST_LOG` wins over `level`.
/// Logs go to stderr so command output on stdout stays machine-readable.
fn init_tracing(logging: &LoggingConfig, level: &str) {
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match logging.format.as_str() {
        "json" => tracing_subscriber::fmt()
            .with_env_filter(filter())
            .with_writer(std::io::stderr)
            .json()
            .with_target(true)
            .init(),
        "compact" => tracing_subscriber::fmt()
            .with_env_filter(filter())
            .with_writer(std::io::stderr)
            .compact()
            .with_target(false)
            .init(),
        _ => tracing_subscriber::fmt()
            .with_env_filter(filter())
            .with_writer(std::io::stderr)
            .with_target(false)
            .init(),
    }
}

/// Contents written by `gymshot init`.
fn default_config_toml() -> anyhow::Result<String> {
    let body = toml::to_string_pretty(&GymshotConfig::default())?;
    Ok(format!("{INIT_HEADER}{body}"))
}

fn describe_outcome(outcome: &IterationOutcome) -> String {
    match outcome {
        IterationOutcome::Drained => "No images to process.".into(),
        IterationOutcome::Unreadable { archived } => {
            format!("No image in the batch was readable; archived {archived} file(s).")
        }
        IterationOutcome::VisionFailed { error } => {
            format!("Vision API call failed, batch left pending: {error}")
        }
        IterationOutcome::UnexpectedResponse {
            attempts,
            quarantined: true,
        } => format!("Unexpected API response (attempt {attempts}); batch quarantined."),
        IterationOutcome::UnexpectedResponse { attempts, .. } => {
            format!("Unexpected API response (attempt {attempts}); batch left pending.")
        }
        IterationOutcome::Delivered {
            raw,
            webhook_ok,
            archived,
        } => {
            let kind = if *raw { "raw reply" } else { "record" };
            let status = if *webhook_ok { "delivered" } else { "webhook failed" };
            format!("Sent {kind} ({status}); archived {archived} file(s).")
        }
    }
}

fn describe_summary(summary: &RunSummary) -> String {
    let mut out = format!(
        "Processed {} batch(es): {} delivered, {} webhook failure(s), {} vision failure(s), \
         {} unexpected response(s), {} quarantined; {} image(s) archived.",
        summary.batches,
        summary.delivered,
        summary.webhook_failures,
        summary.vision_failures,
        summary.unexpected_responses,
        summary.quarantined,
        summary.images_archived,
    );
    if summary.cancelled {
        out.push_str(" Stopped early.");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_with_overrides() {
        let cli = Cli::try_parse_from([
            "gymshot",
            "--config",
            "custom.toml",
            "run",
            "--pending-dir",
            "in",
            "--archive-dir",
            "done",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        match cli.command {
            Commands::Run {
                pending_dir,
                archive_dir,
            } => {
                assert_eq!(pending_dir, Some(PathBuf::from("in")));
                assert_eq!(archive_dir, Some(PathBuf::from("done")));
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["gymshot", "translate", "-", "-v"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Translate { ref input } if input == "-"));
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["gymshot", "-v", "-q", "once"]).is_err());
    }

    #[test]
    fn test_default_config_round_trips() {
        let text = default_config_toml().unwrap();
        assert!(text.starts_with("# gymshot configuration"));
        assert!(!text.lines().any(|line| line.starts_with("api_key")));

        let parsed: GymshotConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.paths.pending_dir, PathBuf::from("screens"));
        assert_eq!(parsed.schedule.batch_size, 2);
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn test_describe_outcomes() {
        assert_eq!(describe_outcome(&IterationOutcome::Drained), "No images to process.");
        assert_eq!(
            describe_outcome(&IterationOutcome::Delivered {
                raw: true,
                webhook_ok: false,
                archived: 2
            }),
            "Sent raw reply (webhook failed); archived 2 file(s)."
        );
        assert!(
            describe_outcome(&IterationOutcome::UnexpectedResponse {
                attempts: 3,
                quarantined: true
            })
            .contains("quarantined")
        );
    }

    #[test]
    fn test_describe_summary_marks_cancellation() {
        let summary = RunSummary {
            batches: 1,
            delivered: 1,
            images_archived: 2,
            cancelled: true,
            ..Default::default()
        };
        let text = describe_summary(&summary);
        assert!(text.starts_with("Processed 1 batch(es): 1 delivered"));
        assert!(text.ends_with("Stopped early."));
    }
}
