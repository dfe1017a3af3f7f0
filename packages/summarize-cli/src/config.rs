//! Command-line options and their mapping onto library configuration.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{ensure, Context, Result};
use clap::Parser;
use summarize::{
    BackendConfig, ClassifierConfig, DirectoryConfig, OutputFormat, PipelineConfig, Provider,
    RetryPolicy,
};

#[derive(Parser, Debug)]
#[command(name = "summarize")]
#[command(about = "Summarize URLs, tickets, wiki pages, files, images and directories")]
#[command(version)]
pub struct Cli {
    /// File with one reference per line (reads stdin when omitted)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Summarization provider: openai or bedrock
    #[arg(short, long, default_value = "openai")]
    pub provider: Provider,

    /// Maximum pipeline tasks executing at once
    #[arg(short, long, default_value_t = 10)]
    pub concurrency: usize,

    /// Model override (provider default when omitted)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Maximum in-flight calls into the backend
    #[arg(long, default_value_t = 5)]
    pub backend_permits: usize,

    /// Attempts per reference, including the first
    #[arg(long, default_value_t = 3)]
    pub max_attempts: u32,

    /// Lower bound of the retry delay, in seconds
    #[arg(long, default_value_t = 1.0)]
    pub min_delay: f64,

    /// Upper bound of the retry delay, in seconds
    #[arg(long, default_value_t = 10.0)]
    pub max_delay: f64,

    /// Per-attempt timeout in seconds (none when omitted)
    #[arg(long)]
    pub timeout: Option<f64>,

    /// Host pattern routed to the wiki/ticket strategy (repeatable; replaces the defaults)
    #[arg(long = "tracker-host", value_name = "HOST")]
    pub tracker_hosts: Vec<String>,

    /// Deepest directory level visited below each directory reference
    #[arg(long, default_value_t = 16)]
    pub max_depth: usize,

    /// Visit dot-files and dot-directories
    #[arg(long)]
    pub include_hidden: bool,

    /// Summarize the joined child summaries of a directory once more
    #[arg(long)]
    pub resummarize: bool,

    /// Output format: text or json
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Debug logging for the pipeline
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn pipeline_config(&self) -> Result<PipelineConfig> {
        let retry = RetryPolicy::new()
            .with_max_attempts(self.max_attempts)
            .with_delay_range(seconds("--min-delay", self.min_delay)?, seconds("--max-delay", self.max_delay)?);

        let mut classifier = ClassifierConfig::new();
        if !self.tracker_hosts.is_empty() {
            classifier = classifier.with_tracker_hosts(self.tracker_hosts.iter().cloned());
        }

        let mut config = PipelineConfig::new()
            .with_concurrency(self.concurrency)
            .with_retry(retry)
            .with_classifier(classifier)
            .with_directory(DirectoryConfig {
                max_depth: self.max_depth,
                include_hidden: self.include_hidden,
                resummarize: self.resummarize,
            });
        if let Some(timeout) = self.timeout {
            config = config.with_task_timeout(seconds("--timeout", timeout)?);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn backend_config(&self) -> Result<BackendConfig> {
        let mut config = BackendConfig::new(self.provider).with_permits(self.backend_permits);
        if let Some(model) = &self.model {
            config = config.with_model(model.clone());
        }
        config.validate()?;
        Ok(config)
    }

    /// Filter directive used when `RUST_LOG` is unset.
    pub fn default_log_filter(&self) -> &'static str {
        if self.verbose {
            "info,summarize=debug"
        } else {
            "info,summarize=info"
        }
    }
}

fn seconds(flag: &str, value: f64) -> Result<Duration> {
    ensure!(
        value.is_finite() && value >= 0.0,
        "{} must be a non-negative number of seconds, got {}",
        flag,
        value
    );
    Duration::try_from_secs_f64(value).with_context(|| format!("{} is out of range: {}", flag, value))
}
