//! Configuration types for the pipeline.

use std::time::Duration;

use crate::error::ConfigurationError;

/// Retry policy: bounded attempts with uniform jitter between them.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first. Default: 3.
    pub max_attempts: u32,

    /// Lower bound of the inter-attempt delay. Default: 1s.
    pub min_delay: Duration,

    /// Upper bound of the inter-attempt delay. Default: 10s.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            min_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Policy with no delay between attempts.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            min_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_delay_range(mut self, min_delay: Duration, max_delay: Duration) -> Self {
        self.min_delay = min_delay;
        self.max_delay = max_delay;
        self
    }

    /// Draw a fresh delay uniformly from `[min_delay, max_delay]`.
    pub fn jitter(&self) -> Duration {
        use rand::Rng;

        if self.max_delay <= self.min_delay {
            return self.min_delay;
        }
        let secs = rand::thread_rng()
            .gen_range(self.min_delay.as_secs_f64()..=self.max_delay.as_secs_f64());
        Duration::from_secs_f64(secs)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.max_attempts == 0 {
            return Err(ConfigurationError::Invalid(
                "max_attempts must be at least 1".into(),
            ));
        }
        if self.min_delay > self.max_delay {
            return Err(ConfigurationError::Invalid(format!(
                "min_delay ({:?}) exceeds max_delay ({:?})",
                self.min_delay, self.max_delay
            )));
        }
        Ok(())
    }
}

/// Hosts whose URLs are routed to the wiki/ticket strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifierConfig {
    /// Host patterns, matched on whole dot-separated labels:
    /// `atlassian.net` matches `acme.atlassian.net`, `wiki` matches
    /// `wiki.example.com` but not `wikipedia.org`.
    pub tracker_hosts: Vec<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            tracker_hosts: vec![
                "atlassian.net".to_string(),
                "wiki".to_string(),
                "jira".to_string(),
                "confluence".to_string(),
            ],
        }
    }
}

impl ClassifierConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the host patterns.
    pub fn with_tracker_hosts(mut self, hosts: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tracker_hosts = hosts.into_iter().map(Into::into).collect();
        self
    }

    /// Add one host pattern.
    pub fn tracker_host(mut self, host: impl Into<String>) -> Self {
        self.tracker_hosts.push(host.into());
        self
    }
}

/// Directory walk limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryConfig {
    /// Deepest nesting level visited below the root. Default: 16.
    pub max_depth: usize,

    /// Visit dot-files and dot-directories. Default: false.
    pub include_hidden: bool,

    /// Feed the joined child summaries through the backend once more
    /// instead of returning them as-is. Default: false.
    pub resummarize: bool,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            max_depth: 16,
            include_hidden: false,
            resummarize: false,
        }
    }
}

/// Configuration for a pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Scheduler ceiling: pipeline tasks executing at once. Default: 10.
    pub concurrency: usize,

    pub retry: RetryPolicy,

    /// Per-attempt timeout. Expiry counts as a failed attempt. Default: none.
    pub task_timeout: Option<Duration>,

    pub classifier: ClassifierConfig,

    pub directory: DirectoryConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            concurrency: 10,
            retry: RetryPolicy::default(),
            task_timeout: None,
            classifier: ClassifierConfig::default(),
            directory: DirectoryConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_task_timeout(mut self, timeout: Duration) -> Self {
        self.task_timeout = Some(timeout);
        self
    }

    pub fn with_classifier(mut self, classifier: ClassifierConfig) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_directory(mut self, directory: DirectoryConfig) -> Self {
        self.directory = directory;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.concurrency == 0 {
            return Err(ConfigurationError::Invalid(
                "concurrency must be a positive integer".into(),
            ));
        }
        if self.task_timeout == Some(Duration::ZERO) {
            return Err(ConfigurationError::Invalid(
                "task timeout must be greater than zero".into(),
            ));
        }
        self.retry.validate()
    }
}
