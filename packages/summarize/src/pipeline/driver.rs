//! Pipeline driver: classify, acquire, summarize, collect.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::directory::walk;
use super::retry::{retry_if, RetryOutcome};
use super::scheduler::Scheduler;
use crate::acquirers::Acquirers;
use crate::classify::Classifier;
use crate::error::{AcquisitionError, ConfigurationError, Panicked, TaskError};
use crate::traits::backend::SummaryBackend;
use crate::types::{
    config::PipelineConfig,
    content::AcquiredContent,
    locator::{Locator, LocatorKind},
    summary::{FailureCategory, FailureReason, Outcome, SummaryResult},
};

/// Summarizes references under one scheduler and one shared backend.
pub struct Pipeline {
    backend: Arc<dyn SummaryBackend>,
    acquirers: Acquirers,
    classifier: Classifier,
    scheduler: Scheduler,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(
        backend: Arc<dyn SummaryBackend>,
        acquirers: Acquirers,
        config: PipelineConfig,
    ) -> Result<Self, ConfigurationError> {
        config.validate()?;
        Ok(Self {
            backend,
            acquirers,
            classifier: Classifier::new(&config.classifier),
            scheduler: Scheduler::new(config.concurrency),
            config,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn classify(&self, raw: &str) -> Locator {
        self.classifier.classify(raw)
    }

    /// Classify and summarize every reference. One result per reference,
    /// in input order.
    pub async fn run<I, S>(&self, references: I) -> Vec<SummaryResult>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let locators = references
            .into_iter()
            .map(|raw| self.classify(raw.as_ref()))
            .collect();
        self.run_locators(locators).await
    }

    /// Summarize already-classified locators, results in input order.
    pub async fn run_locators(&self, locators: Vec<Locator>) -> Vec<SummaryResult> {
        info!(
            count = locators.len(),
            concurrency = self.scheduler.ceiling(),
            backend = self.backend.name(),
            "pipeline starting"
        );

        let outcomes = self
            .scheduler
            .gather(locators.iter().map(|locator| self.summarize_locator(locator)))
            .await;

        let results: Vec<SummaryResult> = locators
            .into_iter()
            .zip(outcomes)
            .map(|(locator, outcome)| {
                let outcome = outcome.unwrap_or_else(|panicked| {
                    Outcome::Failure(FailureReason {
                        category: FailureCategory::Internal,
                        message: panicked.message,
                        attempts: 1,
                    })
                });
                SummaryResult::new(locator, outcome)
            })
            .collect();

        let failed = results.iter().filter(|r| !r.is_success()).count();
        info!(
            total = results.len(),
            failed,
            peak_concurrency = self.scheduler.peak(),
            "pipeline finished"
        );
        results
    }

    /// Produce the terminal outcome for one locator. Never fails.
    pub async fn summarize_locator(&self, locator: &Locator) -> Outcome {
        debug!(uri = %locator, kind = %locator.kind(), "summarizing");
        match locator.kind() {
            LocatorKind::Directory => self.summarize_directory(locator).await,
            _ => self.summarize_leaf(locator).await,
        }
    }

    async fn summarize_leaf(&self, locator: &Locator) -> Outcome {
        let outcome = retry_if(
            &self.config.retry,
            |attempt| self.admitted(self.acquire_and_summarize(locator, attempt)),
            TaskError::is_transient,
        )
        .await;
        finish(locator, outcome)
    }

    async fn acquire_and_summarize(&self, locator: &Locator, attempt: u32) -> Result<String, TaskError> {
        let acquirer = self.acquirers.for_kind(locator.kind()).ok_or_else(|| {
            AcquisitionError::malformed(format!("{} has no acquisition strategy", locator))
        })?;
        debug!(uri = %locator, attempt, "acquiring");
        let content = acquirer.acquire(locator).await?;
        Ok(self.backend.summarize(&content).await?)
    }

    /// Expand a directory and fold its children's summaries.
    ///
    /// The directory holds a slot only while enumerating; each child is then
    /// admitted on its own.
    async fn summarize_directory(&self, locator: &Locator) -> Outcome {
        let children = match self.enumerate(locator).await {
            Ok(children) => children,
            Err(err) => {
                return finish::<String>(
                    locator,
                    RetryOutcome::Exhausted {
                        attempts: 1,
                        last_error: err,
                    },
                )
            }
        };
        info!(uri = %locator, children = children.len(), "directory expanded");

        let outcomes = self
            .scheduler
            .gather(children.iter().map(|child| self.summarize_leaf(child)))
            .await;

        let mut summaries = Vec::new();
        for (child, outcome) in children.iter().zip(outcomes) {
            match outcome {
                Ok(Outcome::Summary(summary)) => summaries.push(summary),
                Ok(Outcome::Failure(reason)) => {
                    warn!(uri = %locator, child = %child, reason = %reason, "child omitted")
                }
                Err(panicked) => {
                    warn!(uri = %locator, child = %child, error = %panicked, "child omitted")
                }
            }
        }
        let folded = summaries.join("\n");

        if !self.config.directory.resummarize || folded.is_empty() {
            return Outcome::Summary(folded);
        }

        let content = AcquiredContent::Text(folded);
        let outcome = retry_if(
            &self.config.retry,
            |_| self.admitted(async { self.backend.summarize(&content).await.map_err(TaskError::from) }),
            TaskError::is_transient,
        )
        .await;
        finish(locator, outcome)
    }

    async fn enumerate(&self, locator: &Locator) -> Result<Vec<Locator>, TaskError> {
        let root = locator
            .path()
            .ok_or_else(|| AcquisitionError::malformed(format!("{} is not a local path", locator)))?
            .to_path_buf();
        let config = self.config.directory.clone();

        let files = self
            .admitted(async move {
                match tokio::task::spawn_blocking(move || walk(&root, &config)).await {
                    Ok(walked) => walked.map_err(TaskError::from),
                    Err(e) => Err(TaskError::from(Panicked {
                        message: format!("directory walk aborted: {}", e),
                    })),
                }
            })
            .await?;

        Ok(files
            .into_iter()
            .map(|path| self.classifier.classify_path(&path))
            .filter(|child| {
                // A file that became a directory since enumeration.
                let leaf = child.kind() != LocatorKind::Directory;
                if !leaf {
                    warn!(child = %child, "entry changed into a directory, skipping");
                }
                leaf
            })
            .collect())
    }

    /// Run one attempt under a scheduler slot and the optional timeout.
    async fn admitted<T, F>(&self, body: F) -> Result<T, TaskError>
    where
        F: Future<Output = Result<T, TaskError>>,
    {
        self.scheduler
            .admit(with_timeout(self.config.task_timeout, body))
            .await
    }
}

async fn with_timeout<T, F>(limit: Option<Duration>, body: F) -> Result<T, TaskError>
where
    F: Future<Output = Result<T, TaskError>>,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, body)
            .await
            .unwrap_or(Err(TaskError::Timeout(limit))),
        None => body.await,
    }
}

fn finish<T: Into<String>>(locator: &Locator, outcome: RetryOutcome<T, TaskError>) -> Outcome {
    match outcome {
        RetryOutcome::Ok(summary) => {
            info!(uri = %locator, "summarized");
            Outcome::Summary(summary.into())
        }
        RetryOutcome::Exhausted {
            attempts,
            last_error,
        } => {
            warn!(uri = %locator, attempts, error = %last_error, "could not summarize");
            Outcome::Failure(FailureReason {
                category: last_error.category(),
                message: last_error.to_string(),
                attempts,
            })
        }
    }
}
