//! Typed errors for the summarization pipeline.
//!
//! Per-reference failures (`AcquisitionError`, `BackendError`, `TaskError`)
//! are contained by the retry wrapper and end up as a failed
//! [`SummaryResult`](crate::types::summary::SummaryResult). Only
//! `ConfigurationError` is fatal to a run.

use std::any::Any;
use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::types::summary::FailureCategory;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// What went wrong while turning a locator into content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionErrorKind {
    /// Connection failure, timeout, or a 5xx/429 status
    Network,
    /// Missing file, 404, unreadable path
    NotFound,
    /// Missing credentials or a 401/403 status
    Unauthorized,
    /// Reference cannot be resolved to anything fetchable
    MalformedLocator,
    /// Bytes are not an image format we accept
    UnsupportedFormat,
}

impl AcquisitionErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::NotFound => "not found",
            Self::Unauthorized => "unauthorized",
            Self::MalformedLocator => "malformed locator",
            Self::UnsupportedFormat => "unsupported format",
        }
    }
}

impl fmt::Display for AcquisitionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure raised by an acquisition strategy.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AcquisitionError {
    pub kind: AcquisitionErrorKind,
    pub message: String,
    #[source]
    pub cause: Option<BoxError>,
}

impl AcquisitionError {
    pub fn new(kind: AcquisitionErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            cause: None,
        }
    }

    /// Attach the underlying error.
    pub fn with_cause(mut self, cause: impl Into<BoxError>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(AcquisitionErrorKind::Network, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(AcquisitionErrorKind::NotFound, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(AcquisitionErrorKind::Unauthorized, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(AcquisitionErrorKind::MalformedLocator, message)
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::new(AcquisitionErrorKind::UnsupportedFormat, message)
    }

    /// Map an I/O error on a local path.
    pub fn from_io(path: &str, err: std::io::Error) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::PermissionDenied => AcquisitionErrorKind::Unauthorized,
            _ => AcquisitionErrorKind::NotFound,
        };
        Self::new(kind, format!("cannot read {}", path)).with_cause(err)
    }

    /// Only network failures are worth another attempt.
    pub fn is_transient(&self) -> bool {
        self.kind == AcquisitionErrorKind::Network
    }
}

/// Failure raised by a summarization backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Provider rejected or failed the call
    #[error("provider error: {message}")]
    Provider { message: String, retryable: bool },

    /// Rate limit or exhausted quota
    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Response could not be parsed into the summary schema
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl BackendError {
    pub fn provider(message: impl Into<String>, retryable: bool) -> Self {
        Self::Provider {
            message: message.into(),
            retryable,
        }
    }

    pub fn is_transient(&self) -> bool {
        match self {
            Self::Provider { retryable, .. } => *retryable,
            Self::QuotaExceeded(_) => true,
            Self::MalformedResponse(_) => false,
        }
    }
}

/// Fatal misconfiguration, detected before any work is scheduled.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("unknown provider '{0}' (expected one of: openai, bedrock)")]
    UnknownProvider(String),

    #[error("missing credential: {0}")]
    MissingCredential(String),

    #[error("invalid setting: {0}")]
    Invalid(String),
}

/// A task body panicked. The panic is caught at the task boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("task panicked: {message}")]
pub struct Panicked {
    pub message: String,
}

impl Panicked {
    pub(crate) fn from_payload(payload: Box<dyn Any + Send>) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        Self { message }
    }
}

/// Failure of one attempt at "acquire then summarize".
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("acquisition failed: {0}")]
    Acquisition(#[from] AcquisitionError),

    #[error("summarization failed: {0}")]
    Backend(#[from] BackendError),

    #[error("attempt timed out after {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Panicked(#[from] Panicked),
}

impl TaskError {
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Acquisition(e) => e.is_transient(),
            Self::Backend(e) => e.is_transient(),
            Self::Timeout(_) => true,
            Self::Panicked(_) => false,
        }
    }

    /// User-facing failure category.
    pub fn category(&self) -> FailureCategory {
        match self {
            Self::Acquisition(e) => match e.kind {
                AcquisitionErrorKind::Network => FailureCategory::Network,
                AcquisitionErrorKind::NotFound => FailureCategory::NotFound,
                AcquisitionErrorKind::Unauthorized => FailureCategory::Unauthorized,
                AcquisitionErrorKind::MalformedLocator => FailureCategory::MalformedLocator,
                AcquisitionErrorKind::UnsupportedFormat => FailureCategory::UnsupportedFormat,
            },
            Self::Backend(BackendError::Provider { .. }) => FailureCategory::Provider,
            Self::Backend(BackendError::QuotaExceeded(_)) => FailureCategory::QuotaExceeded,
            Self::Backend(BackendError::MalformedResponse(_)) => FailureCategory::MalformedResponse,
            Self::Timeout(_) => FailureCategory::Timeout,
            Self::Panicked(_) => FailureCategory::Internal,
        }
    }
}
