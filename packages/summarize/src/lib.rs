//! Summarize web pages, tickets, wiki pages, files, images and directories.
//!
//! References are classified, routed to an acquisition strategy, and handed
//! to one shared summarization backend. Work runs under a scheduler ceiling
//! (how many tasks execute at once) and, separately, a backend permit pool
//! (how many model calls are in flight). Transient failures are retried
//! with uniform jitter; every reference yields exactly one result, in input
//! order.
//!
//! # Usage
//!
//! ```rust,ignore
//! use summarize::{build_backend, Acquirers, BackendConfig, Pipeline, PipelineConfig, Provider};
//!
//! let backend = build_backend(&BackendConfig::new(Provider::OpenAI))?;
//! let pipeline = Pipeline::new(backend, Acquirers::standard()?, PipelineConfig::default())?;
//!
//! let results = pipeline.run(["https://example.com", "notes.txt"]).await;
//! print!("{}", summarize::render_text(&results));
//! ```
//!
//! # Modules
//!
//! - [`classify`] - Reference classification
//! - [`acquirers`] - Web, wiki/ticket, file and image acquisition
//! - [`backends`] - OpenAI and Bedrock backends, permit pool
//! - [`pipeline`] - Retry wrapper, scheduler, directory expansion, driver
//! - [`output`] - Text and JSON rendering
//! - [`testing`] - Mock implementations for testing

pub mod acquirers;
pub mod backends;
pub mod classify;
pub mod error;
pub mod input;
pub mod output;
pub mod pipeline;
pub mod security;
pub mod testing;
pub mod traits;
pub mod types;

pub use error::{
    AcquisitionError, AcquisitionErrorKind, BackendError, ConfigurationError, Panicked, TaskError,
};
pub use traits::{
    acquirer::Acquirer,
    backend::{leading_chunk, SummaryBackend, DEFAULT_CHUNK_CHARS},
};
pub use types::{
    config::{ClassifierConfig, DirectoryConfig, PipelineConfig, RetryPolicy},
    content::{AcquiredContent, ImageContent, ImageFormat},
    locator::{Locator, LocatorKind, LocatorMetadata},
    summary::{FailureCategory, FailureReason, Outcome, StructuredSummary, SummaryResult},
};

pub use acquirers::Acquirers;
pub use backends::{
    build_backend, BackendConfig, BedrockBackend, BedrockBackendConfig, OpenAIBackend,
    OpenAIBackendConfig, PermitLimited, Provider, SummaryBackendExt,
};
pub use classify::{classify, Classifier};
pub use input::{parse_references, read_references};
pub use output::{exit_code, render, render_json, render_text, OutputFormat};
pub use pipeline::{retry, retry_if, Pipeline, RetryOutcome, Scheduler};
pub use security::SecretString;
