//! The bounded-concurrency summarization pipeline.
//!
//! - [`retry`]: bounded attempts with jitter, terminal [`RetryOutcome`]
//! - [`scheduler`]: ceiling K on executing task bodies, FIFO admission
//! - [`directory`]: depth-first directory enumeration
//! - [`driver`]: classify, acquire, summarize, collect in input order

pub mod directory;
pub mod driver;
pub mod retry;
pub mod scheduler;

pub use driver::Pipeline;
pub use retry::{retry, retry_if, RetryOutcome};
pub use scheduler::{Scheduler, DEFAULT_CONCURRENCY};
