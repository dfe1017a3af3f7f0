//! Seams of the pipeline: content acquisition and summarization.
//!
//! Every acquisition strategy implements [`acquirer::Acquirer`]; every
//! provider implements [`backend::SummaryBackend`]. The pipeline only ever
//! talks to these traits, so tests swap in the mocks from
//! [`testing`](crate::testing).

pub mod acquirer;
pub mod backend;
