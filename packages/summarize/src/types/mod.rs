//! Data types for the summarization pipeline.

pub mod config;
pub mod content;
pub mod locator;
pub mod summary;
