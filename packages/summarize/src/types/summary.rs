//! Summary schema and per-reference results.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::types::locator::Locator;

const NOT_SPECIFIED: &str = "Not specified";

/// Structured output requested from every backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StructuredSummary {
    /// Author of the content, if stated
    pub author: Option<String>,
    /// Publication date (YYYY-MM-DD), if stated
    pub publish_date: Option<String>,
    /// Kind of content, e.g. article, ticket, photo, source code
    pub content_type: String,
    /// ISO 639-1 language code of the content
    pub language: String,
    /// Short topical tags
    pub tags: Vec<String>,
    /// Narrative summary of the content
    pub summary: String,
}

impl StructuredSummary {
    /// Render as a fixed markdown layout. Every section is always present.
    pub fn render(&self) -> String {
        let author = non_blank(self.author.as_deref()).unwrap_or(NOT_SPECIFIED);
        let publish_date = non_blank(self.publish_date.as_deref()).unwrap_or(NOT_SPECIFIED);
        let content_type = non_blank(Some(&self.content_type)).unwrap_or(NOT_SPECIFIED);
        let language = non_blank(Some(&self.language)).unwrap_or(NOT_SPECIFIED);
        let tags = if self.tags.is_empty() {
            NOT_SPECIFIED.to_string()
        } else {
            self.tags.join(", ")
        };

        format!(
            "### Summary\n\n\
             **Author:** {author}\n\n\
             **Publish Date:** {publish_date}\n\n\
             **Content Type:** {content_type}\n\n\
             **Language:** {language}\n\n\
             **Tags:** {tags}\n\n\
             **Summary:** {}\n",
            self.summary.trim()
        )
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// User-facing failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCategory {
    Network,
    NotFound,
    Unauthorized,
    MalformedLocator,
    UnsupportedFormat,
    Provider,
    QuotaExceeded,
    MalformedResponse,
    Timeout,
    /// The task panicked
    Internal,
}

impl FailureCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network error",
            Self::NotFound => "not found",
            Self::Unauthorized => "unauthorized",
            Self::MalformedLocator => "malformed locator",
            Self::UnsupportedFormat => "unsupported format",
            Self::Provider => "provider error",
            Self::QuotaExceeded => "quota exceeded",
            Self::MalformedResponse => "malformed response",
            Self::Timeout => "timeout",
            Self::Internal => "internal error",
        }
    }
}

impl fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a reference could not be summarized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureReason {
    pub category: FailureCategory,
    pub message: String,
    /// Attempts made before giving up
    pub attempts: u32,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} after {} attempt{}: {}",
            self.category,
            self.attempts,
            if self.attempts == 1 { "" } else { "s" },
            self.message
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Summary(String),
    Failure(FailureReason),
}

/// Terminal result for one top-level reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryResult {
    pub locator: Locator,
    pub outcome: Outcome,
}

impl SummaryResult {
    pub fn new(locator: Locator, outcome: Outcome) -> Self {
        Self { locator, outcome }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Summary(_))
    }

    pub fn summary(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Summary(text) => Some(text),
            Outcome::Failure(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&FailureReason> {
        match &self.outcome {
            Outcome::Failure(reason) => Some(reason),
            Outcome::Summary(_) => None,
        }
    }
}
