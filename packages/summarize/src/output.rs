//! Rendering results for stdout.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::ConfigurationError;
use crate::types::{
    locator::LocatorKind,
    summary::{FailureCategory, Outcome, SummaryResult},
};

/// Exit status when at least one reference failed.
pub const EXIT_PARTIAL_FAILURE: i32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(ConfigurationError::Invalid(format!(
                "unknown output format '{}' (expected text or json)",
                other
            ))),
        }
    }
}

/// Render results in input order.
pub fn render(results: &[SummaryResult], format: OutputFormat) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Text => Ok(render_text(results)),
        OutputFormat::Json => render_json(results),
    }
}

/// One block per result:
///
/// ```text
/// URI: <reference>
/// Summary:
/// <summary, or the failure line>
/// ```
pub fn render_text(results: &[SummaryResult]) -> String {
    let mut out = String::new();
    for result in results {
        let body = match &result.outcome {
            Outcome::Summary(summary) => summary.clone(),
            Outcome::Failure(reason) => format!(
                "Could not summarize ({}): {}",
                reason.category, reason.message
            ),
        };
        out.push_str(&format!("URI: {}\nSummary:\n{}\n\n", result.locator.raw(), body));
    }
    out
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    uri: &'a str,
    kind: LocatorKind,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<FailureCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    attempts: Option<u32>,
}

pub fn render_json(results: &[SummaryResult]) -> Result<String, serde_json::Error> {
    let records: Vec<JsonRecord<'_>> = results
        .iter()
        .map(|result| {
            let base = JsonRecord {
                uri: result.locator.raw(),
                kind: result.locator.kind(),
                status: "ok",
                summary: None,
                error: None,
                category: None,
                attempts: None,
            };
            match &result.outcome {
                Outcome::Summary(summary) => JsonRecord {
                    summary: Some(summary.as_str()),
                    ..base
                },
                Outcome::Failure(reason) => JsonRecord {
                    status: "failed",
                    error: Some(reason.message.as_str()),
                    category: Some(reason.category),
                    attempts: Some(reason.attempts),
                    ..base
                },
            }
        })
        .collect();
    let mut json = serde_json::to_string_pretty(&records)?;
    json.push('\n');
    Ok(json)
}

/// 0 when every reference was summarized, otherwise [`EXIT_PARTIAL_FAILURE`].
pub fn exit_code(results: &[SummaryResult]) -> i32 {
    if results.iter().all(SummaryResult::is_success) {
        0
    } else {
        EXIT_PARTIAL_FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use crate::types::summary::FailureReason;

    fn results() -> Vec<SummaryResult> {
        vec![
            SummaryResult::new(classify("https://example.com/a"), Outcome::Summary("About A".into())),
            SummaryResult::new(
                classify("missing.txt"),
                Outcome::Failure(FailureReason {
                    category: FailureCategory::NotFound,
                    message: "not found: cannot read missing.txt".into(),
                    attempts: 1,
                }),
            ),
        ]
    }

    #[test]
    fn test_text_blocks_in_order() {
        let text = render_text(&results());
        assert_eq!(
            text,
            "URI: https://example.com/a\nSummary:\nAbout A\n\n\
             URI: missing.txt\nSummary:\nCould not summarize (not found): not found: cannot read missing.txt\n\n"
        );
    }

    #[test]
    fn test_json_records() {
        let json = render_json(&results()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value[0]["uri"], "https://example.com/a");
        assert_eq!(value[0]["kind"], "web");
        assert_eq!(value[0]["status"], "ok");
        assert!(value[0].get("error").is_none());
        assert_eq!(value[1]["status"], "failed");
        assert_eq!(value[1]["category"], "not_found");
        assert_eq!(value[1]["kind"], "plain_file");
    }

    #[test]
    fn test_exit_code() {
        let all = results();
        assert_eq!(exit_code(&all), 2);
        assert_eq!(exit_code(&all[..1]), 0);
        assert_eq!(exit_code(&[]), 0);
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("yaml".parse::<OutputFormat>().is_err());
    }
}
