//! System prompt shared by every provider.

use chrono::NaiveDate;
use serde_json::json;

/// Which kind of input the model is about to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Text,
    Image,
}

impl InputKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
        }
    }
}

/// Build the system prompt, anchoring the example date to `today`.
pub fn system_prompt(kind: InputKind, today: NaiveDate) -> String {
    let example = json!({
        "author": "John Doe",
        "publish_date": today.format("%Y-%m-%d").to_string(),
        "content_type": kind.as_str(),
        "language": "en",
        "tags": ["example", "demo"],
        "summary": "This content discusses the implementation of structured summaries in AI models."
    });
    let example = serde_json::to_string_pretty(&example).unwrap_or_default();

    format!(
        "You are a content summarizer. When given {kind} data, extract the relevant details \
         and produce a structured summary.\n\
         Use null for the author or publish date when the content does not state them.\n\
         The output must follow this JSON format:\n\n{example}",
        kind = kind.as_str(),
    )
}

/// Prompt for today's local date.
pub fn system_prompt_for_today(kind: InputKind) -> String {
    system_prompt(kind, chrono::Local::now().date_naive())
}

/// User-turn instruction accompanying an image.
pub const IMAGE_INSTRUCTION: &str = "Summarize this image.";
