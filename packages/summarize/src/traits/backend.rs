//! Summarization backend trait.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::BackendError;
use crate::types::content::{AcquiredContent, ImageContent};

/// Characters of text sent to a model.
pub const DEFAULT_CHUNK_CHARS: usize = 8192;

/// A provider that produces a rendered structured summary.
///
/// One instance is built per process and shared by every task, usually
/// behind [`PermitLimited`](crate::backends::permits::PermitLimited).
#[async_trait]
pub trait SummaryBackend: Send + Sync {
    /// Short provider name for logs.
    fn name(&self) -> &str;

    /// Split text into model-sized pieces.
    ///
    /// The default keeps only the leading [`DEFAULT_CHUNK_CHARS`] characters;
    /// the rest of the text is dropped.
    fn chunk(&self, text: &str) -> Vec<String> {
        leading_chunk(text, DEFAULT_CHUNK_CHARS)
    }

    async fn summarize_text(&self, text: &str) -> Result<String, BackendError>;

    async fn summarize_image(&self, image: &ImageContent) -> Result<String, BackendError>;

    /// Summarize whatever an acquirer produced. Text goes through
    /// [`chunk`](Self::chunk) and only the first piece is summarized.
    async fn summarize(&self, content: &AcquiredContent) -> Result<String, BackendError> {
        match content {
            AcquiredContent::Text(text) => {
                let first = self.chunk(text).into_iter().next().unwrap_or_default();
                self.summarize_text(&first).await
            }
            AcquiredContent::Image(image) => self.summarize_image(image).await,
        }
    }
}

#[async_trait]
impl<B: SummaryBackend + ?Sized> SummaryBackend for Arc<B> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn chunk(&self, text: &str) -> Vec<String> {
        (**self).chunk(text)
    }

    async fn summarize_text(&self, text: &str) -> Result<String, BackendError> {
        (**self).summarize_text(text).await
    }

    async fn summarize_image(&self, image: &ImageContent) -> Result<String, BackendError> {
        (**self).summarize_image(image).await
    }
}

/// First `max_chars` characters of `text`, as a single chunk.
pub fn leading_chunk(text: &str, max_chars: usize) -> Vec<String> {
    let end = text
        .char_indices()
        .nth(max_chars)
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    vec![text[..end].to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_chunk_truncates_on_char_boundary() {
        let text = "é".repeat(10);
        let chunks = leading_chunk(&text, 4);
        assert_eq!(chunks, vec!["éééé".to_string()]);
    }

    #[test]
    fn test_leading_chunk_keeps_short_text() {
        assert_eq!(leading_chunk("short", DEFAULT_CHUNK_CHARS), vec!["short".to_string()]);
        assert_eq!(leading_chunk("", DEFAULT_CHUNK_CHARS), vec![String::new()]);
    }

    #[test]
    fn test_default_chunk_is_8192_chars() {
        let text = "a".repeat(10_000);
        assert_eq!(leading_chunk(&text, DEFAULT_CHUNK_CHARS)[0].len(), 8192);
    }
}
