//! Error types for OpenAI client.

use thiserror::Error;

/// Result type for OpenAI client operations.
pub type Result<T> = std::result::Result<T, OpenAIError>;

/// OpenAI client errors.
#[derive(Debug, Error)]
pub enum OpenAIError {
    /// Configuration error (missing API key, invalid settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network error (connection failed, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// HTTP 429 or an `insufficient_quota` error body
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// API error (any other non-2xx response)
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The model declined to produce the requested output
    #[error("Model refused: {0}")]
    Refusal(String),

    /// Parse error (invalid JSON, unexpected response format)
    #[error("Parse error: {0}")]
    Parse(String),
}

impl OpenAIError {
    /// Classify a non-success HTTP response.
    pub fn from_status(status: u16, body: String) -> Self {
        if status == 429 || body.contains("insufficient_quota") {
            Self::RateLimited(body)
        } else {
            Self::Api {
                status,
                message: body,
            }
        }
    }

    /// Whether retrying the same request could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) | Self::RateLimited(_) => true,
            Self::Api { status, .. } => *status >= 500,
            Self::Config(_) | Self::Refusal(_) | Self::Parse(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(matches!(
            OpenAIError::from_status(429, "slow down".into()),
            OpenAIError::RateLimited(_)
        ));
        assert!(matches!(
            OpenAIError::from_status(400, r#"{"error":{"code":"insufficient_quota"}}"#.into()),
            OpenAIError::RateLimited(_)
        ));
        assert!(matches!(
            OpenAIError::from_status(400, "bad request".into()),
            OpenAIError::Api { status: 400, .. }
        ));
    }

    #[test]
    fn test_transient() {
        assert!(OpenAIError::Network("reset".into()).is_transient());
        assert!(OpenAIError::from_status(503, String::new()).is_transient());
        assert!(!OpenAIError::from_status(401, String::new()).is_transient());
        assert!(!OpenAIError::Parse("eof".into()).is_transient());
    }
}
