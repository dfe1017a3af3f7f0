//! Error types for the Bedrock client.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BedrockError>;

#[derive(Debug, Error)]
pub enum BedrockError {
    /// Missing bearer token or region
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// `ThrottlingException` or HTTP 429
    #[error("Throttled: {0}")]
    Throttled(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Response did not carry the expected tool call or failed to deserialize
    #[error("Parse error: {0}")]
    Parse(String),
}

impl BedrockError {
    /// Classify a non-success HTTP response.
    pub fn from_status(status: u16, body: String) -> Self {
        if status == 429 || body.contains("ThrottlingException") {
            Self::Throttled(body)
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
            Self::Network(_) | Self::Throttled(_) => true,
            Self::Api { status, .. } => *status >= 500,
            Self::Config(_) | Self::Parse(_) => false,
        }
    }
}
