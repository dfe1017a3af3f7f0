//! Summarization providers.
//!
//! The backend is chosen by [`Provider`], built once at startup by
//! [`build_backend`] and shared by every task.

pub mod bedrock;
pub mod openai;
pub mod permits;
pub mod prompt;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tracing::info;

use crate::error::ConfigurationError;
use crate::traits::backend::SummaryBackend;

pub use bedrock::{BedrockBackend, BedrockBackendConfig};
pub use openai::{OpenAIBackend, OpenAIBackendConfig};
pub use permits::{PermitLimited, SummaryBackendExt, DEFAULT_BACKEND_PERMITS};

/// Supported providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Provider {
    #[default]
    OpenAI,
    Bedrock,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAI => "openai",
            Self::Bedrock => "bedrock",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Self::OpenAI => openai::DEFAULT_OPENAI_MODEL,
            Self::Bedrock => bedrock::DEFAULT_BEDROCK_MODEL,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "bedrock" => Ok(Self::Bedrock),
            _ => Err(ConfigurationError::UnknownProvider(s.to_string())),
        }
    }
}

/// Backend selection and its permit pool size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub provider: Provider,
    /// Model override; the provider default when `None`.
    pub model: Option<String>,
    /// In-flight calls allowed into the backend. Default: 5.
    pub permits: usize,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            model: None,
            permits: DEFAULT_BACKEND_PERMITS,
        }
    }
}

impl BackendConfig {
    pub fn new(provider: Provider) -> Self {
        Self {
            provider,
            ..Self::default()
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_permits(mut self, permits: usize) -> Self {
        self.permits = permits;
        self
    }

    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.permits == 0 {
            return Err(ConfigurationError::Invalid(
                "backend permits must be a positive integer".into(),
            ));
        }
        Ok(())
    }
}

/// Build the process-wide backend from the environment.
///
/// Fails before any work is scheduled when the provider's credential is
/// missing.
pub fn build_backend(config: &BackendConfig) -> Result<Arc<dyn SummaryBackend>, ConfigurationError> {
    config.validate()?;
    let model = config.model().to_string();
    info!(provider = %config.provider, model = %model, permits = config.permits, "building backend");

    let backend: Arc<dyn SummaryBackend> = match config.provider {
        Provider::OpenAI => {
            let settings = OpenAIBackendConfig::from_env()?.with_model(model);
            Arc::new(OpenAIBackend::new(settings).with_permits(config.permits))
        }
        Provider::Bedrock => {
            let settings = BedrockBackendConfig::from_env()?.with_model(model);
            Arc::new(BedrockBackend::new(settings).with_permits(config.permits))
        }
    };
    Ok(backend)
}
