//! AWS Bedrock summarization backend.

use async_trait::async_trait;
use bedrock_client::{BedrockClient, BedrockError, ContentBlock};
use tracing::{debug, error};

use super::prompt::{system_prompt_for_today, InputKind, IMAGE_INSTRUCTION};
use crate::error::{BackendError, ConfigurationError};
use crate::security::SecretString;
use crate::traits::backend::SummaryBackend;
use crate::types::content::ImageContent;
use crate::types::summary::StructuredSummary;

pub const DEFAULT_BEDROCK_MODEL: &str = "anthropic.claude-3-5-haiku-20241022-v1:0";
pub const DEFAULT_BEDROCK_REGION: &str = "us-east-1";
pub const BEDROCK_TOKEN_VAR: &str = "AWS_BEARER_TOKEN_BEDROCK";
pub const AWS_REGION_VAR: &str = "AWS_REGION";

/// Settings for [`BedrockBackend`].
#[derive(Debug, Clone)]
pub struct BedrockBackendConfig {
    pub token: SecretString,
    pub region: String,
    pub model: String,
    pub endpoint: Option<String>,
}

impl BedrockBackendConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: SecretString::new(token),
            region: DEFAULT_BEDROCK_REGION.to_string(),
            model: DEFAULT_BEDROCK_MODEL.to_string(),
            endpoint: None,
        }
    }

    /// Read `AWS_BEARER_TOKEN_BEDROCK` and `AWS_REGION`.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        let token = std::env::var(BEDROCK_TOKEN_VAR)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigurationError::MissingCredential(BEDROCK_TOKEN_VAR.into()))?;
        let config = Self::new(token);
        Ok(match std::env::var(AWS_REGION_VAR) {
            Ok(region) if !region.trim().is_empty() => config.with_region(region.trim()),
            _ => config,
        })
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }
}

/// Structured summaries from the Bedrock Converse API.
#[derive(Debug, Clone)]
pub struct BedrockBackend {
    client: BedrockClient,
    model: String,
}

impl BedrockBackend {
    pub fn new(config: BedrockBackendConfig) -> Self {
        let mut client = BedrockClient::new(config.token.expose(), &config.region);
        if let Some(endpoint) = config.endpoint {
            client = client.with_endpoint(endpoint);
        }
        Self {
            client,
            model: config.model,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn extract(
        &self,
        kind: InputKind,
        content: Vec<ContentBlock>,
    ) -> Result<String, BackendError> {
        let summary: StructuredSummary = self
            .client
            .extract(&self.model, system_prompt_for_today(kind), content)
            .await
            .map_err(|e| {
                error!(model = %self.model, input = kind.as_str(), error = %e, "Bedrock summarization failed");
                map_bedrock_error(e)
            })?;
        debug!(model = %self.model, input = kind.as_str(), "Bedrock summary received");
        Ok(summary.render())
    }
}

#[async_trait]
impl SummaryBackend for BedrockBackend {
    fn name(&self) -> &str {
        "bedrock"
    }

    async fn summarize_text(&self, text: &str) -> Result<String, BackendError> {
        self.extract(InputKind::Text, vec![ContentBlock::text(text)])
            .await
    }

    async fn summarize_image(&self, image: &ImageContent) -> Result<String, BackendError> {
        let content = vec![
            ContentBlock::image(image.format.name(), &image.bytes),
            ContentBlock::text(IMAGE_INSTRUCTION),
        ];
        self.extract(InputKind::Image, content).await
    }
}

pub(crate) fn map_bedrock_error(err: BedrockError) -> BackendError {
    match err {
        BedrockError::Throttled(message) => BackendError::QuotaExceeded(message),
        BedrockError::Parse(message) => BackendError::MalformedResponse(message),
        other => {
            let retryable = other.is_transient();
            BackendError::provider(other.to_string(), retryable)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mapping() {
        assert!(matches!(
            map_bedrock_error(BedrockError::Throttled("slow down".into())),
            BackendError::QuotaExceeded(_)
        ));
        let err = map_bedrock_error(BedrockError::Api {
            status: 400,
            message: "ValidationException".into(),
        });
        assert!(matches!(err, BackendError::Provider { retryable: false, .. }));
    }

    #[test]
    fn test_backend_endpoint_follows_region() {
        let backend = BedrockBackend::new(BedrockBackendConfig::new("tok").with_region("eu-west-1"));
        assert_eq!(
            backend.client.endpoint(),
            "https://bedrock-runtime.eu-west-1.amazonaws.com"
        );
        assert_eq!(backend.model(), DEFAULT_BEDROCK_MODEL);
        assert!(!format!("{:?}", backend).contains("tok\""));
    }
}
