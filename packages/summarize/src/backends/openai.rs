//! OpenAI summarization backend.

use async_trait::async_trait;
use openai_client::{ContentPart, Message, OpenAIClient, OpenAIError};
use tracing::{debug, error};

use super::prompt::{system_prompt_for_today, InputKind, IMAGE_INSTRUCTION};
use crate::error::{BackendError, ConfigurationError};
use crate::security::SecretString;
use crate::traits::backend::SummaryBackend;
use crate::types::content::ImageContent;
use crate::types::summary::StructuredSummary;

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const OPENAI_BASE_URL_VAR: &str = "OPENAI_BASE_URL";

/// Settings for [`OpenAIBackend`].
#[derive(Debug, Clone)]
pub struct OpenAIBackendConfig {
    pub api_key: SecretString,
    pub model: String,
    pub base_url: Option<String>,
}

impl OpenAIBackendConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key),
            model: DEFAULT_OPENAI_MODEL.to_string(),
            base_url: None,
        }
    }

    /// Read `OPENAI_API_KEY` and the optional `OPENAI_BASE_URL`.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        let api_key = std::env::var(OPENAI_API_KEY_VAR)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigurationError::MissingCredential(OPENAI_API_KEY_VAR.into()))?;
        let base_url = std::env::var(OPENAI_BASE_URL_VAR)
            .ok()
            .filter(|v| !v.trim().is_empty());
        Ok(Self {
            base_url,
            ..Self::new(api_key)
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}

/// Structured summaries from the chat completions API.
#[derive(Debug, Clone)]
pub struct OpenAIBackend {
    client: OpenAIClient,
    model: String,
}

impl OpenAIBackend {
    pub fn new(config: OpenAIBackendConfig) -> Self {
        let mut client = OpenAIClient::new(config.api_key.expose());
        if let Some(base_url) = config.base_url {
            client = client.with_base_url(base_url);
        }
        Self {
            client,
            model: config.model,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn extract(&self, kind: InputKind, user: Message) -> Result<String, BackendError> {
        let summary: StructuredSummary = self
            .client
            .extract(&self.model, system_prompt_for_today(kind), user)
            .await
            .map_err(|e| {
                error!(model = %self.model, input = kind.as_str(), error = %e, "OpenAI summarization failed");
                map_openai_error(e)
            })?;
        debug!(model = %self.model, input = kind.as_str(), "OpenAI summary received");
        Ok(summary.render())
    }
}

#[async_trait]
impl SummaryBackend for OpenAIBackend {
    fn name(&self) -> &str {
        "openai"
    }

    async fn summarize_text(&self, text: &str) -> Result<String, BackendError> {
        self.extract(InputKind::Text, Message::user(text)).await
    }

    async fn summarize_image(&self, image: &ImageContent) -> Result<String, BackendError> {
        let user = Message::user_parts(vec![
            ContentPart::text(IMAGE_INSTRUCTION),
            ContentPart::image_base64(image.format.mime_type(), &image.to_base64()),
        ]);
        self.extract(InputKind::Image, user).await
    }
}

pub(crate) fn map_openai_error(err: OpenAIError) -> BackendError {
    match err {
        OpenAIError::RateLimited(message) => BackendError::QuotaExceeded(message),
        OpenAIError::Parse(message) => BackendError::MalformedResponse(message),
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
            map_openai_error(OpenAIError::RateLimited("429".into())),
            BackendError::QuotaExceeded(_)
        ));
        assert!(matches!(
            map_openai_error(OpenAIError::Parse("bad json".into())),
            BackendError::MalformedResponse(_)
        ));

        let err = map_openai_error(OpenAIError::Api {
            status: 503,
            message: "unavailable".into(),
        });
        assert!(err.is_transient());

        let err = map_openai_error(OpenAIError::Refusal("no".into()));
        assert!(!err.is_transient());
    }

    #[test]
    fn test_config_debug_redacts_key() {
        let config = OpenAIBackendConfig::new("sk-live-123").with_model("gpt-4o");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("sk-live-123"));
        assert!(debug.contains("gpt-4o"));
    }

    #[test]
    fn test_backend_uses_configured_base_url() {
        let backend = OpenAIBackend::new(
            OpenAIBackendConfig::new("sk-test").with_base_url("http://localhost:8080/v1/"),
        );
        assert_eq!(backend.client.base_url(), "http://localhost:8080/v1");
        assert_eq!(backend.model(), DEFAULT_OPENAI_MODEL);
    }
}
