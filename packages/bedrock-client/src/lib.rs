//! Pure AWS Bedrock Runtime client.
//!
//! Talks to the Converse API using a Bedrock API key (bearer token), so no
//! SigV4 signing is needed. Structured output is obtained by forcing the
//! model to call a single tool whose input schema is generated from a Rust
//! type.
//!
//! # Example
//!
//! ```rust,ignore
//! use bedrock_client::{BedrockClient, ContentBlock};
//!
//! let client = BedrockClient::from_env()?;
//! let answer: MyType = client
//!     .extract::<MyType>(model_id, system_prompt, vec![ContentBlock::text(text)])
//!     .await?;
//! ```

pub mod error;
pub mod types;

pub use error::{BedrockError, Result};
pub use types::{ContentBlock, ConverseRequest, InferenceConfig, Message, SystemBlock, ToolConfig};

use schemars::{gen::SchemaSettings, JsonSchema};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

const DEFAULT_REGION: &str = "us-east-1";
const TOOL_NAME: &str = "record_output";

#[derive(Clone)]
pub struct BedrockClient {
    client: reqwest::Client,
    token: String,
    endpoint: String,
}

impl std::fmt::Debug for BedrockClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BedrockClient")
            .field("token", &"[REDACTED]")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl BedrockClient {
    pub fn new(token: impl Into<String>, region: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            token: token.into(),
            endpoint: format!("https://bedrock-runtime.{}.amazonaws.com", region),
        }
    }

    /// Create from `AWS_BEARER_TOKEN_BEDROCK` and `AWS_REGION` (default us-east-1).
    pub fn from_env() -> Result<Self> {
        let token = std::env::var("AWS_BEARER_TOKEN_BEDROCK")
            .map_err(|_| BedrockError::Config("AWS_BEARER_TOKEN_BEDROCK not set".into()))?;
        let region = std::env::var("AWS_REGION").unwrap_or_else(|_| DEFAULT_REGION.to_string());
        Ok(Self::new(token, &region))
    }

    /// Override the runtime endpoint (VPC endpoints, local stubs).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Force a structured answer shaped like `T`.
    pub async fn extract<T: JsonSchema + DeserializeOwned>(
        &self,
        model_id: &str,
        system_prompt: impl Into<String>,
        content: Vec<ContentBlock>,
    ) -> Result<T> {
        let request = ConverseRequest {
            system: vec![SystemBlock {
                text: system_prompt.into(),
            }],
            messages: vec![Message::user(content)],
            inference_config: InferenceConfig::default(),
            tool_config: Some(ToolConfig::forced(
                TOOL_NAME,
                "Record the structured result for the provided content.",
                tool_schema::<T>(),
            )),
        };

        let input = self.converse_tool_input(model_id, &request).await?;
        serde_json::from_value(input)
            .map_err(|e| BedrockError::Parse(format!("Failed to deserialize tool input: {}", e)))
    }

    async fn converse_tool_input(
        &self,
        model_id: &str,
        request: &ConverseRequest,
    ) -> Result<serde_json::Value> {
        let url = format!("{}/model/{}/converse", self.endpoint, model_id);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Bedrock request failed");
                BedrockError::Network(e)
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(status = %status, error = %body, "Bedrock API error");
            return Err(BedrockError::from_status(status.as_u16(), body));
        }

        let response: types::ConverseResponse = resp
            .json()
            .await
            .map_err(|e| BedrockError::Parse(e.to_string()))?;

        if let Some(usage) = &response.usage {
            debug!(
                model_id,
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                stop_reason = response.stop_reason.as_deref().unwrap_or("unknown"),
                "Bedrock converse"
            );
        }

        response
            .output
            .message
            .content
            .into_iter()
            .filter_map(|block| block.tool_use)
            .find(|tool| tool.name == TOOL_NAME)
            .map(|tool| tool.input)
            .ok_or_else(|| BedrockError::Parse("Response carried no tool call".into()))
    }
}

/// Fully inlined JSON schema for `T`, without the `$schema` marker.
fn tool_schema<T: JsonSchema>() -> serde_json::Value {
    let generator = SchemaSettings::draft07()
        .with(|s| s.inline_subschemas = true)
        .into_generator();
    let mut value = serde_json::to_value(generator.into_root_schema_for::<T>()).unwrap_or_default();
    if let serde_json::Value::Object(map) = &mut value {
        map.remove("$schema");
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize, JsonSchema)]
    #[allow(dead_code)]
    struct Inner {
        label: String,
    }

    #[derive(Deserialize, JsonSchema)]
    #[allow(dead_code)]
    struct Outer {
        inner: Inner,
        tags: Vec<String>,
    }

    #[test]
    fn test_tool_schema_is_inlined() {
        let schema = tool_schema::<Outer>();
        let rendered = serde_json::to_string(&schema).unwrap();

        assert!(!rendered.contains("$ref"));
        assert!(schema.get("$schema").is_none());
        assert_eq!(schema["properties"]["inner"]["type"], "object");
    }

    #[test]
    fn test_endpoint_from_region() {
        let client = BedrockClient::new("token", "eu-west-1");
        assert_eq!(
            client.endpoint(),
            "https://bedrock-runtime.eu-west-1.amazonaws.com"
        );

        let client = client.with_endpoint("http://localhost:4566/");
        assert_eq!(client.endpoint(), "http://localhost:4566");
    }

    #[test]
    fn test_debug_redacts_token() {
        let debug = format!("{:?}", BedrockClient::new("abc-secret", "us-east-1"));
        assert!(!debug.contains("abc-secret"));
    }
}
