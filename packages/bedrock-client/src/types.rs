//! Converse API request and response types.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConverseRequest {
    pub system: Vec<SystemBlock>,
    pub messages: Vec<Message>,
    pub inference_config: InferenceConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_config: Option<ToolConfig>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SystemBlock {
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub role: String,
    pub content: Vec<ContentBlock>,
}

impl Message {
    pub fn user(content: Vec<ContentBlock>) -> Self {
        Self {
            role: "user".to_string(),
            content,
        }
    }
}

/// Request-side content block.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ContentBlock {
    Text(String),
    Image(ImageBlock),
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Image block. `format` is one of `png`, `jpeg`, `gif`, `webp`.
    pub fn image(format: impl Into<String>, bytes: &[u8]) -> Self {
        use base64::Engine;
        Self::Image(ImageBlock {
            format: format.into(),
            source: ImageSource {
                bytes: base64::engine::general_purpose::STANDARD.encode(bytes),
            },
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageBlock {
    pub format: String,
    pub source: ImageSource,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageSource {
    /// Base64-encoded image bytes
    pub bytes: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceConfig {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            max_tokens: 2048,
            temperature: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolConfig {
    pub tools: Vec<Tool>,
    pub tool_choice: ToolChoice,
}

impl ToolConfig {
    /// A single tool the model is forced to call.
    pub fn forced(name: &str, description: &str, schema: serde_json::Value) -> Self {
        Self {
            tools: vec![Tool {
                tool_spec: ToolSpec {
                    name: name.to_string(),
                    description: description.to_string(),
                    input_schema: InputSchema { json: schema },
                },
            }],
            tool_choice: ToolChoice {
                tool: NamedTool {
                    name: name.to_string(),
                },
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    pub tool_spec: ToolSpec,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub input_schema: InputSchema,
}

#[derive(Debug, Clone, Serialize)]
pub struct InputSchema {
    pub json: serde_json::Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolChoice {
    pub tool: NamedTool,
}

#[derive(Debug, Clone, Serialize)]
pub struct NamedTool {
    pub name: String,
}

// =============================================================================
// Responses
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ConverseResponse {
    pub output: ConverseOutput,
    pub stop_reason: Option<String>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ConverseOutput {
    pub message: OutputMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OutputMessage {
    #[serde(default)]
    pub content: Vec<OutputBlock>,
}

/// Response-side content block. Unknown block kinds are ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OutputBlock {
    pub text: Option<String>,
    pub tool_use: Option<ToolUse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ToolUse {
    pub name: String,
    pub input: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serialization() {
        let request = ConverseRequest {
            system: vec![SystemBlock {
                text: "Summarize.".into(),
            }],
            messages: vec![Message::user(vec![
                ContentBlock::text("hello"),
                ContentBlock::image("png", &[1, 2, 3]),
            ])],
            inference_config: InferenceConfig::default(),
            tool_config: Some(ToolConfig::forced("record", "desc", json!({"type": "object"}))),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["messages"][0]["content"][0], json!({"text": "hello"}));
        assert_eq!(value["messages"][0]["content"][1]["image"]["format"], "png");
        assert_eq!(
            value["messages"][0]["content"][1]["image"]["source"]["bytes"],
            "AQID"
        );
        assert_eq!(value["inferenceConfig"]["maxTokens"], 2048);
        assert_eq!(value["toolConfig"]["toolChoice"]["tool"]["name"], "record");
        assert_eq!(
            value["toolConfig"]["tools"][0]["toolSpec"]["inputSchema"]["json"]["type"],
            "object"
        );
    }

    #[test]
    fn test_response_with_tool_use() {
        let response: ConverseResponse = serde_json::from_value(json!({
            "output": {"message": {"role": "assistant", "content": [
                {"text": "Calling tool"},
                {"toolUse": {"toolUseId": "t1", "name": "record", "input": {"a": 1}}}
            ]}},
            "stopReason": "tool_use",
            "usage": {"inputTokens": 10, "outputTokens": 5, "totalTokens": 15}
        }))
        .unwrap();

        assert_eq!(response.stop_reason.as_deref(), Some("tool_use"));
        let tool = response.output.message.content[1].tool_use.as_ref().unwrap();
        assert_eq!(tool.name, "record");
        assert_eq!(tool.input["a"], 1);
    }
}
