//! LLM collaborator trait — the abstraction over model backends.
//!
//! A provider takes the ordered message history plus the optional tool
//! schema and performs exactly one call, returning one [`ChatResponse`] or
//! a typed [`ProviderError`]. The runtime never shapes provider JSON
//! itself; wire formats live in provider implementations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::message::{ChatResponse, Message};

/// One call's worth of input for a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The conversation messages, in order
    pub messages: Vec<Message>,

    /// OpenAI-style function array as a JSON string (see `ToolRegistry::schema`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<String>,

    /// Transport deadline; enforced by the provider, not the agent loop
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl ChatRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            tools: None,
            timeout_ms: None,
        }
    }

    pub fn with_tools(mut self, tools: Option<String>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: Option<u64>) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

/// A tool definition in structured form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON Schema describing the tool's parameters
    pub parameters: serde_json::Value,
}

impl ToolDefinition {
    /// `{"type":"function","function":{...}}` wrapper used by OpenAI-style APIs.
    pub fn to_function_json(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.parameters,
            }
        })
    }
}

/// The LLM collaborator.
///
/// Every backend implements this trait. The agent loop calls `chat()`
/// without knowing which provider is behind it.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// A human-readable name for this provider (e.g., "openai", "scripted").
    fn name(&self) -> &str;

    /// Perform one call.
    async fn chat(&self, request: ChatRequest) -> std::result::Result<ChatResponse, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_json_shape() {
        let def = ToolDefinition {
            name: "echo".into(),
            description: "Echoes back the input".into(),
            parameters: serde_json::json!({"type": "object"}),
        };
        let json = def.to_function_json();
        assert_eq!(json["type"], "function");
        assert_eq!(json["function"]["name"], "echo");
        assert_eq!(json["function"]["parameters"]["type"], "object");
    }

    #[test]
    fn request_omits_empty_optionals() {
        let req = ChatRequest::new(vec![Message::user("hi")]);
        let json = serde_json::to_string(&req).unwrap();
        assert!(!json.contains("tools"));
        assert!(!json.contains("timeout_ms"));

        let req = req.with_tools(Some("[]".into())).with_timeout_ms(Some(500));
        assert_eq!(req.timeout_ms, Some(500));
        assert_eq!(req.tools.as_deref(), Some("[]"));
    }
}
