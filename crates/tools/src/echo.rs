//! Echo tool — returns its arguments wrapped as `{"echo": ...}`.

use async_trait::async_trait;
use ferroact_core::error::ToolError;
use ferroact_core::tool::{Tool, ToolContext, parse_arguments};

pub struct EchoTool;

#[async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &str {
        "echo"
    }

    fn description(&self) -> &str {
        "Echo the given arguments back unchanged."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "text": {
                    "type": "string",
                    "description": "Text to echo back"
                }
            }
        })
    }

    async fn execute(&self, _ctx: &ToolContext, arguments: &str) -> Result<String, ToolError> {
        let args = parse_arguments(arguments)?;
        Ok(serde_json::json!({ "echo": args }).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn echoes_arguments() {
        let out = EchoTool
            .execute(&ToolContext::default(), r#"{"text":"hi"}"#)
            .await
            .unwrap();
        assert_eq!(out, r#"{"echo":{"text":"hi"}}"#);
    }

    #[tokio::test]
    async fn empty_arguments_echo_empty_object() {
        let out = EchoTool.execute(&ToolContext::default(), "").await.unwrap();
        assert_eq!(out, r#"{"echo":{}}"#);
    }

    #[tokio::test]
    async fn malformed_arguments_rejected() {
        let err = EchoTool
            .execute(&ToolContext::default(), "{not json")
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }
}
