//! Tool trait — the abstraction over agent capabilities.
//!
//! A tool is JSON in, JSON out. Failures a tool wants the model to see are
//! returned as `Err(ToolError)` (or as an `{"error": ...}` string); the
//! registry turns both into an error payload so a misbehaving tool never
//! aborts a run.

use std::any::Any;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ToolError;
use crate::provider::ToolDefinition;

/// Execution context handed to every tool call.
#[derive(Clone, Default)]
pub struct ToolContext {
    /// Id of the session the calling agent belongs to
    pub session_id: String,

    /// Directory relative paths resolve against
    pub working_dir: Option<PathBuf>,

    /// Opaque caller data
    pub user_data: Option<Arc<dyn Any + Send + Sync>>,
}

impl ToolContext {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            working_dir: None,
            user_data: None,
        }
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn with_user_data(mut self, data: Arc<dyn Any + Send + Sync>) -> Self {
        self.user_data = Some(data);
        self
    }

    /// Downcast the opaque user data.
    pub fn user_data<T: Any>(&self) -> Option<&T> {
        self.user_data.as_deref().and_then(|d| d.downcast_ref::<T>())
    }
}

impl std::fmt::Debug for ToolContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolContext")
            .field("session_id", &self.session_id)
            .field("working_dir", &self.working_dir)
            .field("user_data", &self.user_data.as_ref().map(|_| "<opaque>"))
            .finish()
    }
}

/// The core Tool trait.
///
/// Local tools implement it directly. Protocol-proxied tools implement it
/// by forwarding to a remote client, which they hold as private state.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "calculator", "file_read").
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the LLM).
    fn description(&self) -> &str;

    /// JSON Schema describing this tool's parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Execute the tool with a JSON arguments string, returning a JSON string.
    async fn execute(
        &self,
        ctx: &ToolContext,
        arguments: &str,
    ) -> std::result::Result<String, ToolError>;

    /// Convert this tool into a ToolDefinition for sending to the LLM.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// Parse a tool's JSON arguments, treating an empty string as `{}`.
pub fn parse_arguments(arguments: &str) -> std::result::Result<serde_json::Value, ToolError> {
    if arguments.trim().is_empty() {
        return Ok(serde_json::json!({}));
    }
    serde_json::from_str(arguments)
        .map_err(|e| ToolError::InvalidArguments(format!("arguments are not valid JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct WhoAmI;

    #[async_trait]
    impl Tool for WhoAmI {
        fn name(&self) -> &str {
            "whoami"
        }
        fn description(&self) -> &str {
            "Reports the calling session"
        }
        fn parameters_schema(&self) -> serde_json::Value {
            serde_json::json!({"type": "object", "properties": {}})
        }
        async fn execute(
            &self,
            ctx: &ToolContext,
            _arguments: &str,
        ) -> std::result::Result<String, ToolError> {
            let tag = ctx.user_data::<String>().cloned().unwrap_or_default();
            Ok(serde_json::json!({"session": ctx.session_id, "tag": tag}).to_string())
        }
    }

    #[tokio::test]
    async fn tool_sees_context() {
        let ctx = ToolContext::new("sess-1").with_user_data(Arc::new(String::from("blue")));
        let out = WhoAmI.execute(&ctx, "{}").await.unwrap();
        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["session"], "sess-1");
        assert_eq!(v["tag"], "blue");
    }

    #[test]
    fn definition_from_tool() {
        let def = WhoAmI.to_definition();
        assert_eq!(def.name, "whoami");
        assert_eq!(def.parameters["type"], "object");
    }

    #[test]
    fn parse_arguments_handles_empty_and_invalid() {
        assert_eq!(parse_arguments("").unwrap(), serde_json::json!({}));
        assert_eq!(parse_arguments(r#"{"x":1}"#).unwrap()["x"], 1);
        assert!(matches!(
            parse_arguments("{not json"),
            Err(ToolError::InvalidArguments(_))
        ));
    }

    #[test]
    fn user_data_downcast_mismatch_is_none() {
        let ctx = ToolContext::new("s").with_user_data(Arc::new(42u32));
        assert!(ctx.user_data::<String>().is_none());
        assert_eq!(ctx.user_data::<u32>(), Some(&42));
    }
}
