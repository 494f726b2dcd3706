//! Closure-backed tools for quick, ad-hoc capabilities.

use async_trait::async_trait;
use ferroact_core::error::ToolError;
use ferroact_core::tool::{Tool, ToolContext};

type Handler = dyn Fn(&ToolContext, &str) -> Result<String, ToolError> + Send + Sync;

/// A tool whose behaviour is a synchronous closure.
///
/// ```
/// use ferroact_tools::FnTool;
///
/// let upper = FnTool::new("upper", "Uppercase the input", |_ctx, args| {
///     Ok(serde_json::json!({ "text": args.to_uppercase() }).to_string())
/// });
/// # let _ = upper;
/// ```
pub struct FnTool {
    name: String,
    description: String,
    schema: serde_json::Value,
    handler: Box<Handler>,
}

impl FnTool {
    pub fn new<F>(name: impl Into<String>, description: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&ToolContext, &str) -> Result<String, ToolError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            schema: serde_json::json!({ "type": "object", "properties": {} }),
            handler: Box::new(handler),
        }
    }

    /// Replace the default empty-object parameter schema.
    pub fn with_schema(mut self, schema: serde_json::Value) -> Self {
        self.schema = schema;
        self
    }
}

#[async_trait]
impl Tool for FnTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters_schema(&self) -> serde_json::Value {
        self.schema.clone()
    }

    async fn execute(&self, ctx: &ToolContext, arguments: &str) -> Result<String, ToolError> {
        (self.handler)(ctx, arguments)
    }
}

impl std::fmt::Debug for FnTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnTool").field("name", &self.name).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn closure_sees_context_and_arguments() {
        let tool = FnTool::new("whoami", "Report the session", |ctx, args| {
            Ok(format!(r#"{{"session":"{}","args":{}}}"#, ctx.session_id, args))
        });

        let out = tool
            .execute(&ToolContext::new("sess-1"), r#"{"x":1}"#)
            .await
            .unwrap();
        assert_eq!(out, r#"{"session":"sess-1","args":{"x":1}}"#);
    }

    #[test]
    fn custom_schema_is_exported() {
        let schema = serde_json::json!({
            "type": "object",
            "properties": { "n": { "type": "integer" } },
            "required": ["n"]
        });
        let tool = FnTool::new("n", "", |_, _| Ok("{}".into())).with_schema(schema.clone());
        assert_eq!(tool.to_definition().parameters, schema);
    }
}
