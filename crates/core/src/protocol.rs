//! Protocol-client trait — remote tool servers (Model Context Protocol).
//!
//! A client discovers tools on a remote server and executes them by name.
//! The tool registry wraps each discovered tool as an ordinary local tool
//! whose execute function forwards here.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A tool advertised by a remote server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteToolInfo {
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// JSON Schema for the tool's input
    #[serde(default = "empty_object_schema")]
    pub input_schema: serde_json::Value,
}

fn empty_object_schema() -> serde_json::Value {
    serde_json::json!({"type": "object", "properties": {}})
}

/// The protocol-client collaborator.
#[async_trait]
pub trait ProtocolClient: Send + Sync {
    /// Server name, used in logs and error payloads.
    fn name(&self) -> &str;

    async fn connect(&self) -> Result<()>;

    fn is_connected(&self) -> bool;

    async fn list_tools(&self) -> Result<Vec<RemoteToolInfo>>;

    /// Call a remote tool with JSON arguments, returning its JSON result.
    async fn call_tool(&self, name: &str, arguments: &str) -> Result<String>;

    /// Tear down the connection. Called by the owning session on close.
    fn disconnect(&self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_tool_defaults_schema() {
        let info: RemoteToolInfo = serde_json::from_str(r#"{"name":"search"}"#).unwrap();
        assert_eq!(info.name, "search");
        assert!(info.description.is_empty());
        assert_eq!(info.input_schema["type"], "object");
    }
}
