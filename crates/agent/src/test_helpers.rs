//! Shared helpers for unit tests in this crate.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use ferroact_core::error::{Error, Result};
use ferroact_core::message::{ChatResponse, ToolCall, Usage};
use ferroact_core::protocol::{ProtocolClient, RemoteToolInfo};
use ferroact_providers::ScriptedProvider;

/// A scripted LLM that replays `responses` in order.
pub fn scripted(responses: Vec<ChatResponse>) -> Arc<ScriptedProvider> {
    Arc::new(ScriptedProvider::new(responses))
}

/// A tool-calling turn.
pub fn tool_turn(calls: Vec<ToolCall>) -> ChatResponse {
    ChatResponse::tool_use(calls)
}

pub fn call(id: &str, name: &str, arguments: &str) -> ToolCall {
    ToolCall::new(id, name, arguments)
}

pub fn usage(input: u64, output: u64) -> Usage {
    Usage {
        input_tokens: input,
        output_tokens: output,
        ..Usage::default()
    }
}

/// An in-process protocol client whose tools echo their call back.
#[derive(Default)]
pub struct NullClient {
    connected: AtomicBool,
    tools: Vec<String>,
}

impl NullClient {
    pub fn connected() -> Self {
        let client = Self::default();
        client.connected.store(true, Ordering::SeqCst);
        client
    }

    pub fn with_tools<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            tools: names.into_iter().map(String::from).collect(),
            ..Self::default()
        }
    }
}

#[async_trait]
impl ProtocolClient for NullClient {
    fn name(&self) -> &str {
        "null"
    }

    async fn connect(&self) -> Result<()> {
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn list_tools(&self) -> Result<Vec<RemoteToolInfo>> {
        if !self.is_connected() {
            return Err(Error::NotConnected("null".into()));
        }
        Ok(self
            .tools
            .iter()
            .map(|name| RemoteToolInfo {
                name: name.clone(),
                description: format!("remote {name}"),
                input_schema: serde_json::json!({ "type": "object", "properties": {} }),
            })
            .collect())
    }

    async fn call_tool(&self, name: &str, arguments: &str) -> Result<String> {
        let args: serde_json::Value = serde_json::from_str(arguments)?;
        Ok(serde_json::json!({ "tool": name, "arguments": args }).to_string())
    }

    fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }
}
