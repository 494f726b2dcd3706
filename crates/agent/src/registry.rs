//! Tool registry — name-addressed tools with call-by-name dispatch.
//!
//! Tool names, descriptions and parameter schemas are copied into the
//! session arena when a tool is added, so the registry's view of a tool
//! lives exactly as long as the session. Once the session closes, the
//! registry is released and every dispatch fails with `InvalidState`.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use ferroact_arena::{ArenaStr, SharedArena};
use ferroact_core::error::{Error, Result, ToolError};
use ferroact_core::message::{ToolCall, ToolResult, error_payload};
use ferroact_core::protocol::{ProtocolClient, RemoteToolInfo};
use ferroact_core::provider::ToolDefinition;
use ferroact_core::tool::{Tool, ToolContext};
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::session::Session;

/// Schema used when a tool declares none.
pub const EMPTY_SCHEMA: &str = r#"{"type":"object","properties":{}}"#;

struct ToolEntry {
    name: ArenaStr,
    description: ArenaStr,
    schema: ArenaStr,
    handler: Arc<dyn Tool>,
}

/// An owned snapshot of one registered tool.
#[derive(Clone)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    /// Parameter schema as a JSON string
    pub parameters: String,
    pub handler: Arc<dyn Tool>,
}

impl std::fmt::Debug for ToolDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolDescriptor")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("parameters", &self.parameters)
            .finish()
    }
}

pub struct ToolRegistry {
    session_id: String,
    arena: Arc<SharedArena>,
    entries: RwLock<Vec<ToolEntry>>,
    released: AtomicBool,
}

impl ToolRegistry {
    /// Create a registry backed by `session`'s arena and track it there.
    pub fn create(session: &Session) -> Result<Arc<Self>> {
        session.ensure_open()?;
        let registry = Arc::new(Self {
            session_id: session.id().to_string(),
            arena: Arc::clone(session.arena()),
            entries: RwLock::new(Vec::new()),
            released: AtomicBool::new(false),
        });
        session.add_registry(Arc::clone(&registry))?;
        debug!(session_id = %session.id(), "Tool registry created");
        Ok(registry)
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    fn ensure_live(&self) -> Result<()> {
        if self.released.load(Ordering::Acquire) || self.arena.is_destroyed() {
            return Err(Error::InvalidState(
                "tool registry was released with its session".into(),
            ));
        }
        Ok(())
    }

    fn copy_in(&self, text: &str) -> Result<ArenaStr> {
        self.arena.strdup(text).ok_or_else(|| {
            if self.arena.is_destroyed() {
                Error::InvalidState("session arena is destroyed".into())
            } else {
                Error::OutOfMemory(format!("arena refused {} bytes", text.len()))
            }
        })
    }

    fn entry_named(&self, entry: &ToolEntry, name: &str) -> bool {
        self.arena
            .with_str(entry.name, |stored| stored == name)
            .unwrap_or(false)
    }

    /// Register a tool.
    ///
    /// A duplicate name is skipped with a warning and still reports
    /// success; the first registration wins. On failure the registry is
    /// left unchanged.
    pub fn add(&self, tool: Arc<dyn Tool>) -> Result<()> {
        self.ensure_live()?;

        let name = tool.name().to_string();
        if name.is_empty() {
            return Err(Error::InvalidArgument("tool name must not be empty".into()));
        }

        let schema = match tool.parameters_schema() {
            serde_json::Value::Null => EMPTY_SCHEMA.to_string(),
            schema @ serde_json::Value::Object(_) => schema.to_string(),
            other => {
                return Err(Error::InvalidArgument(format!(
                    "tool '{name}' schema must be a JSON object, got {other}"
                )));
            }
        };

        let mut entries = self.entries.write();
        if entries.iter().any(|e| self.entry_named(e, &name)) {
            warn!(tool = %name, "Duplicate tool name, keeping the first registration");
            return Ok(());
        }

        let entry = ToolEntry {
            name: self.copy_in(&name)?,
            description: self.copy_in(tool.description())?,
            schema: self.copy_in(&schema)?,
            handler: tool,
        };
        entries
            .try_reserve(1)
            .map_err(|_| Error::OutOfMemory("tool table is full".into()))?;
        entries.push(entry);

        debug!(tool = %name, total = entries.len(), "Registered tool");
        Ok(())
    }

    /// Add every tool in order, continuing past failures.
    ///
    /// Returns the first failure, if any.
    pub fn add_all(&self, tools: impl IntoIterator<Item = Arc<dyn Tool>>) -> Result<()> {
        let mut first_error = None;
        for tool in tools {
            if let Err(e) = self.add(tool) {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn describe(&self, entry: &ToolEntry) -> Option<ToolDescriptor> {
        Some(ToolDescriptor {
            name: self.arena.get_string(entry.name)?,
            description: self.arena.get_string(entry.description)?,
            parameters: self.arena.get_string(entry.schema)?,
            handler: Arc::clone(&entry.handler),
        })
    }

    pub fn find(&self, name: &str) -> Option<ToolDescriptor> {
        let entries = self.entries.read();
        let entry = entries.iter().find(|e| self.entry_named(e, name))?;
        self.describe(entry)
    }

    fn handler(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.entries
            .read()
            .iter()
            .find(|e| self.entry_named(e, name))
            .map(|e| Arc::clone(&e.handler))
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Registered names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.entries
            .read()
            .iter()
            .filter_map(|e| self.arena.get_string(e.name))
            .collect()
    }

    /// Execute the tool called `name`.
    ///
    /// Unknown tools, tool failures and empty output all come back as
    /// `Ok` with an `{"error": ...}` payload. `Err` is reserved for a
    /// registry that can no longer dispatch at all.
    pub async fn call(&self, name: &str, arguments: &str, ctx: &ToolContext) -> Result<String> {
        self.ensure_live()?;

        let Some(handler) = self.handler(name) else {
            warn!(tool = %name, "Call to unregistered tool");
            return Ok(error_payload(format!("Tool '{name}' not found")));
        };

        debug!(tool = %name, "Dispatching tool");
        match handler.execute(ctx, arguments).await {
            Ok(output) if output.trim().is_empty() => {
                Ok(error_payload(format!("Tool '{name}' returned no output")))
            }
            Ok(output) => Ok(output),
            Err(e) => {
                warn!(tool = %name, error = %e, "Tool reported failure");
                Ok(error_payload(e.to_string()))
            }
        }
    }

    /// Execute a model-issued call and tag the output with its id.
    pub async fn dispatch(&self, call: &ToolCall, ctx: &ToolContext) -> Result<ToolResult> {
        let output = self.call(&call.name, &call.arguments, ctx).await?;
        Ok(ToolResult::from_output(call.id.clone(), output))
    }

    /// Structured definitions of every tool, in registration order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.entries
            .read()
            .iter()
            .filter_map(|e| self.describe(e))
            .map(|d| ToolDefinition {
                parameters: serde_json::from_str(&d.parameters)
                    .unwrap_or_else(|_| serde_json::json!({ "type": "object", "properties": {} })),
                name: d.name,
                description: d.description,
            })
            .collect()
    }

    /// OpenAI-style function array, or `None` for an empty registry.
    pub fn schema(&self) -> Option<String> {
        let functions: Vec<serde_json::Value> = self
            .definitions()
            .iter()
            .map(ToolDefinition::to_function_json)
            .collect();
        if functions.is_empty() {
            return None;
        }
        Some(serde_json::Value::Array(functions).to_string())
    }

    /// Discover a protocol client's tools and register each as a proxy.
    ///
    /// The client is tracked with `session` so closing it disconnects the
    /// client. Connects first if needed. Returns how many new tools were added.
    pub async fn add_protocol_tools(
        &self,
        session: &Session,
        client: Arc<dyn ProtocolClient>,
    ) -> Result<usize> {
        self.ensure_live()?;
        if session.id() != self.session_id {
            return Err(Error::InvalidArgument(
                "tool registry belongs to a different session".into(),
            ));
        }
        session.add_protocol_client(Arc::clone(&client))?;
        if !client.is_connected() {
            client.connect().await?;
        }

        let remote = client.list_tools().await?;
        let before = self.len();
        for info in remote {
            self.add(Arc::new(RemoteTool::new(Arc::clone(&client), info)))?;
        }
        let added = self.len() - before;

        info!(client = client.name(), added, "Registered remote tools");
        Ok(added)
    }

    /// Drop every entry; called by the owning session on close.
    pub(crate) fn release(&self) {
        self.released.store(true, Ordering::Release);
        let dropped = std::mem::take(&mut *self.entries.write());
        debug!(session_id = %self.session_id, tools = dropped.len(), "Tool registry released");
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("session_id", &self.session_id)
            .field("tools", &self.names())
            .finish()
    }
}

/// A tool discovered on a protocol server; execution is forwarded there.
pub struct RemoteTool {
    client: Arc<dyn ProtocolClient>,
    info: RemoteToolInfo,
}

impl RemoteTool {
    pub fn new(client: Arc<dyn ProtocolClient>, info: RemoteToolInfo) -> Self {
        Self { client, info }
    }
}

#[async_trait]
impl Tool for RemoteTool {
    fn name(&self) -> &str {
        &self.info.name
    }

    fn description(&self) -> &str {
        &self.info.description
    }

    fn parameters_schema(&self) -> serde_json::Value {
        self.info.input_schema.clone()
    }

    async fn execute(
        &self,
        _ctx: &ToolContext,
        arguments: &str,
    ) -> std::result::Result<String, ToolError> {
        if !self.client.is_connected() {
            return Err(ToolError::Remote(format!(
                "client '{}' is not connected",
                self.client.name()
            )));
        }
        self.client
            .call_tool(&self.info.name, arguments)
            .await
            .map_err(|e| ToolError::Remote(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::NullClient;
    use ferroact_core::message::is_error_payload;
    use ferroact_tools::{CalculatorTool, EchoTool, FnTool};

    fn open() -> (Arc<Session>, Arc<ToolRegistry>) {
        let session = Session::open().unwrap();
        let registry = ToolRegistry::create(&session).unwrap();
        (session, registry)
    }

    fn ctx() -> ToolContext {
        ToolContext::new("test")
    }

    #[test]
    fn add_and_find() {
        let (_session, registry) = open();
        registry.add(Arc::new(EchoTool)).unwrap();

        let found = registry.find("echo").unwrap();
        assert_eq!(found.name, "echo");
        assert!(!found.description.is_empty());
        assert!(found.parameters.starts_with('{'));
        assert!(registry.find("Echo").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn duplicate_names_keep_first() {
        let (_session, registry) = open();
        let first = FnTool::new("dup", "first", |_, _| Ok("{}".into()));
        let second = FnTool::new("dup", "second", |_, _| Ok("{}".into()));

        registry.add(Arc::new(first)).unwrap();
        registry.add(Arc::new(second)).unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.find("dup").unwrap().description, "first");
    }

    #[test]
    fn empty_name_is_rejected_without_mutation() {
        let (_session, registry) = open();
        let err = registry
            .add(Arc::new(FnTool::new("", "nameless", |_, _| Ok("{}".into()))))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert!(registry.is_empty());
    }

    #[test]
    fn non_object_schema_is_rejected() {
        let (_session, registry) = open();
        let tool = FnTool::new("bad", "", |_, _| Ok("{}".into())).with_schema(serde_json::json!([1]));
        assert!(matches!(
            registry.add(Arc::new(tool)),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn null_schema_defaults_to_empty_object() {
        let (_session, registry) = open();
        let tool = FnTool::new("plain", "", |_, _| Ok("{}".into())).with_schema(serde_json::Value::Null);
        registry.add(Arc::new(tool)).unwrap();
        assert_eq!(registry.find("plain").unwrap().parameters, EMPTY_SCHEMA);
    }

    #[test]
    fn add_all_continues_and_reports_first_failure() {
        let (_session, registry) = open();
        let tools: Vec<Arc<dyn Tool>> = vec![
            Arc::new(EchoTool),
            Arc::new(FnTool::new("", "", |_, _| Ok("{}".into()))),
            Arc::new(CalculatorTool),
        ];
        let err = registry.add_all(tools).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert_eq!(registry.names(), ["echo", "calculator"]);
    }

    #[test]
    fn strings_live_in_the_session_arena() {
        let (session, registry) = open();
        let before = session.arena_stats().total_used;
        registry.add(Arc::new(EchoTool)).unwrap();
        assert!(session.arena_stats().total_used > before);
    }

    #[tokio::test]
    async fn call_unknown_tool_returns_error_payload() {
        let (_session, registry) = open();
        let out = registry.call("ghost", "{}", &ctx()).await.unwrap();
        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["error"], "Tool 'ghost' not found");
    }

    #[tokio::test]
    async fn call_runs_the_handler() {
        let (_session, registry) = open();
        registry.add(Arc::new(EchoTool)).unwrap();
        let out = registry.call("echo", r#"{"x":1}"#, &ctx()).await.unwrap();
        assert_eq!(out, r#"{"echo":{"x":1}}"#);
    }

    #[tokio::test]
    async fn tool_failures_become_payloads() {
        let (_session, registry) = open();
        registry.add(Arc::new(CalculatorTool)).unwrap();
        registry
            .add(Arc::new(FnTool::new("silent", "", |_, _| Ok(String::new()))))
            .unwrap();

        let out = registry
            .call("calculator", r#"{"expression":"1/0"}"#, &ctx())
            .await
            .unwrap();
        assert!(is_error_payload(&out));

        let out = registry.call("silent", "{}", &ctx()).await.unwrap();
        assert_eq!(out, error_payload("Tool 'silent' returned no output"));
    }

    #[tokio::test]
    async fn dispatch_tags_call_id() {
        let (_session, registry) = open();
        registry.add(Arc::new(EchoTool)).unwrap();

        let ok = registry
            .dispatch(&ToolCall::new("call_1", "echo", "{}"), &ctx())
            .await
            .unwrap();
        assert_eq!(ok.tool_call_id, "call_1");
        assert!(!ok.is_error);

        let missing = registry
            .dispatch(&ToolCall::new("call_2", "nope", "{}"), &ctx())
            .await
            .unwrap();
        assert_eq!(missing.tool_call_id, "call_2");
        assert!(missing.is_error);
    }

    #[tokio::test]
    async fn released_registry_cannot_dispatch() {
        let (session, registry) = open();
        registry.add(Arc::new(EchoTool)).unwrap();
        session.close().unwrap();

        let err = registry.call("echo", "{}", &ctx()).await.unwrap_err();
        assert!(matches!(err, Error::InvalidState(_)));
        assert!(matches!(
            registry.add(Arc::new(EchoTool)),
            Err(Error::InvalidState(_))
        ));
    }

    #[test]
    fn schema_exports_function_array() {
        let (_session, registry) = open();
        assert!(registry.schema().is_none());

        registry.add(Arc::new(EchoTool)).unwrap();
        registry.add(Arc::new(CalculatorTool)).unwrap();

        let schema: serde_json::Value = serde_json::from_str(&registry.schema().unwrap()).unwrap();
        let functions = schema.as_array().unwrap();
        assert_eq!(functions.len(), 2);
        assert_eq!(functions[0]["type"], "function");
        assert_eq!(functions[0]["function"]["name"], "echo");
        assert_eq!(functions[1]["function"]["name"], "calculator");
        assert_eq!(
            functions[1]["function"]["parameters"]["required"],
            serde_json::json!(["expression"])
        );
    }

    #[tokio::test]
    async fn protocol_tools_are_proxied() {
        let (session, registry) = open();
        let client = Arc::new(NullClient::with_tools(["search", "fetch"]));

        let added = registry.add_protocol_tools(&session, client.clone()).await.unwrap();
        assert_eq!(added, 2);
        assert!(client.is_connected());
        assert_eq!(session.counts().protocol_clients, 1);
        assert_eq!(registry.names(), ["search", "fetch"]);

        let out = registry.call("search", r#"{"q":"rust"}"#, &ctx()).await.unwrap();
        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["tool"], "search");
        assert_eq!(v["arguments"]["q"], "rust");
    }

    #[tokio::test]
    async fn disconnected_remote_tool_reports_error_payload() {
        let (session, registry) = open();
        let client = Arc::new(NullClient::with_tools(["search"]));
        registry.add_protocol_tools(&session, client.clone()).await.unwrap();
        client.disconnect();

        let out = registry.call("search", "{}", &ctx()).await.unwrap();
        assert!(is_error_payload(&out));
    }

    #[tokio::test]
    async fn closing_the_session_disconnects_discovered_clients() {
        let (session, registry) = open();
        let client = Arc::new(NullClient::with_tools(["search"]));
        registry.add_protocol_tools(&session, client.clone()).await.unwrap();
        assert!(client.is_connected());

        session.close().unwrap();
        assert!(!client.is_connected());
    }

    #[tokio::test]
    async fn protocol_tools_need_the_owning_session() {
        let (_session, registry) = open();
        let other = Session::open().unwrap();
        let err = registry
            .add_protocol_tools(&other, Arc::new(NullClient::with_tools(["search"])))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert_eq!(other.counts().protocol_clients, 0);
    }
}
