//! # ferroact Core
//!
//! Domain types, collaborator traits, and error definitions for the
//! ferroact agent runtime. The runtime crate (`ferroact-agent`) drives
//! everything through the traits defined here:
//!
//! - [`LlmProvider`] — "call the LLM" with an ordered history
//! - [`Tool`] — "execute this tool" with JSON arguments
//! - [`ConversationMemory`] — history that spans runs
//! - [`ProtocolClient`] — remote tool servers
//!
//! Implementations live in their own crates, so tests can swap in scripted
//! stand-ins for every collaborator.

pub mod agent;
pub mod error;
pub mod event;
pub mod memory;
pub mod message;
pub mod protocol;
pub mod provider;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use agent::{AgentResult, DEFAULT_MAX_ITERATIONS, MAX_ITERATIONS_RESPONSE, RunStatus};
pub use error::{Error, ErrorCode, ProviderError, Result, ToolError};
pub use event::{DomainEvent, EventBus};
pub use memory::ConversationMemory;
pub use message::{ChatResponse, ContentBlock, Message, Role, ToolCall, ToolResult, Usage};
pub use protocol::{ProtocolClient, RemoteToolInfo};
pub use provider::{ChatRequest, LlmProvider, ToolDefinition};
pub use tool::{Tool, ToolContext};
