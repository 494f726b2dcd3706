//! The ferroact runtime — sessions, tool registries and the agent loop.
//!
//! An agent follows a bounded **Reason → Act** cycle:
//!
//! 1. **Receive** a user input and replay any bound memory ahead of it
//! 2. **Call the LLM** with the history and the registry's tool schema
//! 3. **If tool calls**: dispatch each through the registry, append the
//!    results in call order and loop back to step 2
//! 4. **If a final answer**: record it and return
//!
//! The loop stops at the answer, at the iteration bound, on a provider
//! failure, or when the owning [`Session`] is closed underneath it.
//!
//! ```no_run
//! use std::sync::Arc;
//! use ferroact_agent::{Agent, AgentOptions, Session, ToolRegistry};
//! # async fn demo(llm: Arc<dyn ferroact_core::LlmProvider>) -> ferroact_core::Result<()> {
//! let session = Session::open()?;
//! let registry = ToolRegistry::create(&session)?;
//! let agent = Agent::create(&session, AgentOptions::new("helper").with_registry(registry), llm)?;
//! let result = agent.run("What is 6 * 7?").await?;
//! println!("{:?}: {:?}", result.status, result.response);
//! session.close()?;
//! # Ok(())
//! # }
//! ```

pub mod loop_runner;
pub mod registry;
pub mod session;
pub mod stream_event;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use loop_runner::{Agent, AgentOptions};
pub use registry::{EMPTY_SCHEMA, RemoteTool, ToolDescriptor, ToolRegistry};
pub use session::{Session, SessionCounts};
pub use stream_event::{RunStream, StreamEvent, StreamSender};
