//! The agent Reason-Act loop.

use std::any::Any;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Instant;

use chrono::Utc;
use ferroact_config::AgentDefaults;
use ferroact_core::agent::{AgentResult, DEFAULT_MAX_ITERATIONS, MAX_ITERATIONS_RESPONSE, RunStatus};
use ferroact_core::error::{Error, ErrorCode, Result};
use ferroact_core::event::{DomainEvent, EventBus};
use ferroact_core::memory::ConversationMemory;
use ferroact_core::message::{Message, ToolResult, Usage, error_payload};
use ferroact_core::provider::{ChatRequest, LlmProvider};
use ferroact_core::tool::ToolContext;
use tracing::{debug, error, info, warn};

use crate::registry::ToolRegistry;
use crate::session::Session;
use crate::stream_event::RunStream;

/// Construction options for an [`Agent`].
#[derive(Clone)]
pub struct AgentOptions {
    pub name: String,
    pub registry: Option<Arc<ToolRegistry>>,
    pub memory: Option<Arc<dyn ConversationMemory>>,
    pub max_iterations: u32,
    /// Handed to the LLM collaborator; the loop itself never enforces it
    pub timeout_ms: Option<u64>,
    pub instructions: Option<String>,
    pub event_bus: Option<Arc<EventBus>>,
    pub user_data: Option<Arc<dyn Any + Send + Sync>>,
}

impl AgentOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            registry: None,
            memory: None,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            timeout_ms: None,
            instructions: None,
            event_bus: None,
            user_data: None,
        }
    }

    /// Options seeded from the `[agent]` config section.
    pub fn from_defaults(name: impl Into<String>, defaults: &AgentDefaults) -> Self {
        Self {
            max_iterations: defaults.max_iterations,
            timeout_ms: defaults.timeout_ms,
            instructions: defaults.instructions.clone(),
            ..Self::new(name)
        }
    }

    pub fn with_registry(mut self, registry: Arc<ToolRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn with_memory(mut self, memory: Arc<dyn ConversationMemory>) -> Self {
        self.memory = Some(memory);
        self
    }

    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(bus);
        self
    }

    /// Opaque data every tool call sees through its [`ToolContext`].
    pub fn with_user_data(mut self, data: Arc<dyn Any + Send + Sync>) -> Self {
        self.user_data = Some(data);
        self
    }
}

/// An LLM bound to an optional tool registry and memory.
///
/// Reusable across runs; one run at a time.
pub struct Agent {
    name: String,
    session_id: String,
    working_dir: Option<PathBuf>,
    llm: Arc<dyn LlmProvider>,
    registry: Option<Arc<ToolRegistry>>,
    memory: Option<Arc<dyn ConversationMemory>>,
    max_iterations: u32,
    timeout_ms: Option<u64>,
    instructions: Option<String>,
    events: Option<Arc<EventBus>>,
    user_data: Option<Arc<dyn Any + Send + Sync>>,
    iterations: AtomicU32,
    shut_down: AtomicBool,
}

/// Per-run bookkeeping shared by every exit path.
struct RunState {
    history: Vec<Message>,
    transcript_start: usize,
    usage: Usage,
    iterations: u32,
}

impl Agent {
    /// Create an agent under `session` and track it there.
    pub fn create(
        session: &Session,
        options: AgentOptions,
        llm: Arc<dyn LlmProvider>,
    ) -> Result<Arc<Self>> {
        session.ensure_open()?;
        if options.name.trim().is_empty() {
            return Err(Error::InvalidArgument("agent name must not be empty".into()));
        }
        if options.max_iterations == 0 {
            return Err(Error::InvalidArgument("max_iterations must be at least 1".into()));
        }
        if let Some(registry) = &options.registry
            && registry.session_id() != session.id()
        {
            return Err(Error::InvalidArgument(
                "tool registry belongs to a different session".into(),
            ));
        }

        let agent = Arc::new(Self {
            name: options.name,
            session_id: session.id().to_string(),
            working_dir: session.working_dir().map(PathBuf::from),
            llm,
            registry: options.registry,
            memory: options.memory,
            max_iterations: options.max_iterations,
            timeout_ms: options.timeout_ms,
            instructions: options.instructions,
            events: options.event_bus.or_else(|| session.events().cloned()),
            user_data: options.user_data,
            iterations: AtomicU32::new(0),
            shut_down: AtomicBool::new(false),
        });
        session.add_agent(Arc::clone(&agent))?;

        debug!(
            agent = %agent.name,
            session_id = %agent.session_id,
            provider = agent.llm.name(),
            "Agent created"
        );
        Ok(agent)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// LLM calls made by the current or most recent run.
    pub fn iterations(&self) -> u32 {
        self.iterations.load(Ordering::Relaxed)
    }

    /// Zero the iteration counter. Memory and bindings are untouched.
    pub fn reset(&self) {
        self.iterations.store(0, Ordering::Relaxed);
    }

    /// Whether the owning session has been closed.
    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::Acquire)
    }

    pub(crate) fn shutdown(&self) {
        self.shut_down.store(true, Ordering::Release);
        debug!(agent = %self.name, "Agent shut down");
    }

    fn publish(&self, event: DomainEvent) {
        if let Some(bus) = &self.events {
            bus.publish(event);
        }
    }

    fn tool_context(&self) -> ToolContext {
        let mut ctx = ToolContext::new(self.session_id.clone());
        ctx.working_dir = self.working_dir.clone();
        ctx.user_data = self.user_data.clone();
        ctx
    }

    /// Append to the running sequence and to memory, if bound.
    fn record(&self, state: &mut RunState, message: Message) -> Result<()> {
        if let Some(memory) = &self.memory {
            memory.append(&message)?;
        }
        state
            .history
            .try_reserve(1)
            .map_err(|_| Error::OutOfMemory("conversation history".into()))?;
        state.history.push(message);
        Ok(())
    }

    /// The messages sent on every call: instructions, then history.
    fn request(&self, state: &RunState, tools: &Option<String>) -> ChatRequest {
        let mut messages = Vec::with_capacity(state.history.len() + 1);
        if let Some(instructions) = &self.instructions {
            messages.push(Message::system(instructions.clone()));
        }
        messages.extend(state.history.iter().cloned());
        ChatRequest::new(messages)
            .with_tools(tools.clone())
            .with_timeout_ms(self.timeout_ms)
    }

    /// Run one user input through the Reason-Act loop.
    ///
    /// `Err` only for empty input or a closed session; every in-loop
    /// outcome, including provider failures, is reported as an
    /// [`AgentResult`] with a status.
    pub async fn run(&self, input: &str) -> Result<AgentResult> {
        if input.trim().is_empty() {
            return Err(Error::InvalidArgument("input must not be empty".into()));
        }
        if self.is_shut_down() {
            return Err(Error::InvalidState(format!(
                "session {} is closed",
                self.session_id
            )));
        }

        self.reset();
        info!(agent = %self.name, session_id = %self.session_id, "Agent run started");
        self.publish(DomainEvent::RunStarted {
            agent: self.name.clone(),
            session_id: self.session_id.clone(),
            timestamp: Utc::now(),
        });

        let history = self.memory.as_ref().map(|m| m.messages()).unwrap_or_default();
        let mut state = RunState {
            transcript_start: history.len(),
            history,
            usage: Usage::default(),
            iterations: 0,
        };

        if let Err(e) = self.record(&mut state, Message::user(input)) {
            return Ok(self.fail(state, &e));
        }

        let tools = self.registry.as_ref().and_then(|r| r.schema());
        let ctx = self.tool_context();

        while state.iterations < self.max_iterations {
            if self.is_shut_down() {
                warn!(agent = %self.name, "Session closed mid-run, aborting");
                return Ok(self.finish(state, RunStatus::Aborted, None, None));
            }

            state.iterations += 1;
            self.iterations.store(state.iterations, Ordering::Relaxed);
            debug!(agent = %self.name, iteration = state.iterations, "Calling LLM");

            let response = match self.llm.chat(self.request(&state, &tools)).await {
                Ok(response) => response,
                Err(e) => {
                    error!(agent = %self.name, iteration = state.iterations, error = %e, "LLM call failed");
                    return Ok(self.fail(state, &Error::Provider(e)));
                }
            };

            state.usage.accumulate(&response.usage);
            self.publish(DomainEvent::LlmResponded {
                agent: self.name.clone(),
                iteration: state.iterations,
                finish_reason: response.finish_reason.clone(),
                tokens_used: response.usage.total(),
                timestamp: Utc::now(),
            });

            let is_final =
                response.is_stop() || (!response.has_tool_calls() && response.text().is_some());
            if is_final {
                let message = response.into_message();
                let answer = message.text();
                if let Err(e) = self.record(&mut state, message) {
                    return Ok(self.fail(state, &e));
                }
                return Ok(self.finish(state, RunStatus::Success, answer, None));
            }

            if !response.has_tool_calls() {
                warn!(
                    agent = %self.name,
                    iteration = state.iterations,
                    "LLM returned neither content nor tool calls"
                );
                break;
            }

            let message = response.into_message();
            let calls = message.tool_calls.clone();
            if let Err(e) = self.record(&mut state, message) {
                return Ok(self.fail(state, &e));
            }

            for call in &calls {
                let started = Instant::now();
                let dispatched = match &self.registry {
                    Some(registry) => registry.dispatch(call, &ctx).await,
                    None => Ok(ToolResult::from_output(
                        call.id.clone(),
                        error_payload(format!("Tool '{}' not found", call.name)),
                    )),
                };

                let result = match dispatched {
                    Ok(result) => result,
                    Err(e) => {
                        error!(agent = %self.name, tool = %call.name, error = %e, "Tool dispatch failed");
                        return Ok(self.fail(state, &e));
                    }
                };

                debug!(tool = %call.name, is_error = result.is_error, "Tool executed");
                self.publish(DomainEvent::ToolExecuted {
                    tool_name: call.name.clone(),
                    is_error: result.is_error,
                    duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
                    timestamp: Utc::now(),
                });

                if let Err(e) = self.record(&mut state, Message::from(result)) {
                    return Ok(self.fail(state, &e));
                }
            }
        }

        warn!(agent = %self.name, max = self.max_iterations, "Max iterations reached");
        state.iterations = self.max_iterations;
        self.iterations.store(state.iterations, Ordering::Relaxed);
        Ok(self.finish(
            state,
            RunStatus::MaxIterations,
            Some(MAX_ITERATIONS_RESPONSE.to_string()),
            None,
        ))
    }

    fn fail(&self, state: RunState, err: &Error) -> AgentResult {
        self.finish(state, RunStatus::Error, None, Some((err.code(), err.to_string())))
    }

    fn finish(
        &self,
        state: RunState,
        status: RunStatus,
        response: Option<String>,
        error: Option<(ErrorCode, String)>,
    ) -> AgentResult {
        let RunState {
            mut history,
            transcript_start,
            usage,
            iterations,
        } = state;
        let messages = history.split_off(transcript_start.min(history.len()));

        info!(
            agent = %self.name,
            status = ?status,
            iterations,
            tokens = usage.total(),
            "Agent run finished"
        );
        self.publish(DomainEvent::RunFinished {
            agent: self.name.clone(),
            status,
            iterations,
            total_tokens: usage.total(),
            timestamp: Utc::now(),
        });

        let (error, error_message) = error.unzip();
        AgentResult {
            status,
            response,
            iterations,
            usage,
            error,
            error_message,
            messages,
        }
    }

    /// Streaming runs are not supported yet.
    pub async fn run_stream(&self, _input: &str) -> Result<RunStream> {
        Err(Error::NotImplemented("streaming agent runs".into()))
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("session_id", &self.session_id)
            .field("max_iterations", &self.max_iterations)
            .field("iterations", &self.iterations())
            .finish()
    }
}
