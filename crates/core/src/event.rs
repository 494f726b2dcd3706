//! Domain event system — observe runs without coupling to the loop.
//!
//! Agents and sessions publish events when something interesting happens.
//! Observers (tracing exporters, UIs) subscribe and filter.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::agent::RunStatus;

/// All domain events in the runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DomainEvent {
    /// An agent started a run
    RunStarted {
        agent: String,
        session_id: String,
        timestamp: DateTime<Utc>,
    },

    /// The LLM collaborator answered one iteration
    LlmResponded {
        agent: String,
        iteration: u32,
        finish_reason: Option<String>,
        tokens_used: u64,
        timestamp: DateTime<Utc>,
    },

    /// A tool call was dispatched
    ToolExecuted {
        tool_name: String,
        is_error: bool,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },

    /// A run ended
    RunFinished {
        agent: String,
        status: RunStatus,
        iterations: u32,
        total_tokens: u64,
        timestamp: DateTime<Utc>,
    },

    /// A session tore down everything it owned
    SessionClosed {
        session_id: String,
        agents: usize,
        registries: usize,
        protocol_clients: usize,
        timestamp: DateTime<Utc>,
    },
}

/// A broadcast-based event bus for domain events.
///
/// Uses `tokio::sync::broadcast` for multi-consumer pub/sub.
pub struct EventBus {
    sender: broadcast::Sender<Arc<DomainEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: DomainEvent) {
        // no subscribers is fine
        let _ = self.sender.send(Arc::new(event));
    }

    /// Subscribe to receive events.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<DomainEvent>> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.sender.receiver_count())
            .finish()
    }
}
