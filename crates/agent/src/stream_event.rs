//! Streaming run contract.
//!
//! [`Agent::run_stream`](crate::Agent::run_stream) currently always fails
//! with `NotImplemented`. The types below fix the shape of a streamed run
//! (a pollable, cancellable handle yielding [`StreamEvent`]s) without
//! promising any particular event ordering.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use ferroact_core::agent::RunStatus;
use ferroact_core::message::Usage;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// One increment of a streamed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Partial text from the LLM
    Delta { content: String },

    /// Partial reasoning text
    Thinking { content: String },

    ToolCall {
        id: String,
        name: String,
        arguments: String,
    },

    ToolResult {
        id: String,
        output: String,
        is_error: bool,
    },

    Done {
        status: RunStatus,
        iterations: u32,
        usage: Usage,
    },

    Error { message: String },
}

impl StreamEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Delta { .. } => "delta",
            Self::Thinking { .. } => "thinking",
            Self::ToolCall { .. } => "tool_call",
            Self::ToolResult { .. } => "tool_result",
            Self::Done { .. } => "done",
            Self::Error { .. } => "error",
        }
    }

    /// Whether no further events follow this one.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done { .. } | Self::Error { .. })
    }
}

/// Producer half of a [`RunStream`].
#[derive(Debug, Clone)]
pub struct StreamSender {
    tx: mpsc::Sender<StreamEvent>,
    cancelled: Arc<AtomicBool>,
}

impl StreamSender {
    /// Queue an event; `false` once the consumer cancelled or went away.
    pub async fn send(&self, event: StreamEvent) -> bool {
        if self.is_cancelled() {
            return false;
        }
        self.tx.send(event).await.is_ok()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Consumer handle for a streamed run.
#[derive(Debug)]
pub struct RunStream {
    rx: mpsc::Receiver<StreamEvent>,
    cancelled: Arc<AtomicBool>,
}

impl RunStream {
    /// A connected producer/consumer pair with room for `capacity` events.
    pub fn channel(capacity: usize) -> (StreamSender, RunStream) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let cancelled = Arc::new(AtomicBool::new(false));
        (
            StreamSender {
                tx,
                cancelled: Arc::clone(&cancelled),
            },
            RunStream { rx, cancelled },
        )
    }

    /// Next event if one is ready, without waiting.
    pub fn poll(&mut self) -> Option<StreamEvent> {
        self.rx.try_recv().ok()
    }

    /// Wait for the next event; `None` once the producer is gone.
    pub async fn next(&mut self) -> Option<StreamEvent> {
        self.rx.recv().await
    }

    /// Ask the producer to stop; already queued events remain readable.
    pub fn cancel(&mut self) {
        self.cancelled.store(true, Ordering::Release);
        self.rx.close();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}
