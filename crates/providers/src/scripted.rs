//! Scripted provider — replays a fixed sequence of responses.
//!
//! Used by the demo CLI and by tests to drive the agent loop without a
//! network backend. Every request is recorded so callers can assert on
//! exactly what the loop sent.

use std::collections::VecDeque;

use async_trait::async_trait;
use ferroact_core::error::ProviderError;
use ferroact_core::message::ChatResponse;
use ferroact_core::provider::{ChatRequest, LlmProvider};
use parking_lot::Mutex;

type Scripted = std::result::Result<ChatResponse, ProviderError>;

/// A provider that answers each call with the next queued outcome.
///
/// Once the queue is exhausted every call fails with
/// [`ProviderError::Backend`].
pub struct ScriptedProvider {
    name: String,
    queue: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedProvider {
    pub fn new(responses: impl IntoIterator<Item = ChatResponse>) -> Self {
        let provider = Self::named("scripted");
        for response in responses {
            provider.push(response);
        }
        provider
    }

    /// An empty script with a custom provider name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            queue: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful response.
    pub fn push(&self, response: ChatResponse) {
        self.queue.lock().push_back(Ok(response));
    }

    /// Queue a failure.
    pub fn push_error(&self, error: ProviderError) {
        self.queue.lock().push_back(Err(error));
    }

    pub fn with_response(self, response: ChatResponse) -> Self {
        self.push(response);
        self
    }

    pub fn with_error(self, error: ProviderError) -> Self {
        self.push_error(error);
        self
    }

    /// Outcomes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Every request received so far, oldest first.
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().clone()
    }

    pub fn last_request(&self) -> Option<ChatRequest> {
        self.requests.lock().last().cloned()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn chat(&self, request: ChatRequest) -> Scripted {
        let call = {
            let mut requests = self.requests.lock();
            requests.push(request);
            requests.len()
        };

        match self.queue.lock().pop_front() {
            Some(outcome) => {
                tracing::debug!(provider = %self.name, call, ok = outcome.is_ok(), "Replaying scripted outcome");
                outcome
            }
            None => Err(ProviderError::Backend(format!(
                "scripted provider '{}' has no response for call #{call}",
                self.name
            ))),
        }
    }
}
