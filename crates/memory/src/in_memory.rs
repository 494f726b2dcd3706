//! In-memory conversation history — heap clones, optionally bounded.

use ferroact_core::error::{Error, Result};
use ferroact_core::memory::ConversationMemory;
use ferroact_core::message::{Message, Role};
use parking_lot::RwLock;
use std::collections::VecDeque;
use tracing::debug;

/// A history that stores independent clones of every appended message.
///
/// With a non-zero `max_messages`, the oldest messages are evicted once the
/// limit is exceeded.
pub struct InMemoryConversation {
    messages: RwLock<VecDeque<Message>>,
    max_messages: usize,
}

impl InMemoryConversation {
    pub fn new() -> Self {
        Self::bounded(0)
    }

    /// Keep at most `max_messages` (0 = unbounded).
    pub fn bounded(max_messages: usize) -> Self {
        Self {
            messages: RwLock::new(VecDeque::new()),
            max_messages,
        }
    }

    pub fn max_messages(&self) -> usize {
        self.max_messages
    }
}

impl Default for InMemoryConversation {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationMemory for InMemoryConversation {
    fn name(&self) -> &str {
        "in_memory"
    }

    fn append(&self, message: &Message) -> Result<()> {
        let mut messages = self.messages.write();
        messages
            .try_reserve(1)
            .map_err(|_| Error::OutOfMemory("conversation memory is full".into()))?;
        messages.push_back(message.clone());

        if self.max_messages > 0 {
            let mut excess = messages.len().saturating_sub(self.max_messages);
            if excess > 0 {
                // tool results never outlive the call that produced them
                while messages.get(excess).is_some_and(|m| m.role == Role::Tool) {
                    excess += 1;
                }
                messages.drain(..excess);
                debug!(evicted = excess, "Evicted oldest messages from memory");
            }
        }
        Ok(())
    }

    fn messages(&self) -> Vec<Message> {
        self.messages.read().iter().cloned().collect()
    }

    fn last(&self, n: usize) -> Vec<Message> {
        let messages = self.messages.read();
        let skip = messages.len().saturating_sub(n);
        messages.iter().skip(skip).cloned().collect()
    }

    fn len(&self) -> usize {
        self.messages.read().len()
    }

    fn clear(&self) {
        self.messages.write().clear();
    }
}
