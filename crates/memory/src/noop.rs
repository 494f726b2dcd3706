//! No-op memory — the agent forgets everything between runs.

use ferroact_core::error::Result;
use ferroact_core::memory::ConversationMemory;
use ferroact_core::message::Message;

/// A memory that stores nothing.
pub struct NoopMemory;

impl ConversationMemory for NoopMemory {
    fn name(&self) -> &str {
        "none"
    }

    fn append(&self, _message: &Message) -> Result<()> {
        Ok(())
    }

    fn messages(&self) -> Vec<Message> {
        Vec::new()
    }

    fn last(&self, _n: usize) -> Vec<Message> {
        Vec::new()
    }

    fn len(&self) -> usize {
        0
    }

    fn clear(&self) {}
}
