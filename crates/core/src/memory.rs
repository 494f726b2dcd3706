//! Conversation memory trait — history that outlives a single run.
//!
//! An agent bound to a memory replays its messages at the start of every
//! run and appends each new turn as it happens. Implementations store
//! independent heap clones, never references into a run's transient state.

use crate::error::Result;
use crate::message::Message;

/// The memory collaborator.
///
/// Implementations: in-memory (optionally bounded), none (no-op).
pub trait ConversationMemory: Send + Sync {
    /// The backend name (e.g., "in_memory", "none").
    fn name(&self) -> &str;

    /// Store a clone of `message` at the end of the history.
    fn append(&self, message: &Message) -> Result<()>;

    /// Every stored message, oldest first.
    fn messages(&self) -> Vec<Message>;

    /// The newest `n` messages, oldest first.
    fn last(&self, n: usize) -> Vec<Message>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every stored message.
    fn clear(&self);
}
