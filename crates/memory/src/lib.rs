//! Conversation memory implementations for ferroact.

pub mod in_memory;
pub mod noop;

pub use in_memory::InMemoryConversation;
pub use noop::NoopMemory;
