//! LLM collaborator implementations for ferroact.
//!
//! Everything here implements [`ferroact_core::LlmProvider`]. Network-backed
//! providers are out of scope for the runtime; callers plug their own in and
//! register them with a [`ProviderRegistry`].

pub mod fallback;
pub mod registry;
pub mod scripted;

pub use fallback::FallbackProvider;
pub use registry::ProviderRegistry;
pub use scripted::ScriptedProvider;
