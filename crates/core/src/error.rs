//! Error types for the ferroact runtime.
//!
//! Uses `thiserror` for ergonomic error definitions. Every error maps to a
//! machine-checkable [`ErrorCode`] so callers can branch on the kind of
//! failure instead of parsing messages.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The top-level error type for all ferroact operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A required input was missing, empty or malformed.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The arena or a growable collection could not get memory.
    #[error("Out of memory: {0}")]
    OutOfMemory(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Not connected: {0}")]
    NotConnected(String),

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// The operation targets something already torn down (e.g. a closed session).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    // --- Collaborator errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// The machine-checkable kind of this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::OutOfMemory(_) => ErrorCode::OutOfMemory,
            Self::NotFound(_) => ErrorCode::NotFound,
            Self::NotConnected(_) => ErrorCode::NotConnected,
            Self::NotImplemented(_) => ErrorCode::NotImplemented,
            Self::InvalidState(_) => ErrorCode::InvalidState,
            Self::Provider(e) => e.code(),
            Self::Tool(_) => ErrorCode::Tool,
            Self::Config { .. } => ErrorCode::Config,
            Self::Serialization(_) => ErrorCode::Serialization,
        }
    }
}

/// Stable error kinds surfaced in run results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidArgument,
    OutOfMemory,
    NotFound,
    NotConnected,
    NotImplemented,
    InvalidState,
    Network,
    Timeout,
    Tls,
    Dns,
    Http,
    Auth,
    Backend,
    Tool,
    Config,
    Serialization,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::InvalidArgument => "invalid_argument",
            Self::OutOfMemory => "out_of_memory",
            Self::NotFound => "not_found",
            Self::NotConnected => "not_connected",
            Self::NotImplemented => "not_implemented",
            Self::InvalidState => "invalid_state",
            Self::Network => "network",
            Self::Timeout => "timeout",
            Self::Tls => "tls",
            Self::Dns => "dns",
            Self::Http => "http",
            Self::Auth => "auth",
            Self::Backend => "backend",
            Self::Tool => "tool",
            Self::Config => "config",
            Self::Serialization => "serialization",
        };
        f.write_str(s)
    }
}

// --- Bounded context errors ---

/// Transport-class failures raised by an LLM collaborator and passed
/// through the agent unchanged.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("TLS error: {0}")]
    Tls(String),

    #[error("DNS resolution failed: {0}")]
    Dns(String),

    #[error("HTTP request failed: {message} (status: {status})")]
    Http { status: u16, message: String },

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Provider ran out of memory: {0}")]
    NoMemory(String),

    #[error("Not implemented by provider: {0}")]
    NotImplemented(String),
}

impl ProviderError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Network(_) => ErrorCode::Network,
            Self::Timeout(_) => ErrorCode::Timeout,
            Self::Tls(_) => ErrorCode::Tls,
            Self::Dns(_) => ErrorCode::Dns,
            Self::Http { .. } => ErrorCode::Http,
            Self::Auth(_) => ErrorCode::Auth,
            Self::Backend(_) => ErrorCode::Backend,
            Self::NoMemory(_) => ErrorCode::OutOfMemory,
            Self::NotImplemented(_) => ErrorCode::NotImplemented,
        }
    }

    /// Whether a different provider might succeed where this one failed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout(_) | Self::Dns(_) | Self::Backend(_) => true,
            Self::Http { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Failures raised by a tool's execute function.
///
/// These never abort a run: the registry folds them into a
/// `{"error": ...}` payload the model can read.
#[derive(Debug, Clone, Error)]
pub enum ToolError {
    #[error("Tool execution failed: {tool_name} — {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),

    #[error("Permission denied: {tool_name} — {reason}")]
    PermissionDenied { tool_name: String, reason: String },

    #[error("Remote tool call failed: {0}")]
    Remote(String),
}
