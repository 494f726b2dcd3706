//! Agent run outcome types.

use serde::{Deserialize, Serialize};

use crate::error::ErrorCode;
use crate::message::{Message, Usage};

/// Default bound on Reason-Act iterations per run.
pub const DEFAULT_MAX_ITERATIONS: u32 = 10;

/// Response text reported when a run exhausts its iteration bound.
pub const MAX_ITERATIONS_RESPONSE: &str =
    "Maximum iterations reached without a final answer.";

/// How a run ended. Callers branch on this, not on response text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Success,
    MaxIterations,
    Error,
    /// The owning session was closed while the run was in flight.
    Aborted,
}

/// The result of one `Agent::run`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResult {
    pub status: RunStatus,

    /// Final answer, or the max-iterations sentinel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,

    /// LLM calls made in this run (the bound, on exhaustion)
    pub iterations: u32,

    /// Token usage accumulated across every completed LLM call
    pub usage: Usage,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorCode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// This run's transcript: the user turn and everything after it
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl AgentResult {
    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Success
    }

    /// Total tokens across the run.
    pub fn total_tokens(&self) -> u64 {
        self.usage.total()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&RunStatus::MaxIterations).unwrap();
        assert_eq!(json, r#""max_iterations""#);
    }

    #[test]
    fn result_reports_totals() {
        let result = AgentResult {
            status: RunStatus::Success,
            response: Some("ok".into()),
            iterations: 1,
            usage: Usage {
                input_tokens: 3,
                output_tokens: 4,
                ..Usage::default()
            },
            error: None,
            error_message: None,
            messages: vec![],
        };
        assert!(result.is_success());
        assert_eq!(result.total_tokens(), 7);
    }
}
