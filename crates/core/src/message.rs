//! Conversation domain types.
//!
//! These are the value objects that flow through every run:
//! the caller's input becomes a user [`Message`], the LLM collaborator
//! answers with a [`ChatResponse`], the response is *moved* into an
//! assistant [`Message`], and each requested [`ToolCall`] produces one
//! [`ToolResult`] that is folded back into the history as a tool message.
//!
//! Order is significant everywhere: message order is conversation order,
//! block order must be replayed exactly (thinking-then-tool-use), and tool
//! results follow the order of the calls that produced them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The role of a message sender in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions
    System,
    /// The end user
    User,
    /// The model
    Assistant,
    /// Tool execution result
    Tool,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
        };
        f.write_str(s)
    }
}

/// One typed unit of model output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },

    /// Extended thinking. `signature` must be replayed byte-for-byte.
    Thinking {
        thinking: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        signature: Option<String>,
    },

    /// Encrypted thinking the provider hands back opaquely.
    RedactedThinking {
        data: String,
    },

    Reasoning {
        text: String,
    },

    /// A tool invocation request; `input` is the JSON arguments string.
    ToolUse {
        id: String,
        name: String,
        input: String,
    },

    ToolResult {
        tool_use_id: String,
        content: String,
        #[serde(default)]
        is_error: bool,
    },
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn thinking(thinking: impl Into<String>, signature: Option<String>) -> Self {
        Self::Thinking {
            thinking: thinking.into(),
            signature,
        }
    }

    /// Type tag as it appears on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Thinking { .. } => "thinking",
            Self::RedactedThinking { .. } => "redacted_thinking",
            Self::Reasoning { .. } => "reasoning",
            Self::ToolUse { .. } => "tool_use",
            Self::ToolResult { .. } => "tool_result",
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            _ => None,
        }
    }

    fn as_tool_call(&self) -> Option<ToolCall> {
        match self {
            Self::ToolUse { id, name, input } => Some(ToolCall {
                id: id.clone(),
                name: name.clone(),
                arguments: input.clone(),
            }),
            _ => None,
        }
    }
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique call ID (matches the LLM's tool_call.id)
    pub id: String,

    /// Name of the tool to invoke
    pub name: String,

    /// Arguments as a JSON string
    pub arguments: String,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }
}

/// The outcome of dispatching one [`ToolCall`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    /// The call ID this result answers
    pub tool_call_id: String,

    /// JSON output produced by the tool (or a `{"error": ...}` payload)
    pub output: String,

    #[serde(default)]
    pub is_error: bool,
}

impl ToolResult {
    /// Wrap raw tool output, flagging `{"error": ...}` payloads.
    pub fn from_output(tool_call_id: impl Into<String>, output: impl Into<String>) -> Self {
        let output = output.into();
        let is_error = is_error_payload(&output);
        Self {
            tool_call_id: tool_call_id.into(),
            output,
            is_error,
        }
    }
}

/// Whether `output` is a JSON object carrying an `"error"` key.
pub fn is_error_payload(output: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(output)
        .ok()
        .and_then(|v| v.as_object().map(|o| o.contains_key("error")))
        .unwrap_or(false)
}

/// Build the `{"error": "<message>"}` payload tools use to report failure.
pub fn error_payload(message: impl Into<String>) -> String {
    serde_json::json!({ "error": message.into() }).to_string()
}

/// A single turn of conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Who sent this message
    pub role: Role,

    /// Plain text content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Structured content, replayed to the provider in this exact order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<ContentBlock>,

    /// If this is a tool result, which tool call it responds to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,

    /// Tool calls requested by the assistant (if any)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,

    /// Timestamp
    pub timestamp: DateTime<Utc>,
}

impl Message {
    fn with_role(role: Role, content: Option<String>) -> Self {
        Self {
            role,
            content,
            blocks: Vec::new(),
            tool_call_id: None,
            tool_calls: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    /// Create a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role(Role::System, Some(content.into()))
    }

    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(Role::User, Some(content.into()))
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role(Role::Assistant, Some(content.into()))
    }

    /// An assistant turn that requests tool calls; the text is optional.
    pub fn assistant_tool_calls(content: Option<String>, tool_calls: Vec<ToolCall>) -> Self {
        let mut msg = Self::with_role(Role::Assistant, content);
        msg.tool_calls = tool_calls;
        msg
    }

    /// Create a tool result message.
    pub fn tool_result(tool_call_id: impl Into<String>, output: impl Into<String>) -> Self {
        let mut msg = Self::with_role(Role::Tool, Some(output.into()));
        msg.tool_call_id = Some(tool_call_id.into());
        msg
    }

    /// Content if set, else the concatenated text blocks.
    pub fn text(&self) -> Option<String> {
        if let Some(content) = &self.content {
            return Some(content.clone());
        }
        joined_text(&self.blocks)
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

impl From<ToolResult> for Message {
    fn from(result: ToolResult) -> Self {
        let mut msg = Message::tool_result(result.tool_call_id.clone(), result.output.clone());
        msg.blocks.push(ContentBlock::ToolResult {
            tool_use_id: result.tool_call_id,
            content: result.output,
            is_error: result.is_error,
        });
        msg
    }
}

fn joined_text(blocks: &[ContentBlock]) -> Option<String> {
    let parts: Vec<&str> = blocks.iter().filter_map(ContentBlock::as_text).collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.concat())
    }
}

/// Token usage counters reported by a provider.
///
/// `prompt_tokens` / `completion_tokens` are the legacy OpenAI-style names;
/// providers may fill either family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub thinking_tokens: u64,
    pub reasoning_tokens: u64,
    pub cache_creation_tokens: u64,
    pub cache_read_tokens: u64,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

impl Usage {
    /// Add another response's counters into this running total.
    ///
    /// `total_tokens` grows by the other response's own [`total`](Self::total),
    /// so responses that report different counter families still sum
    /// correctly.
    pub fn accumulate(&mut self, other: &Usage) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
        self.thinking_tokens += other.thinking_tokens;
        self.reasoning_tokens += other.reasoning_tokens;
        self.cache_creation_tokens += other.cache_creation_tokens;
        self.cache_read_tokens += other.cache_read_tokens;
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
        self.total_tokens += other.total();
    }

    /// Reported total, or the sum of the individual counters when the
    /// provider did not report one.
    pub fn total(&self) -> u64 {
        if self.total_tokens > 0 {
            return self.total_tokens;
        }
        let input = self.input_tokens.max(self.prompt_tokens);
        let output = self.output_tokens.max(self.completion_tokens);
        input + output + self.thinking_tokens + self.reasoning_tokens
    }
}

/// The single result of one LLM collaborator invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Provider-assigned response id
    #[serde(default)]
    pub id: String,

    /// Legacy flat content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<ContentBlock>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,

    /// e.g. "stop", "tool_calls", "length"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,

    #[serde(default)]
    pub usage: Usage,
}

impl ChatResponse {
    /// A final text answer (`finish_reason = "stop"`).
    pub fn stop(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            finish_reason: Some("stop".into()),
            ..Self::default()
        }
    }

    /// A turn requesting tool calls (`finish_reason = "tool_calls"`).
    pub fn tool_use(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls,
            finish_reason: Some("tool_calls".into()),
            ..Self::default()
        }
    }

    pub fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = usage;
        self
    }

    pub fn with_blocks(mut self, blocks: Vec<ContentBlock>) -> Self {
        self.blocks = blocks;
        self
    }

    pub fn is_stop(&self) -> bool {
        self.finish_reason.as_deref() == Some("stop")
    }

    /// Content if set, else the concatenated text blocks.
    pub fn text(&self) -> Option<String> {
        if let Some(content) = &self.content {
            return Some(content.clone());
        }
        joined_text(&self.blocks)
    }

    /// Explicit tool calls, or `tool_use` blocks for block-style providers.
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
            || self
                .blocks
                .iter()
                .any(|b| matches!(b, ContentBlock::ToolUse { .. }))
    }

    /// Move this response into an assistant message.
    ///
    /// Consumes the response: content, blocks and tool calls change owner
    /// rather than being copied. When the explicit tool-call list is empty,
    /// it is derived from `tool_use` blocks (in block order).
    pub fn into_message(self) -> Message {
        let tool_calls = if self.tool_calls.is_empty() {
            self.blocks.iter().filter_map(ContentBlock::as_tool_call).collect()
        } else {
            self.tool_calls
        };
        let mut msg = Message::assistant_tool_calls(self.content, tool_calls);
        msg.blocks = self.blocks;
        msg
    }
}

impl From<ChatResponse> for Message {
    fn from(response: ChatResponse) -> Self {
        response.into_message()
    }
}

impl From<Message> for ChatResponse {
    fn from(message: Message) -> Self {
        let finish_reason = if message.tool_calls.is_empty() {
            "stop"
        } else {
            "tool_calls"
        };
        Self {
            id: String::new(),
            content: message.content,
            blocks: message.blocks,
            tool_calls: message.tool_calls,
            finish_reason: Some(finish_reason.into()),
            usage: Usage::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mixed_blocks() -> Vec<ContentBlock> {
        vec![
            ContentBlock::thinking("let me check", Some("sig-\u{1F512}-abc==".into())),
            ContentBlock::RedactedThinking { data: "b64blob".into() },
            ContentBlock::Reasoning { text: "plan".into() },
            ContentBlock::text("Calling the tool."),
            ContentBlock::ToolUse {
                id: "toolu_1".into(),
                name: "echo".into(),
                input: r#"{"x":1}"#.into(),
            },
        ]
    }

    #[test]
    fn create_user_message() {
        let msg = Message::user("Hello, agent!");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content.as_deref(), Some("Hello, agent!"));
        assert!(msg.tool_calls.is_empty());
        assert!(msg.tool_call_id.is_none());
    }

    #[test]
    fn response_to_message_and_back_preserves_blocks() {
        let response = ChatResponse::default().with_blocks(mixed_blocks());
        let message = response.into_message();
        assert_eq!(message.role, Role::Assistant);

        let back = ChatResponse::from(message);
        assert_eq!(back.blocks, mixed_blocks());
        let kinds: Vec<_> = back.blocks.iter().map(ContentBlock::kind).collect();
        assert_eq!(
            kinds,
            ["thinking", "redacted_thinking", "reasoning", "text", "tool_use"]
        );
        match &back.blocks[0] {
            ContentBlock::Thinking { signature, .. } => {
                assert_eq!(signature.as_deref(), Some("sig-\u{1F512}-abc=="));
            }
            other => panic!("expected thinking block, got {other:?}"),
        }
    }

    #[test]
    fn tool_calls_derived_from_tool_use_blocks() {
        let response = ChatResponse::default().with_blocks(mixed_blocks());
        assert!(response.has_tool_calls());
        let message = response.into_message();
        assert_eq!(message.tool_calls, vec![ToolCall::new("toolu_1", "echo", r#"{"x":1}"#)]);
    }

    #[test]
    fn explicit_tool_calls_win_over_blocks() {
        let mut response = ChatResponse::tool_use(vec![ToolCall::new("a", "first", "{}")]);
        response.blocks = mixed_blocks();
        let message = response.into_message();
        assert_eq!(message.tool_calls.len(), 1);
        assert_eq!(message.tool_calls[0].name, "first");
    }

    #[test]
    fn text_falls_back_to_text_blocks() {
        let response = ChatResponse::default()
            .with_blocks(vec![ContentBlock::text("Hello, "), ContentBlock::text("world")]);
        assert_eq!(response.text().as_deref(), Some("Hello, world"));
        assert!(ChatResponse::default().text().is_none());
        assert_eq!(ChatResponse::stop("done").text().as_deref(), Some("done"));
    }

    #[test]
    fn stop_detection() {
        assert!(ChatResponse::stop("x").is_stop());
        assert!(!ChatResponse::tool_use(vec![]).is_stop());
        assert!(!ChatResponse::default().is_stop());
    }

    #[test]
    fn error_payload_detection() {
        assert!(is_error_payload(&error_payload("boom")));
        assert!(is_error_payload(r#"{"error":"Tool 'x' not found"}"#));
        assert!(!is_error_payload(r#"{"result":1}"#));
        assert!(!is_error_payload("plain text"));
        assert!(!is_error_payload(r#"["error"]"#));
        assert!(ToolResult::from_output("c1", error_payload("nope")).is_error);
    }

    #[test]
    fn tool_result_into_message_keeps_id_and_flag() {
        let msg = Message::from(ToolResult::from_output("call_7", r#"{"error":"bad"}"#));
        assert_eq!(msg.role, Role::Tool);
        assert_eq!(msg.tool_call_id.as_deref(), Some("call_7"));
        assert!(matches!(
            msg.blocks.as_slice(),
            [ContentBlock::ToolResult { is_error: true, .. }]
        ));
    }

    #[test]
    fn usage_accumulates_and_totals() {
        let mut total = Usage::default();
        total.accumulate(&Usage {
            input_tokens: 10,
            output_tokens: 5,
            ..Usage::default()
        });
        total.accumulate(&Usage {
            prompt_tokens: 7,
            completion_tokens: 3,
            thinking_tokens: 2,
            ..Usage::default()
        });
        assert_eq!(total.input_tokens, 10);
        assert_eq!(total.thinking_tokens, 2);
        assert_eq!(total.total(), (10 + 5) + (7 + 3 + 2));

        let reported = Usage {
            total_tokens: 99,
            ..Usage::default()
        };
        assert_eq!(reported.total(), 99);
    }

    #[test]
    fn mixed_usage_reports_sum_per_response() {
        let mut run = Usage::default();
        run.accumulate(&Usage {
            input_tokens: 10,
            output_tokens: 5,
            total_tokens: 15,
            ..Usage::default()
        });
        run.accumulate(&Usage {
            input_tokens: 7,
            output_tokens: 3,
            ..Usage::default()
        });
        run.accumulate(&Usage {
            prompt_tokens: 20,
            completion_tokens: 4,
            ..Usage::default()
        });
        assert_eq!(run.total(), 15 + 10 + 24);
        assert_eq!(run.input_tokens, 17);
        assert_eq!(run.prompt_tokens, 20);
    }

    #[test]
    fn content_block_serializes_with_type_tag() {
        let json = serde_json::to_string(&ContentBlock::text("hi")).unwrap();
        assert_eq!(json, r#"{"type":"text","text":"hi"}"#);
        let block: ContentBlock =
            serde_json::from_str(r#"{"type":"tool_result","tool_use_id":"t","content":"ok"}"#)
                .unwrap();
        assert!(matches!(block, ContentBlock::ToolResult { is_error: false, .. }));
    }
}
