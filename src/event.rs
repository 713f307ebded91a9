//! Event model
//!
//! Two families of messages live here:
//!
//! - [`RuntimeMessage`]: one JSON line read from the agent runtime's stdout
//! - [`StreamEvent`]: one NDJSON line written to the client
//!
//! The bridge parses the former, tracks whether it was substantive, and
//! projects it onto the latter. Adjacent text fragments of one message are
//! coalesced; nothing else is merged or reordered.

use crate::runtime::control::ControlRequest;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A message emitted by the agent runtime on stdout
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuntimeMessage {
    System(SystemMessage),
    Assistant(ConversationMessage),
    User(ConversationMessage),
    Result(ResultMessage),
    /// Partial-message stream event (only present with partial output enabled)
    StreamEvent {
        #[serde(default)]
        event: Value,
    },
    ControlRequest(ControlRequest),
    ControlResponse {
        #[serde(default)]
        response: Value,
    },
    /// The runtime withdrew an earlier control request
    ControlCancelRequest { request_id: String },
    KeepAlive,
    #[serde(other)]
    Unknown,
}

impl RuntimeMessage {
    /// Parse one stdout line
    pub fn parse(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line)
    }

    /// Whether this is a genuine assistant/result message rather than
    /// lifecycle noise
    pub fn is_substantive(&self) -> bool {
        matches!(
            self,
            RuntimeMessage::Assistant(_) | RuntimeMessage::User(_) | RuntimeMessage::Result(_)
        )
    }

    /// Project onto the client wire format; `None` for messages that are
    /// not relayed
    pub fn into_stream_event(self) -> Option<StreamEvent> {
        match self {
            RuntimeMessage::System(system) if system.subtype == "init" => Some(StreamEvent::Init {
                session_id: system.session_id.unwrap_or_default(),
                tools: system.tools,
                cwd: system.cwd,
                model: system.model,
            }),
            RuntimeMessage::Assistant(msg) => msg.into_delta(Role::Assistant),
            RuntimeMessage::User(msg) => msg.into_delta(Role::User),
            RuntimeMessage::Result(result) => Some(StreamEvent::Result {
                subtype: result.subtype,
                is_error: result.is_error,
                result: result.result,
                total_cost_usd: result.total_cost_usd,
                duration_ms: result.duration_ms,
                num_turns: result.num_turns,
                usage: result.usage,
            }),
            _ => None,
        }
    }
}

/// `system` lifecycle message
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SystemMessage {
    #[serde(default)]
    pub subtype: String,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default)]
    pub cwd: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

/// `assistant` or `user` conversation message
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConversationMessage {
    pub message: MessageBody,
    #[serde(default)]
    pub parent_tool_use_id: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MessageBody {
    #[serde(default)]
    pub id: Option<String>,
    /// Either a plain string or an array of content blocks
    #[serde(default)]
    pub content: Value,
}

impl MessageBody {
    /// Content blocks in order; unrecognised block types are skipped
    pub fn blocks(&self) -> Vec<ContentBlock> {
        match &self.content {
            Value::String(text) => vec![ContentBlock::Text { text: text.clone() }],
            Value::Array(items) => items
                .iter()
                .filter_map(|item| serde_json::from_value(item.clone()).ok())
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl ConversationMessage {
    fn into_delta(self, role: Role) -> Option<StreamEvent> {
        let content = coalesce_text(self.message.blocks());
        if content.is_empty() {
            return None;
        }
        Some(StreamEvent::MessageDelta {
            role,
            message_id: self.message.id,
            parent_tool_use_id: self.parent_tool_use_id,
            content,
        })
    }
}

/// Final `result` message of a run
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResultMessage {
    #[serde(default)]
    pub subtype: String,
    #[serde(default)]
    pub is_error: bool,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub total_cost_usd: Option<f64>,
    #[serde(default)]
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub num_turns: Option<u32>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

/// Token counters reported with a result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase", deserialize = "snake_case"))]
pub struct Usage {
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
    #[serde(default)]
    pub cache_creation_input_tokens: u64,
    #[serde(default)]
    pub cache_read_input_tokens: u64,
}

/// One fragment of message content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    Thinking {
        thinking: String,
    },
    /// A structured action invocation
    ToolUse {
        id: String,
        name: String,
        #[serde(default)]
        input: Value,
    },
    ToolResult {
        #[serde(rename = "toolUseId", alias = "tool_use_id")]
        tool_use_id: String,
        #[serde(default)]
        content: Value,
        #[serde(rename = "isError", alias = "is_error", default)]
        is_error: bool,
    },
}

/// Merge runs of adjacent text blocks into one block
pub fn coalesce_text(blocks: Vec<ContentBlock>) -> Vec<ContentBlock> {
    let mut out: Vec<ContentBlock> = Vec::with_capacity(blocks.len());
    for block in blocks {
        if let ContentBlock::Text { text } = &block {
            if let Some(ContentBlock::Text { text: prev }) = out.last_mut() {
                prev.push_str(text);
                continue;
            }
        }
        out.push(block);
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Assistant,
    User,
}

/// Relay-classified failure kind carried by an `error` event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No output, process exited with a failure code
    RuntimeExited,
    /// No output at all, clean or signalled exit
    RuntimeSilent,
    /// Lifecycle output only, never a real response
    RuntimeHang,
    /// Real output, then a failure exit code
    RuntimeFailed,
    /// A pending approval outlived its window
    ApprovalTimeout,
    /// The runtime process could not be started
    LaunchFailed,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::RuntimeExited => "runtime_exited",
            ErrorKind::RuntimeSilent => "runtime_silent",
            ErrorKind::RuntimeHang => "runtime_hang",
            ErrorKind::RuntimeFailed => "runtime_failed",
            ErrorKind::ApprovalTimeout => "approval_timeout",
            ErrorKind::LaunchFailed => "launch_failed",
        }
    }
}

/// One event on the client-facing NDJSON stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum StreamEvent {
    /// Always the first event of a stream
    Session { session_id: String, resumed: bool },
    Init {
        session_id: String,
        tools: Vec<String>,
        cwd: Option<String>,
        model: Option<String>,
    },
    MessageDelta {
        role: Role,
        message_id: Option<String>,
        parent_tool_use_id: Option<String>,
        content: Vec<ContentBlock>,
    },
    Result {
        subtype: String,
        is_error: bool,
        result: Option<String>,
        total_cost_usd: Option<f64>,
        duration_ms: Option<u64>,
        num_turns: Option<u32>,
        usage: Option<Usage>,
    },
    Error { kind: ErrorKind, message: String },
    /// End-of-stream marker
    Done,
}

impl StreamEvent {
    pub fn error(kind: ErrorKind, message: impl Into<String>) -> Self {
        StreamEvent::Error {
            kind,
            message: message.into(),
        }
    }

    /// Serialize as one newline-terminated JSON line
    pub fn to_ndjson(&self) -> serde_json::Result<Vec<u8>> {
        let mut line = serde_json::to_vec(self)?;
        line.push(b'\n');
        Ok(line)
    }

    pub fn is_done(&self) -> bool {
        matches!(self, StreamEvent::Done)
    }
}
