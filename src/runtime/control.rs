//! Control protocol spoken with the agent runtime over stdin/stdout
//!
//! The runtime asks for tool permission with `control_request` lines
//! (`subtype: can_use_tool`) and expects a matching `control_response` on
//! stdin. The bridge also originates control requests of its own
//! (`set_permission_mode`) to reconfigure a running execution.

use crate::types::PermissionMode;
use serde::Deserialize;
use serde_json::{json, Value};

/// A `control_request` line emitted by the runtime
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ControlRequest {
    pub request_id: String,
    pub request: ControlRequestBody,
}

/// Body of a runtime control request, discriminated on `subtype`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "subtype", rename_all = "snake_case")]
pub enum ControlRequestBody {
    /// The runtime is about to invoke a tool and asks whether it may
    CanUseTool {
        tool_name: String,
        #[serde(default)]
        input: Value,
        #[serde(default)]
        tool_use_id: Option<String>,
    },
    /// Any subtype the bridge does not handle (hooks, MCP relays, ...)
    #[serde(other)]
    Other,
}

impl ControlRequest {
    /// Interaction id used to correlate the approval with its resolution
    ///
    /// The tool-use id is what clients see in the relayed assistant message,
    /// so it is preferred over the control request id.
    pub fn interaction_id(&self) -> &str {
        match &self.request {
            ControlRequestBody::CanUseTool {
                tool_use_id: Some(id),
                ..
            } => id,
            _ => &self.request_id,
        }
    }
}

/// A line the bridge writes to the runtime's stdin
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundMessage {
    /// The user's prompt, sent once at the start of an execution
    UserPrompt(String),
    /// Permit a tool call with the given (possibly replaced) input
    Allow {
        request_id: String,
        updated_input: Value,
    },
    /// Refuse a tool call; the runtime treats it as a failed action
    Deny { request_id: String, message: String },
    /// The bridge could not answer the request
    ControlError { request_id: String, error: String },
    /// Switch the running execution to another permission mode
    SetPermissionMode {
        request_id: String,
        mode: PermissionMode,
    },
}

impl OutboundMessage {
    pub fn to_json(&self) -> Value {
        match self {
            OutboundMessage::UserPrompt(prompt) => json!({
                "type": "user",
                "message": { "role": "user", "content": prompt },
            }),
            OutboundMessage::Allow {
                request_id,
                updated_input,
            } => json!({
                "type": "control_response",
                "response": {
                    "subtype": "success",
                    "request_id": request_id,
                    "response": { "behavior": "allow", "updatedInput": updated_input },
                },
            }),
            OutboundMessage::Deny {
                request_id,
                message,
            } => json!({
                "type": "control_response",
                "response": {
                    "subtype": "success",
                    "request_id": request_id,
                    "response": { "behavior": "deny", "message": message },
                },
            }),
            OutboundMessage::ControlError { request_id, error } => json!({
                "type": "control_response",
                "response": {
                    "subtype": "error",
                    "request_id": request_id,
                    "error": error,
                },
            }),
            OutboundMessage::SetPermissionMode { request_id, mode } => json!({
                "type": "control_request",
                "request_id": request_id,
                "request": { "subtype": "set_permission_mode", "mode": mode.as_str() },
            }),
        }
    }

    /// Serialize as one newline-terminated JSON line
    pub fn encode(&self) -> Vec<u8> {
        let mut line = self.to_json().to_string().into_bytes();
        line.push(b'\n');
        line
    }
}

/// Instructions for the task that owns the runtime's stdin
#[derive(Debug, Clone, PartialEq)]
pub enum StdinCommand {
    Send(OutboundMessage),
    /// Close stdin so the runtime exits after its final result
    Close,
}
