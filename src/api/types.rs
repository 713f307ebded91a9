use serde::{Deserialize, Serialize};

use crate::bridge::StartRequest;
use crate::error::{BridgeError, Result};
use crate::types::{ApprovalDecision, Effort, ExecutionMode, ModelTier, SessionOptions};

/// Body of `POST /api/agent/chat`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub prompt: String,
    /// Continue an existing session
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub mode: ExecutionMode,
    #[serde(default)]
    pub model: ModelTier,
    #[serde(default)]
    pub effort: Effort,
}

impl From<ChatRequest> for StartRequest {
    fn from(request: ChatRequest) -> Self {
        StartRequest {
            project_id: request.project_id,
            prompt: request.prompt,
            session_id: request.session_id,
            options: SessionOptions {
                mode: request.mode,
                model: request.model,
                effort: request.effort,
            },
        }
    }
}

/// Body of `POST /api/agent/approvals`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalRequest {
    pub session_id: String,
    pub interaction_id: String,
    pub decision: ApprovalDecision,
}

impl ApprovalRequest {
    pub fn validate(&self) -> Result<()> {
        if self.session_id.trim().is_empty() {
            return Err(BridgeError::InvalidRequest(
                "sessionId must not be empty".to_string(),
            ));
        }
        if self.interaction_id.trim().is_empty() {
            return Err(BridgeError::InvalidRequest(
                "interactionId must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalResponse {
    pub resolved: bool,
}

/// Query of `GET /api/agent/approvals`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingQuery {
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbortResponse {
    pub aborted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub sessions: usize,
    pub pending_approvals: usize,
}
