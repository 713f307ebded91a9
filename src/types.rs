//! Core session types shared by the registry, gate, and bridge
//!
//! All wire-facing types use camelCase JSON serialization.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How much autonomy the agent gets for one session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Read-only planning; edits require an approved plan checkpoint
    Plan,
    /// File edits are accepted without prompting
    #[default]
    Edit,
    /// Every tool call is permitted
    Auto,
}

impl ExecutionMode {
    /// Initial runtime permission mode for this execution mode
    pub fn permission_mode(self) -> PermissionMode {
        match self {
            ExecutionMode::Plan => PermissionMode::Plan,
            ExecutionMode::Edit => PermissionMode::AcceptEdits,
            ExecutionMode::Auto => PermissionMode::BypassPermissions,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ExecutionMode::Plan => "plan",
            ExecutionMode::Edit => "edit",
            ExecutionMode::Auto => "auto",
        }
    }
}

/// Permission mode understood by the agent runtime
///
/// Derived from [`ExecutionMode`] at launch but independently mutable while
/// the execution is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PermissionMode {
    Default,
    Plan,
    AcceptEdits,
    BypassPermissions,
}

impl PermissionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            PermissionMode::Default => "default",
            PermissionMode::Plan => "plan",
            PermissionMode::AcceptEdits => "acceptEdits",
            PermissionMode::BypassPermissions => "bypassPermissions",
        }
    }

    /// Mode to switch to once a plan checkpoint has been approved
    ///
    /// Restricted modes move up to `AcceptEdits`; modes that already allow
    /// edits are left unchanged.
    pub fn escalated(self) -> PermissionMode {
        match self {
            PermissionMode::Default | PermissionMode::Plan => PermissionMode::AcceptEdits,
            other => other,
        }
    }
}

impl fmt::Display for PermissionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Model tier selected for a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelTier {
    Opus,
    #[default]
    Sonnet,
    Haiku,
}

impl ModelTier {
    pub fn as_str(self) -> &'static str {
        match self {
            ModelTier::Opus => "opus",
            ModelTier::Sonnet => "sonnet",
            ModelTier::Haiku => "haiku",
        }
    }
}

/// Reasoning effort requested for a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effort {
    Low,
    #[default]
    Medium,
    High,
}

impl Effort {
    /// Extended-thinking token budget passed to the runtime, if any
    pub fn thinking_tokens(self) -> Option<u32> {
        match self {
            Effort::Low => None,
            Effort::Medium => Some(10_000),
            Effort::High => Some(31_999),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Effort::Low => "low",
            Effort::Medium => "medium",
            Effort::High => "high",
        }
    }
}

/// Per-session runtime options chosen by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionOptions {
    #[serde(default)]
    pub mode: ExecutionMode,
    #[serde(default)]
    pub model: ModelTier,
    #[serde(default)]
    pub effort: Effort,
}

/// Tool invocations that must be paused for a human decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GatedAction {
    /// Free-form multiple-choice question posed to the human
    AskUserQuestion,
    /// "Plan ready for execution" checkpoint
    ExitPlanMode,
}

impl GatedAction {
    /// Classify a runtime tool name; `None` means the tool is not gated
    pub fn from_tool_name(tool_name: &str) -> Option<Self> {
        match tool_name {
            "AskUserQuestion" => Some(GatedAction::AskUserQuestion),
            "ExitPlanMode" | "exit_plan_mode" => Some(GatedAction::ExitPlanMode),
            _ => None,
        }
    }

    pub fn tool_name(self) -> &'static str {
        match self {
            GatedAction::AskUserQuestion => "AskUserQuestion",
            GatedAction::ExitPlanMode => "ExitPlanMode",
        }
    }

    /// Whether approving this action should escalate the permission mode
    pub fn is_plan_checkpoint(self) -> bool {
        matches!(self, GatedAction::ExitPlanMode)
    }
}

/// A human decision on a gated action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "behavior", rename_all = "lowercase")]
pub enum ApprovalDecision {
    /// Let the call proceed, optionally replacing its input (e.g. with the
    /// human's selected answers)
    Allow {
        #[serde(
            rename = "updatedInput",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        updated_input: Option<serde_json::Value>,
    },
    /// Fail the call with a human-readable reason
    Deny {
        #[serde(default = "default_deny_message")]
        message: String,
    },
}

fn default_deny_message() -> String {
    "The user declined this action".to_string()
}

impl ApprovalDecision {
    pub fn allow() -> Self {
        ApprovalDecision::Allow {
            updated_input: None,
        }
    }

    pub fn allow_with(input: serde_json::Value) -> Self {
        ApprovalDecision::Allow {
            updated_input: Some(input),
        }
    }

    pub fn deny(message: impl Into<String>) -> Self {
        ApprovalDecision::Deny {
            message: message.into(),
        }
    }

    pub fn is_allow(&self) -> bool {
        matches!(self, ApprovalDecision::Allow { .. })
    }
}
