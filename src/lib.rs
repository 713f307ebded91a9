//! # a3s-bridge
//!
//! Agent session orchestration and streaming bridge for the A3S cockpit.
//!
//! ## Overview
//!
//! `a3s-bridge` turns a single request/response HTTP boundary into a
//! long-lived conversation with an external agent runtime process. The
//! runtime can pause mid-execution to ask a human a question; the bridge
//! holds the call open until the human answers through a separate endpoint,
//! and it reports silent, hung, and crashed runtimes as distinct errors
//! instead of a bare connection close.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use a3s_bridge::{
//!     ApprovalGate, SessionRegistry, StartRequest, StaticProjects, StreamConfig,
//!     StreamingBridge,
//! };
//! use a3s_bridge::runtime::scripted::{Script, ScriptedRuntime};
//! use tokio_stream::StreamExt;
//!
//! # async fn example() -> a3s_bridge::Result<()> {
//! let runtime = Arc::new(ScriptedRuntime::new());
//! runtime
//!     .push(Script::new().line(serde_json::json!({
//!         "type": "result", "subtype": "success", "is_error": false
//!     })))
//!     .await;
//!
//! let bridge = StreamingBridge::new(
//!     runtime,
//!     Arc::new(SessionRegistry::new()),
//!     Arc::new(ApprovalGate::default()),
//!     Arc::new(StaticProjects::new().with("demo", "/tmp")),
//!     StreamConfig::default(),
//! );
//!
//! let mut events = bridge
//!     .start(StartRequest {
//!         project_id: Some("demo".to_string()),
//!         prompt: "Summarize the README".to_string(),
//!         ..Default::default()
//!     })
//!     .await?;
//!
//! while let Some(event) = events.next().await {
//!     println!("{}", serde_json::to_string(&event)?);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - **SessionRegistry**: session id → live execution handle
//! - **ApprovalGate**: suspends gated tool calls until a human decides
//! - **StreamingBridge**: drives one execution and relays NDJSON events
//! - **AgentRuntime** trait: the opaque agent process (CLI or scripted)
//! - **api** / **server**: axum HTTP surface

pub mod api;
pub mod bridge;
pub mod cli;
pub mod config;
pub mod dirs;
pub mod error;
pub mod event;
pub mod gate;
pub mod projects;
pub mod registry;
pub mod runtime;
pub mod server;
pub mod types;

// Re-export core types
pub use bridge::{EventStream, StartRequest, StreamingBridge};
pub use config::{ApprovalConfig, BridgeConfig, RuntimeConfig, StreamConfig};
pub use error::{BridgeError, Result};
pub use event::{ContentBlock, ErrorKind, RuntimeMessage, StreamEvent};
pub use gate::{ApprovalGate, ApprovalKey, GateConfig, GateError, GatedCall, PendingSummary};
pub use projects::{JsonProjectStore, ProjectResolver, StaticProjects};
pub use registry::{ExecutionHandle, SessionRegistry, SessionSummary};
pub use runtime::{AgentRuntime, ExitStatus, LaunchSpec};
pub use types::{
    ApprovalDecision, Effort, ExecutionMode, GatedAction, ModelTier, PermissionMode,
    SessionOptions,
};
