//! Session registry
//!
//! Maps a session id to its one live [`ExecutionHandle`]. The bridge owns
//! registration and teardown; the approval endpoint only looks handles up
//! so that it can escalate the permission mode of an execution that is
//! already running.

use crate::error::{BridgeError, Result};
use crate::runtime::control::{OutboundMessage, StdinCommand};
use crate::types::{PermissionMode, SessionOptions};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tokio_util::sync::CancellationToken;

/// Handle to one running execution of the agent runtime
pub struct ExecutionHandle {
    session_id: String,
    execution_id: String,
    cwd: PathBuf,
    options: SessionOptions,
    started_at: DateTime<Utc>,
    permission_mode: RwLock<PermissionMode>,
    tool_counts: RwLock<HashMap<String, u64>>,
    stdin_tx: mpsc::Sender<StdinCommand>,
    cancel: CancellationToken,
    next_control_id: AtomicU64,
}

impl ExecutionHandle {
    pub fn new(
        session_id: impl Into<String>,
        cwd: impl Into<PathBuf>,
        options: SessionOptions,
        stdin_tx: mpsc::Sender<StdinCommand>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            execution_id: uuid::Uuid::new_v4().to_string(),
            cwd: cwd.into(),
            options,
            started_at: Utc::now(),
            permission_mode: RwLock::new(options.mode.permission_mode()),
            tool_counts: RwLock::new(HashMap::new()),
            stdin_tx,
            cancel: CancellationToken::new(),
            next_control_id: AtomicU64::new(1),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn execution_id(&self) -> &str {
        &self.execution_id
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn options(&self) -> SessionOptions {
        self.options
    }

    pub async fn permission_mode(&self) -> PermissionMode {
        *self.permission_mode.read().await
    }

    /// Queue a message for the runtime's stdin
    pub async fn send(&self, message: OutboundMessage) -> Result<()> {
        self.stdin_tx
            .send(StdinCommand::Send(message))
            .await
            .map_err(|_| BridgeError::SessionNotFound(self.session_id.clone()))
    }

    /// Ask the stdin writer to close the runtime's stdin
    pub async fn close_stdin(&self) {
        let _ = self.stdin_tx.send(StdinCommand::Close).await;
    }

    /// Switch the running execution to another permission mode
    ///
    /// Sends a `set_permission_mode` control request without restarting the
    /// runtime. A no-op when the mode is unchanged. The mode only changes
    /// once the request is queued for the runtime.
    pub async fn set_permission_mode(&self, mode: PermissionMode) -> Result<()> {
        let mut current = self.permission_mode.write().await;
        if *current == mode {
            return Ok(());
        }

        let id = self.next_control_id.fetch_add(1, Ordering::Relaxed);
        self.send(OutboundMessage::SetPermissionMode {
            request_id: format!("bridge-{id}"),
            mode,
        })
        .await?;
        *current = mode;
        drop(current);

        tracing::info!(
            session_id = %self.session_id,
            execution_id = %self.execution_id,
            mode = %mode,
            "Permission mode changed"
        );
        Ok(())
    }

    /// Fire the execution's cancellation signal
    pub fn abort(&self) {
        self.cancel.cancel();
    }

    pub fn is_aborted(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Completes once the execution has been aborted
    pub fn cancelled(&self) -> impl Future<Output = ()> + Send + '_ {
        self.cancel.cancelled()
    }

    /// Count one invocation of `tool`, returning the new total
    pub async fn record_tool_use(&self, tool: &str) -> u64 {
        let mut counts = self.tool_counts.write().await;
        let count = counts.entry(tool.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    pub async fn tool_counts(&self) -> HashMap<String, u64> {
        self.tool_counts.read().await.clone()
    }

    /// Point-in-time view for the sessions API
    pub async fn summary(&self, pending_approvals: usize) -> SessionSummary {
        SessionSummary {
            session_id: self.session_id.clone(),
            execution_id: self.execution_id.clone(),
            cwd: self.cwd.display().to_string(),
            mode: self.options.mode,
            permission_mode: self.permission_mode().await,
            model: self.options.model,
            effort: self.options.effort,
            started_at: self.started_at,
            tool_counts: self.tool_counts().await.into_iter().collect(),
            pending_approvals,
        }
    }
}

impl std::fmt::Debug for ExecutionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionHandle")
            .field("session_id", &self.session_id)
            .field("execution_id", &self.execution_id)
            .field("cwd", &self.cwd)
            .field("aborted", &self.is_aborted())
            .finish()
    }
}

/// Serializable view of a live execution
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: String,
    pub execution_id: String,
    pub cwd: String,
    pub mode: crate::types::ExecutionMode,
    pub permission_mode: PermissionMode,
    pub model: crate::types::ModelTier,
    pub effort: crate::types::Effort,
    pub started_at: DateTime<Utc>,
    pub tool_counts: BTreeMap<String, u64>,
    pub pending_approvals: usize,
}

/// Session id → live execution handle
#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Arc<ExecutionHandle>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handle, returning the execution it displaced, if any
    pub async fn register(&self, handle: Arc<ExecutionHandle>) -> Option<Arc<ExecutionHandle>> {
        let displaced = self
            .sessions
            .write()
            .await
            .insert(handle.session_id.clone(), handle.clone());

        tracing::debug!(
            session_id = %handle.session_id,
            execution_id = %handle.execution_id,
            displaced = displaced.is_some(),
            "Execution registered"
        );
        displaced
    }

    pub async fn lookup(&self, session_id: &str) -> Option<Arc<ExecutionHandle>> {
        self.sessions.read().await.get(session_id).cloned()
    }

    pub async fn unregister(&self, session_id: &str) -> Option<Arc<ExecutionHandle>> {
        self.sessions.write().await.remove(session_id)
    }

    /// Remove `handle` only if it is still the registered execution for its
    /// session; a newer execution that displaced it is left alone
    pub async fn release(&self, handle: &ExecutionHandle) -> bool {
        let mut sessions = self.sessions.write().await;
        let current = sessions
            .get(&handle.session_id)
            .is_some_and(|h| h.execution_id == handle.execution_id);
        if current {
            sessions.remove(&handle.session_id);
            tracing::debug!(
                session_id = %handle.session_id,
                execution_id = %handle.execution_id,
                "Execution unregistered"
            );
        }
        current
    }

    /// All live executions, oldest first
    pub async fn list(&self) -> Vec<Arc<ExecutionHandle>> {
        let mut handles: Vec<_> = self.sessions.read().await.values().cloned().collect();
        handles.sort_by(|a, b| a.started_at.cmp(&b.started_at));
        handles
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
