//! Approval gate
//!
//! Suspends a gated tool call until a human decides on it through the
//! approval endpoint. Each pending request is keyed by
//! `(session id, interaction id)` and settles exactly once:
//!
//! - resolved by [`ApprovalGate::resolve`] with the human's decision
//! - expired after the approval timeout (5 minutes by default)
//! - aborted when the owning execution is cancelled or the runtime
//!   withdraws the request
//!
//! Whichever path removes the entry from the pending map first wins; the
//! others find it gone and become no-ops.
//!
//! Clients usually learn about a gated call (from the relayed assistant
//! message) before the runtime's permission request reaches the gate, so
//! `resolve` waits for the registration to land. It wakes on a
//! "registered" notification and re-checks on a short poll interval up
//! to a bounded ceiling.

use crate::registry::ExecutionHandle;
use crate::types::{ApprovalDecision, GatedAction};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{oneshot, Mutex, Notify};
use tokio::time::Instant;

/// Timing and bookkeeping limits for the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateConfig {
    /// How long a pending request may wait for a decision
    pub timeout: Duration,
    /// Re-check interval while `resolve` waits for a registration
    pub resolve_poll: Duration,
    /// Ceiling on how long `resolve` waits for a registration
    pub resolve_wait: Duration,
    /// How many recently settled keys are remembered
    pub settled_capacity: usize,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(300),
            resolve_poll: Duration::from_millis(200),
            resolve_wait: Duration::from_secs(5),
            settled_capacity: 1024,
        }
    }
}

/// Identity of one pending approval
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalKey {
    pub session_id: String,
    pub interaction_id: String,
}

impl ApprovalKey {
    pub fn new(session_id: impl Into<String>, interaction_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            interaction_id: interaction_id.into(),
        }
    }
}

impl fmt::Display for ApprovalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.session_id, self.interaction_id)
    }
}

/// A tool call the runtime asked permission for
#[derive(Debug, Clone, PartialEq)]
pub struct GatedCall {
    pub interaction_id: String,
    pub tool_name: String,
    pub input: Value,
}

/// Why a gated call failed instead of receiving a decision
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateError {
    #[error("No decision for '{key}' within {timeout_secs}s")]
    Timeout { key: String, timeout_secs: u64 },

    #[error("Approval '{0}' aborted")]
    Aborted(String),

    /// A request with the same key is already pending; the first one stays
    #[error("Approval '{0}' is already pending")]
    Duplicate(String),
}

/// A decision delivered to a suspended call
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedApproval {
    pub key: ApprovalKey,
    pub action: GatedAction,
    pub decision: ApprovalDecision,
}

/// Serializable view of a pending approval
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingSummary {
    pub session_id: String,
    pub interaction_id: String,
    pub tool_name: String,
    pub input: Value,
    pub requested_at: DateTime<Utc>,
    pub age_ms: u64,
    pub remaining_ms: u64,
}

struct PendingApproval {
    action: GatedAction,
    tool_name: String,
    input: Value,
    execution_id: String,
    created_at: Instant,
    requested_at: DateTime<Utc>,
    generation: u64,
    resolver: oneshot::Sender<ApprovalDecision>,
}

/// Bounded memory of keys that have already settled
struct SettledKeys {
    order: VecDeque<ApprovalKey>,
    keys: HashSet<ApprovalKey>,
    capacity: usize,
}

impl SettledKeys {
    fn new(capacity: usize) -> Self {
        Self {
            order: VecDeque::new(),
            keys: HashSet::new(),
            capacity,
        }
    }

    fn insert(&mut self, key: ApprovalKey) {
        if self.capacity == 0 || !self.keys.insert(key.clone()) {
            return;
        }
        self.order.push_back(key);
        if self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.keys.remove(&oldest);
            }
        }
    }

    fn remove(&mut self, key: &ApprovalKey) {
        if self.keys.remove(key) {
            self.order.retain(|k| k != key);
        }
    }

    fn contains(&self, key: &ApprovalKey) -> bool {
        self.keys.contains(key)
    }
}

struct GateState {
    pending: HashMap<ApprovalKey, PendingApproval>,
    settled: SettledKeys,
}

enum Attempt {
    Resolved(ResolvedApproval),
    /// The key settled earlier, or its caller is gone
    Settled,
    Missing,
}

/// Process-wide table of pending human decisions
pub struct ApprovalGate {
    config: GateConfig,
    state: Mutex<GateState>,
    registered: Notify,
    next_generation: AtomicU64,
}

impl Default for ApprovalGate {
    fn default() -> Self {
        Self::new(GateConfig::default())
    }
}

impl ApprovalGate {
    pub fn new(config: GateConfig) -> Self {
        Self {
            state: Mutex::new(GateState {
                pending: HashMap::new(),
                settled: SettledKeys::new(config.settled_capacity),
            }),
            config,
            registered: Notify::new(),
            next_generation: AtomicU64::new(1),
        }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Interception point for every tool call the runtime asks about
    ///
    /// Counts the call on the execution, lets non-gated tools through
    /// unchanged, and suspends gated ones until they are resolved, time
    /// out, or the execution is aborted.
    pub async fn intercept(
        &self,
        execution: &ExecutionHandle,
        call: GatedCall,
    ) -> Result<ApprovalDecision, GateError> {
        let count = execution.record_tool_use(&call.tool_name).await;

        let Some(action) = GatedAction::from_tool_name(&call.tool_name) else {
            tracing::debug!(
                session_id = %execution.session_id(),
                tool = %call.tool_name,
                count,
                "Tool allowed without approval"
            );
            return Ok(ApprovalDecision::allow_with(call.input));
        };

        let key = ApprovalKey::new(execution.session_id(), &call.interaction_id);
        if execution.is_aborted() {
            return Err(GateError::Aborted(key.to_string()));
        }

        let (tx, mut rx) = oneshot::channel();
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        {
            let mut state = self.state.lock().await;
            if state.pending.contains_key(&key) {
                tracing::warn!(key = %key, "Duplicate approval request rejected");
                return Err(GateError::Duplicate(key.to_string()));
            }
            state.settled.remove(&key);
            state.pending.insert(
                key.clone(),
                PendingApproval {
                    action,
                    tool_name: call.tool_name.clone(),
                    input: call.input,
                    execution_id: execution.execution_id().to_string(),
                    created_at: Instant::now(),
                    requested_at: Utc::now(),
                    generation,
                    resolver: tx,
                },
            );
        }
        self.registered.notify_waiters();

        tracing::info!(
            session_id = %key.session_id,
            interaction_id = %key.interaction_id,
            tool = %call.tool_name,
            "Approval requested"
        );

        let failure = tokio::select! {
            decision = &mut rx => {
                return decision.map_err(|_| GateError::Aborted(key.to_string()));
            }
            _ = tokio::time::sleep(self.config.timeout) => GateError::Timeout {
                key: key.to_string(),
                timeout_secs: self.config.timeout.as_secs(),
            },
            _ = execution.cancelled() => GateError::Aborted(key.to_string()),
        };

        if self.settle(&key, generation).await {
            tracing::warn!(key = %key, error = %failure, "Approval failed");
            Err(failure)
        } else {
            // A resolver removed the entry first; its decision stands
            rx.await.map_err(|_| failure)
        }
    }

    /// Resolve a pending approval, waiting for it to be registered
    ///
    /// Returns `None` when the key already settled, or when nothing was
    /// registered under it before the wait ceiling.
    pub async fn resolve(
        &self,
        session_id: &str,
        interaction_id: &str,
        decision: ApprovalDecision,
    ) -> Option<ResolvedApproval> {
        let key = ApprovalKey::new(session_id, interaction_id);
        let deadline = Instant::now() + self.config.resolve_wait;

        loop {
            let notified = self.registered.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            match self.attempt(&key, &decision).await {
                Attempt::Resolved(resolved) => return Some(resolved),
                Attempt::Settled => {
                    tracing::debug!(key = %key, "Approval already settled");
                    return None;
                }
                Attempt::Missing => {}
            }

            let now = Instant::now();
            if now >= deadline {
                tracing::info!(key = %key, "No pending approval to resolve");
                return None;
            }
            let wait = self.config.resolve_poll.min(deadline - now);
            tokio::select! {
                _ = &mut notified => {}
                _ = tokio::time::sleep(wait) => {}
            }
        }
    }

    /// Resolve only if the request is pending right now
    pub async fn try_resolve(
        &self,
        session_id: &str,
        interaction_id: &str,
        decision: ApprovalDecision,
    ) -> Option<ResolvedApproval> {
        let key = ApprovalKey::new(session_id, interaction_id);
        match self.attempt(&key, &decision).await {
            Attempt::Resolved(resolved) => Some(resolved),
            Attempt::Settled | Attempt::Missing => None,
        }
    }

    /// Fail one pending request as aborted
    pub async fn cancel(&self, key: &ApprovalKey) -> bool {
        let mut state = self.state.lock().await;
        match state.pending.remove(key) {
            Some(_entry) => {
                state.settled.insert(key.clone());
                tracing::info!(key = %key, "Approval cancelled");
                true
            }
            None => false,
        }
    }

    /// Fail every request still pending for this execution
    pub async fn abort_execution(&self, execution: &ExecutionHandle) -> usize {
        let mut state = self.state.lock().await;
        let keys: Vec<ApprovalKey> = state
            .pending
            .iter()
            .filter(|(_, p)| p.execution_id == execution.execution_id())
            .map(|(k, _)| k.clone())
            .collect();
        for key in &keys {
            state.pending.remove(key);
            state.settled.insert(key.clone());
        }
        if !keys.is_empty() {
            tracing::info!(
                session_id = %execution.session_id(),
                count = keys.len(),
                "Pending approvals aborted"
            );
        }
        keys.len()
    }

    /// Pending requests, optionally for one session, oldest first
    pub async fn pending(&self, session_id: Option<&str>) -> Vec<PendingSummary> {
        let state = self.state.lock().await;
        let mut entries: Vec<(&ApprovalKey, &PendingApproval)> = state
            .pending
            .iter()
            .filter(|(k, _)| session_id.map_or(true, |s| k.session_id == s))
            .collect();
        entries.sort_by_key(|(_, p)| p.created_at);

        entries
            .into_iter()
            .map(|(key, p)| {
                let age = p.created_at.elapsed();
                PendingSummary {
                    session_id: key.session_id.clone(),
                    interaction_id: key.interaction_id.clone(),
                    tool_name: p.tool_name.clone(),
                    input: p.input.clone(),
                    requested_at: p.requested_at,
                    age_ms: age.as_millis() as u64,
                    remaining_ms: self.config.timeout.saturating_sub(age).as_millis() as u64,
                }
            })
            .collect()
    }

    pub async fn pending_count(&self, session_id: Option<&str>) -> usize {
        let state = self.state.lock().await;
        match session_id {
            Some(s) => state.pending.keys().filter(|k| k.session_id == s).count(),
            None => state.pending.len(),
        }
    }

    async fn attempt(&self, key: &ApprovalKey, decision: &ApprovalDecision) -> Attempt {
        let mut state = self.state.lock().await;
        match state.pending.remove(key) {
            Some(entry) => {
                state.settled.insert(key.clone());
                if entry.resolver.send(decision.clone()).is_err() {
                    return Attempt::Settled;
                }
                tracing::info!(
                    key = %key,
                    allow = decision.is_allow(),
                    "Approval resolved"
                );
                Attempt::Resolved(ResolvedApproval {
                    key: key.clone(),
                    action: entry.action,
                    decision: decision.clone(),
                })
            }
            None if state.settled.contains(key) => Attempt::Settled,
            None => Attempt::Missing,
        }
    }

    /// Remove the entry if it is still the one registered under
    /// `generation`; false means another path settled it first
    async fn settle(&self, key: &ApprovalKey, generation: u64) -> bool {
        let mut state = self.state.lock().await;
        let ours = state
            .pending
            .get(key)
            .is_some_and(|p| p.generation == generation);
        if ours {
            state.pending.remove(key);
            state.settled.insert(key.clone());
        }
        ours
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::control::StdinCommand;
    use crate::types::SessionOptions;
    use serde_json::json;
    use std::sync::Arc;
    use tokio::sync::mpsc;
    use tokio::task::JoinHandle;

    fn execution(session_id: &str) -> (Arc<ExecutionHandle>, mpsc::Receiver<StdinCommand>) {
        let (tx, rx) = mpsc::channel(8);
        (
            Arc::new(ExecutionHandle::new(
                session_id,
                "/tmp",
                SessionOptions::default(),
                tx,
            )),
            rx,
        )
    }

    fn call(interaction_id: &str, tool_name: &str) -> GatedCall {
        GatedCall {
            interaction_id: interaction_id.to_string(),
            tool_name: tool_name.to_string(),
            input: json!({"plan": "do it"}),
        }
    }

    fn spawn_intercept(
        gate: &Arc<ApprovalGate>,
        execution: &Arc<ExecutionHandle>,
        call: GatedCall,
    ) -> JoinHandle<Result<ApprovalDecision, GateError>> {
        let gate = gate.clone();
        let execution = execution.clone();
        tokio::spawn(async move { gate.intercept(&execution, call).await })
    }

    async fn wait_pending(gate: &ApprovalGate, n: usize) {
        while gate.pending_count(None).await < n {
            tokio::task::yield_now().await;
        }
    }

    // ========================================================================
    // Interception
    // ========================================================================

    #[tokio::test]
    async fn test_non_gated_tool_allowed_immediately() {
        let gate = ApprovalGate::default();
        let (exec, _rx) = execution("s1");

        let decision = gate.intercept(&exec, call("tu1", "Bash")).await.unwrap();
        assert_eq!(decision, ApprovalDecision::allow_with(json!({"plan": "do it"})));
        assert_eq!(gate.pending_count(None).await, 0);
        assert_eq!(exec.tool_counts().await.get("Bash"), Some(&1));
    }

    #[tokio::test]
    async fn test_gated_call_counts_tool_use() {
        let gate = Arc::new(ApprovalGate::default());
        let (exec, _rx) = execution("s1");

        let task = spawn_intercept(&gate, &exec, call("tu1", "AskUserQuestion"));
        wait_pending(&gate, 1).await;
        assert_eq!(exec.tool_counts().await.get("AskUserQuestion"), Some(&1));

        gate.resolve("s1", "tu1", ApprovalDecision::deny("no")).await;
        assert_eq!(task.await.unwrap(), Ok(ApprovalDecision::deny("no")));
    }

    #[tokio::test]
    async fn test_resolve_delivers_decision() {
        let gate = Arc::new(ApprovalGate::default());
        let (exec, _rx) = execution("s1");

        let task = spawn_intercept(&gate, &exec, call("tu1", "ExitPlanMode"));
        wait_pending(&gate, 1).await;

        let resolved = gate
            .resolve("s1", "tu1", ApprovalDecision::allow())
            .await
            .unwrap();
        assert_eq!(resolved.action, GatedAction::ExitPlanMode);
        assert_eq!(resolved.key, ApprovalKey::new("s1", "tu1"));

        assert_eq!(task.await.unwrap(), Ok(ApprovalDecision::allow()));
        assert_eq!(gate.pending_count(None).await, 0);
    }

    #[tokio::test]
    async fn test_duplicate_key_rejected() {
        let gate = Arc::new(ApprovalGate::default());
        let (exec, _rx) = execution("s1");

        let first = spawn_intercept(&gate, &exec, call("tu1", "AskUserQuestion"));
        wait_pending(&gate, 1).await;

        let second = gate.intercept(&exec, call("tu1", "AskUserQuestion")).await;
        assert_eq!(second, Err(GateError::Duplicate("s1:tu1".to_string())));
        assert_eq!(gate.pending_count(None).await, 1);

        // The first request is still the live one
        let answer = ApprovalDecision::allow_with(json!({"answers": {"q": "a"}}));
        assert!(gate.resolve("s1", "tu1", answer.clone()).await.is_some());
        assert_eq!(first.await.unwrap(), Ok(answer));
    }

    #[tokio::test]
    async fn test_concurrent_distinct_keys() {
        let gate = Arc::new(ApprovalGate::default());
        let (exec, _rx) = execution("s1");

        let tasks: Vec<_> = (0..20)
            .map(|i| spawn_intercept(&gate, &exec, call(&format!("tu{i}"), "AskUserQuestion")))
            .collect();
        wait_pending(&gate, 20).await;

        let pending = gate.pending(Some("s1")).await;
        let keys: HashSet<_> = pending.iter().map(|p| p.interaction_id.clone()).collect();
        assert_eq!(keys.len(), 20);

        for i in 0..20 {
            assert!(gate
                .try_resolve("s1", &format!("tu{i}"), ApprovalDecision::allow())
                .await
                .is_some());
        }
        for task in tasks {
            assert!(task.await.unwrap().is_ok());
        }
    }

    // ========================================================================
    // Timeout and abort
    // ========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_timeout_fails_call_and_later_resolve_is_noop() {
        let gate = Arc::new(ApprovalGate::default());
        let (exec, _rx) = execution("s1");

        let task = spawn_intercept(&gate, &exec, call("tu1", "ExitPlanMode"));
        wait_pending(&gate, 1).await;

        tokio::time::advance(Duration::from_secs(301)).await;
        assert_eq!(
            task.await.unwrap(),
            Err(GateError::Timeout {
                key: "s1:tu1".to_string(),
                timeout_secs: 300
            })
        );
        assert_eq!(gate.pending_count(None).await, 0);

        // Settled keys answer immediately instead of waiting out the ceiling
        let start = Instant::now();
        assert!(gate
            .resolve("s1", "tu1", ApprovalDecision::allow())
            .await
            .is_none());
        assert!(start.elapsed() < Duration::from_millis(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_abort_fails_pending_call() {
        let gate = Arc::new(ApprovalGate::default());
        let (exec, _rx) = execution("s1");

        let task = spawn_intercept(&gate, &exec, call("tu1", "AskUserQuestion"));
        wait_pending(&gate, 1).await;

        exec.abort();
        assert_eq!(
            task.await.unwrap(),
            Err(GateError::Aborted("s1:tu1".to_string()))
        );
        assert_eq!(gate.pending_count(Some("s1")).await, 0);
        assert!(gate
            .resolve("s1", "tu1", ApprovalDecision::allow())
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_intercept_after_abort_never_registers() {
        let gate = ApprovalGate::default();
        let (exec, _rx) = execution("s1");
        exec.abort();

        let result = gate.intercept(&exec, call("tu1", "ExitPlanMode")).await;
        assert_eq!(result, Err(GateError::Aborted("s1:tu1".to_string())));
        assert_eq!(gate.pending_count(None).await, 0);
    }

    #[tokio::test]
    async fn test_cancel_key() {
        let gate = Arc::new(ApprovalGate::default());
        let (exec, _rx) = execution("s1");

        let task = spawn_intercept(&gate, &exec, call("tu1", "AskUserQuestion"));
        wait_pending(&gate, 1).await;

        assert!(gate.cancel(&ApprovalKey::new("s1", "tu1")).await);
        assert!(!gate.cancel(&ApprovalKey::new("s1", "tu1")).await);
        assert!(matches!(task.await.unwrap(), Err(GateError::Aborted(_))));
    }

    #[tokio::test]
    async fn test_abort_execution_sweeps_only_its_entries() {
        let gate = Arc::new(ApprovalGate::default());
        let (old, _rx1) = execution("s1");
        let (other, _rx2) = execution("s2");

        let t1 = spawn_intercept(&gate, &old, call("tu1", "AskUserQuestion"));
        let t2 = spawn_intercept(&gate, &other, call("tu2", "AskUserQuestion"));
        wait_pending(&gate, 2).await;

        assert_eq!(gate.abort_execution(&old).await, 1);
        assert!(matches!(t1.await.unwrap(), Err(GateError::Aborted(_))));
        assert_eq!(gate.pending_count(Some("s2")).await, 1);

        gate.try_resolve("s2", "tu2", ApprovalDecision::allow()).await;
        assert!(t2.await.unwrap().is_ok());
    }

    // ========================================================================
    // Resolution retry-wait
    // ========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_resolve_waits_for_late_registration() {
        let gate = Arc::new(ApprovalGate::default());
        let (exec, _rx) = execution("s1");

        let resolver = {
            let gate = gate.clone();
            tokio::spawn(async move {
                gate.resolve("s1", "tu1", ApprovalDecision::allow()).await
            })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        let decision = gate.intercept(&exec, call("tu1", "ExitPlanMode")).await;

        assert_eq!(decision, Ok(ApprovalDecision::allow()));
        let resolved = resolver.await.unwrap().unwrap();
        assert_eq!(resolved.action, GatedAction::ExitPlanMode);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolve_gives_up_after_ceiling() {
        let gate = ApprovalGate::default();

        let start = Instant::now();
        assert!(gate
            .resolve("s1", "missing", ApprovalDecision::allow())
            .await
            .is_none());
        let waited = start.elapsed();
        assert!(waited >= Duration::from_secs(5));
        assert!(waited < Duration::from_secs(6));
    }

    #[tokio::test]
    async fn test_duplicate_resolve_returns_none() {
        let gate = Arc::new(ApprovalGate::default());
        let (exec, _rx) = execution("s1");

        let task = spawn_intercept(&gate, &exec, call("tu1", "AskUserQuestion"));
        wait_pending(&gate, 1).await;

        assert!(gate
            .resolve("s1", "tu1", ApprovalDecision::allow())
            .await
            .is_some());
        assert!(gate
            .resolve("s1", "tu1", ApprovalDecision::deny("late"))
            .await
            .is_none());
        assert_eq!(task.await.unwrap(), Ok(ApprovalDecision::allow()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_summary() {
        let gate = Arc::new(ApprovalGate::default());
        let (exec, _rx) = execution("s1");

        let _task = spawn_intercept(&gate, &exec, call("tu1", "ExitPlanMode"));
        wait_pending(&gate, 1).await;
        tokio::time::advance(Duration::from_secs(60)).await;

        let pending = gate.pending(None).await;
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].tool_name, "ExitPlanMode");
        assert!(pending[0].age_ms >= 60_000);
        assert!(pending[0].remaining_ms <= 240_000);

        let json = serde_json::to_value(&pending[0]).unwrap();
        assert_eq!(json["interactionId"], "tu1");
        assert_eq!(json["input"]["plan"], "do it");
        assert!(gate.pending(Some("other")).await.is_empty());
    }

    #[test]
    fn test_settled_keys_bounded() {
        let mut settled = SettledKeys::new(2);
        settled.insert(ApprovalKey::new("s", "a"));
        settled.insert(ApprovalKey::new("s", "b"));
        settled.insert(ApprovalKey::new("s", "c"));
        assert!(!settled.contains(&ApprovalKey::new("s", "a")));
        assert!(settled.contains(&ApprovalKey::new("s", "b")));
        assert!(settled.contains(&ApprovalKey::new("s", "c")));

        settled.remove(&ApprovalKey::new("s", "b"));
        assert!(!settled.contains(&ApprovalKey::new("s", "b")));
    }
}
