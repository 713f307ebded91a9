use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde_json::{json, Value};

use super::types::{ApprovalRequest, ApprovalResponse, PendingQuery};
use crate::error::BridgeError;
use crate::gate::ApprovalGate;
use crate::registry::SessionRegistry;
use crate::server::state::AppState;
use crate::types::ApprovalDecision;

/// Resolve a pending approval on behalf of a human.
///
/// Waits briefly for the request to be registered when the client is ahead
/// of the runtime. Returns false for unknown, expired, or already resolved
/// keys. An approved plan checkpoint also escalates the live execution's
/// permission mode in the background.
pub async fn resolve_approval(
    gate: &ApprovalGate,
    registry: &Arc<SessionRegistry>,
    session_id: &str,
    interaction_id: &str,
    decision: ApprovalDecision,
) -> bool {
    let Some(resolved) = gate.resolve(session_id, interaction_id, decision).await else {
        return false;
    };

    if resolved.action.is_plan_checkpoint() && resolved.decision.is_allow() {
        let registry = registry.clone();
        let session_id = session_id.to_string();
        tokio::spawn(async move {
            escalate_permission_mode(&registry, &session_id).await;
        });
    }
    true
}

async fn escalate_permission_mode(registry: &SessionRegistry, session_id: &str) {
    let Some(handle) = registry.lookup(session_id).await else {
        tracing::info!(
            session_id = %session_id,
            "No live execution after plan approval, skipping permission escalation"
        );
        return;
    };

    let target = handle.permission_mode().await.escalated();
    if let Err(e) = handle.set_permission_mode(target).await {
        tracing::warn!(
            session_id = %session_id,
            error = %e,
            "Permission escalation failed"
        );
    }
}

/// POST /api/agent/approvals - Resolve a pending approval.
pub async fn resolve_handler(
    State(state): State<AppState>,
    Json(request): Json<ApprovalRequest>,
) -> Result<Json<ApprovalResponse>, BridgeError> {
    request.validate()?;
    let resolved = resolve_approval(
        &state.gate,
        &state.registry,
        &request.session_id,
        &request.interaction_id,
        request.decision,
    )
    .await;
    Ok(Json(ApprovalResponse { resolved }))
}

/// GET /api/agent/approvals - List pending approvals, optionally per session.
pub async fn list_handler(
    State(state): State<AppState>,
    Query(query): Query<PendingQuery>,
) -> Json<Value> {
    let approvals = state.gate.pending(query.session_id.as_deref()).await;
    Json(json!({ "approvals": approvals }))
}
