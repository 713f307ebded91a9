use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Value};

use super::types::AbortResponse;
use crate::error::BridgeError;
use crate::registry::SessionSummary;
use crate::server::state::AppState;

/// GET /api/agent/sessions - List live executions.
pub async fn list_handler(State(state): State<AppState>) -> Json<Value> {
    let mut sessions = Vec::new();
    for handle in state.registry.list().await {
        let pending = state.gate.pending_count(Some(handle.session_id())).await;
        sessions.push(handle.summary(pending).await);
    }
    Json(json!({ "sessions": sessions }))
}

/// GET /api/agent/sessions/:id - Show one live execution.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionSummary>, BridgeError> {
    let handle = state
        .registry
        .lookup(&session_id)
        .await
        .ok_or_else(|| BridgeError::SessionNotFound(session_id.clone()))?;
    let pending = state.gate.pending_count(Some(&session_id)).await;
    Ok(Json(handle.summary(pending).await))
}

/// POST /api/agent/sessions/:id/abort - Abort a live execution.
///
/// Cascades like a client disconnect: the runtime is killed, pending
/// approvals fail, and the execution is unregistered.
pub async fn abort_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Json<AbortResponse> {
    let aborted = match state.registry.lookup(&session_id).await {
        Some(handle) => {
            tracing::info!(session_id = %session_id, "Abort requested");
            handle.abort();
            true
        }
        None => false,
    };
    Json(AbortResponse { aborted })
}
