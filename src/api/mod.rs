pub mod approvals;
pub mod chat;
pub mod ndjson;
pub mod sessions;
pub mod types;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::server::state::AppState;
use types::HealthResponse;

/// Build the agent API routes (mounted under `/api/agent`).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/chat", post(chat::handler))
        .route(
            "/approvals",
            post(approvals::resolve_handler).get(approvals::list_handler),
        )
        .route("/sessions", get(sessions::list_handler))
        .route("/sessions/:id", get(sessions::get_handler))
        .route("/sessions/:id/abort", post(sessions::abort_handler))
}

/// GET /health - Liveness with live-session and pending-approval counts.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        sessions: state.registry.len().await,
        pending_approvals: state.gate.pending_count(None).await,
    })
}
