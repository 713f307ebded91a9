use axum::extract::State;
use axum::response::Response;
use axum::Json;

use super::ndjson::ndjson_response;
use super::types::ChatRequest;
use crate::error::BridgeError;
use crate::server::state::AppState;

/// POST /api/agent/chat - Run a prompt and stream the execution as NDJSON.
///
/// Input errors are rejected with a JSON error body before any session is
/// created; every later failure arrives as an `error` event in the stream.
pub async fn handler(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Response, BridgeError> {
    let stream = state.bridge.start(request.into()).await?;
    Ok(ndjson_response(stream))
}
