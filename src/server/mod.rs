pub mod router;
pub mod state;

use std::sync::Arc;

use crate::bridge::StreamingBridge;
use crate::config::BridgeConfig;
use crate::error::{BridgeError, Result};
use crate::gate::{ApprovalGate, GateConfig};
use crate::projects::JsonProjectStore;
use crate::registry::SessionRegistry;
use crate::runtime::process::ClaudeCliRuntime;

/// Wire the production bridge: agent CLI runtime and JSON project store.
pub fn build_bridge(config: &BridgeConfig) -> StreamingBridge {
    StreamingBridge::new(
        Arc::new(ClaudeCliRuntime::new(config.runtime.clone())),
        Arc::new(SessionRegistry::new()),
        Arc::new(ApprovalGate::new(GateConfig::from(&config.approval))),
        Arc::new(JsonProjectStore::new(&config.projects_file)),
        config.stream.clone(),
    )
}

/// Start the HTTP server with the given configuration.
pub async fn start(config: BridgeConfig) -> Result<()> {
    let bridge = Arc::new(build_bridge(&config));
    tracing::info!(
        runtime = %config.runtime.executable,
        projects_file = %config.projects_file.display(),
        approval_timeout_secs = config.approval.timeout_secs,
        "Initialized bridge"
    );

    let bind_addr = config.bind_address();
    let app_state = state::AppState::new(bridge, Arc::new(config));
    let app = router::build(app_state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| BridgeError::Server(format!("Failed to bind to {bind_addr}: {e}")))?;

    tracing::info!("Server listening on {bind_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| BridgeError::Server(format!("Server error: {e}")))?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
