use std::sync::Arc;

use crate::bridge::StreamingBridge;
use crate::config::BridgeConfig;
use crate::gate::ApprovalGate;
use crate::registry::SessionRegistry;

/// Shared application state accessible to all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub bridge: Arc<StreamingBridge>,
    pub registry: Arc<SessionRegistry>,
    pub gate: Arc<ApprovalGate>,
    pub config: Arc<BridgeConfig>,
}

impl AppState {
    /// Build state around a bridge, sharing its registry and gate.
    pub fn new(bridge: Arc<StreamingBridge>, config: Arc<BridgeConfig>) -> Self {
        Self {
            registry: bridge.registry().clone(),
            gate: bridge.gate().clone(),
            bridge,
            config,
        }
    }
}
