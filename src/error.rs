//! Error types for a3s-bridge

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Errors surfaced by the bridge before or outside of an event stream
///
/// Once a stream has started, runtime failures are never returned as
/// `BridgeError`; they are folded into an `error` stream event instead.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The request did not name a project
    #[error("Missing project id")]
    MissingProject,

    /// The project id could not be resolved to a working directory
    #[error("Unknown project '{project_id}': {reason}")]
    UnknownProject { project_id: String, reason: String },

    /// Malformed or incomplete request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// No live execution for the session id
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// The agent runtime could not be started
    #[error("Failed to launch agent runtime: {0}")]
    Launch(String),

    /// Filesystem or pipe failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// HTTP server failure
    #[error("Server error: {0}")]
    Server(String),
}

/// Result type alias for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

impl BridgeError {
    /// HTTP status used when this error reaches the API boundary
    pub fn status(&self) -> StatusCode {
        match self {
            BridgeError::MissingProject
            | BridgeError::UnknownProject { .. }
            | BridgeError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            BridgeError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            BridgeError::Launch(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the error was caused by the caller's input
    pub fn is_input_error(&self) -> bool {
        self.status() == StatusCode::BAD_REQUEST
    }
}

impl IntoResponse for BridgeError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(error = %self, "Request failed");
        }
        let body = serde_json::json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}
