use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::dirs;
use crate::error::{BridgeError, Result};
use crate::gate::GateConfig;

/// User-configurable settings for the bridge server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Host address for the HTTP server (default: 127.0.0.1)
    #[serde(default = "default_host")]
    pub host: String,

    /// Port for the HTTP server (default: 4317)
    #[serde(default = "default_port")]
    pub port: u16,

    /// JSON file mapping project ids to working directories
    #[serde(default = "dirs::projects_path")]
    pub projects_file: PathBuf,

    #[serde(default)]
    pub runtime: RuntimeConfig,

    #[serde(default)]
    pub approval: ApprovalConfig,

    #[serde(default)]
    pub stream: StreamConfig,
}

/// How the agent runtime process is launched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Agent CLI executable (default: claude)
    #[serde(default = "default_executable")]
    pub executable: String,

    /// Extra arguments appended to every launch
    #[serde(default)]
    pub extra_args: Vec<String>,

    /// Extra environment variables for the runtime process
    #[serde(default)]
    pub env: HashMap<String, String>,
}

/// Approval gate timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalConfig {
    /// Seconds a gated call waits for a human decision (default: 300)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Poll interval while a resolution waits for registration (default: 200)
    #[serde(default = "default_resolve_poll_ms")]
    pub resolve_poll_ms: u64,

    /// Ceiling on that wait (default: 5000)
    #[serde(default = "default_resolve_wait_ms")]
    pub resolve_wait_ms: u64,

    /// Recently settled approvals remembered for fast duplicate detection
    #[serde(default = "default_settled_capacity")]
    pub settled_capacity: usize,
}

/// Stream relay limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Buffered events per client stream (default: 256)
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    /// Runtime stderr lines kept for failure reports (default: 20)
    #[serde(default = "default_stderr_tail_lines")]
    pub stderr_tail_lines: usize,

    /// How long to wait for the runtime to exit after its stdout closes
    /// before killing it (default: 2000)
    #[serde(default = "default_kill_grace_ms")]
    pub kill_grace_ms: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    4317
}

fn default_executable() -> String {
    "claude".to_string()
}

fn default_timeout_secs() -> u64 {
    300
}

fn default_resolve_poll_ms() -> u64 {
    200
}

fn default_resolve_wait_ms() -> u64 {
    5000
}

fn default_settled_capacity() -> usize {
    1024
}

fn default_channel_capacity() -> usize {
    256
}

fn default_stderr_tail_lines() -> usize {
    20
}

fn default_kill_grace_ms() -> u64 {
    2000
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            projects_file: dirs::projects_path(),
            runtime: RuntimeConfig::default(),
            approval: ApprovalConfig::default(),
            stream: StreamConfig::default(),
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            executable: default_executable(),
            extra_args: Vec::new(),
            env: HashMap::new(),
        }
    }
}

impl Default for ApprovalConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            resolve_poll_ms: default_resolve_poll_ms(),
            resolve_wait_ms: default_resolve_wait_ms(),
            settled_capacity: default_settled_capacity(),
        }
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
            stderr_tail_lines: default_stderr_tail_lines(),
            kill_grace_ms: default_kill_grace_ms(),
        }
    }
}

impl From<&ApprovalConfig> for GateConfig {
    fn from(config: &ApprovalConfig) -> Self {
        GateConfig {
            timeout: Duration::from_secs(config.timeout_secs),
            resolve_poll: Duration::from_millis(config.resolve_poll_ms),
            resolve_wait: Duration::from_millis(config.resolve_wait_ms),
            settled_capacity: config.settled_capacity,
        }
    }
}

impl StreamConfig {
    pub fn kill_grace(&self) -> Duration {
        Duration::from_millis(self.kill_grace_ms)
    }
}

impl BridgeConfig {
    /// Load configuration from the default config file path.
    /// Returns default config if the file does not exist.
    pub fn load() -> Result<Self> {
        let path = dirs::config_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit file, which must exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            BridgeError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        let config: BridgeConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save the current configuration to the default config file path.
    pub fn save(&self) -> Result<()> {
        self.save_to(&dirs::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the server bind address string (e.g., "127.0.0.1:4317").
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn validate(&self) -> Result<()> {
        if self.runtime.executable.trim().is_empty() {
            return Err(BridgeError::Config(
                "runtime.executable must not be empty".to_string(),
            ));
        }
        if self.stream.channel_capacity == 0 {
            return Err(BridgeError::Config(
                "stream.channel_capacity must be at least 1".to_string(),
            ));
        }
        if self.approval.resolve_poll_ms == 0 {
            return Err(BridgeError::Config(
                "approval.resolve_poll_ms must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
