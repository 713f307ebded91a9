//! Agent CLI runtime
//!
//! Spawns the agent CLI with stream-json input and output so that the
//! bridge can relay its stdout line by line and answer its permission
//! requests over stdin.

use super::{AgentRuntime, ExitStatus, LaunchSpec, ProcessControl, RuntimeProcess};
use crate::config::RuntimeConfig;
use crate::error::{BridgeError, Result};
use async_trait::async_trait;
use std::io;
use std::process::Stdio;
use tokio::process::{Child, Command};

/// Environment variable carrying the extended-thinking budget
const THINKING_TOKENS_ENV: &str = "MAX_THINKING_TOKENS";

/// Runtime that launches the agent CLI as a child process
pub struct ClaudeCliRuntime {
    config: RuntimeConfig,
}

impl ClaudeCliRuntime {
    pub fn new(config: RuntimeConfig) -> Self {
        Self { config }
    }

    /// Command-line arguments for one execution
    pub fn build_args(&self, spec: &LaunchSpec) -> Vec<String> {
        let mut args = vec![
            "--output-format".to_string(),
            "stream-json".to_string(),
            "--input-format".to_string(),
            "stream-json".to_string(),
            "--verbose".to_string(),
            "--permission-prompt-tool".to_string(),
            "stdio".to_string(),
            "--permission-mode".to_string(),
            spec.permission_mode.as_str().to_string(),
            "--model".to_string(),
            spec.options.model.as_str().to_string(),
        ];

        if spec.resume {
            args.push("--resume".to_string());
        } else {
            args.push("--session-id".to_string());
        }
        args.push(spec.session_id.clone());

        args.extend(self.config.extra_args.iter().cloned());
        args
    }
}

#[async_trait]
impl AgentRuntime for ClaudeCliRuntime {
    async fn launch(&self, spec: &LaunchSpec) -> Result<RuntimeProcess> {
        let args = self.build_args(spec);
        tracing::debug!(
            executable = %self.config.executable,
            args = ?args,
            cwd = %spec.cwd.display(),
            "Spawning agent runtime"
        );

        let mut cmd = Command::new(&self.config.executable);
        cmd.args(&args)
            .current_dir(&spec.cwd)
            .envs(&self.config.env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(tokens) = spec.options.effort.thinking_tokens() {
            cmd.env(THINKING_TOKENS_ENV, tokens.to_string());
        }

        let mut child = cmd
            .spawn()
            .map_err(|e| BridgeError::Launch(format!("{}: {}", self.config.executable, e)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| BridgeError::Launch("runtime stdout unavailable".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| BridgeError::Launch("runtime stderr unavailable".to_string()))?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| BridgeError::Launch("runtime stdin unavailable".to_string()))?;

        tracing::info!(
            session_id = %spec.session_id,
            pid = child.id().unwrap_or(0),
            resume = spec.resume,
            "Agent runtime started"
        );

        Ok(RuntimeProcess {
            stdout: Box::new(stdout),
            stderr: Box::new(stderr),
            stdin: Box::new(stdin),
            control: Box::new(ChildControl { child }),
        })
    }

    fn name(&self) -> &str {
        "claude-cli"
    }
}

/// `ProcessControl` over a tokio child process
struct ChildControl {
    child: Child,
}

#[async_trait]
impl ProcessControl for ChildControl {
    async fn wait(&mut self) -> io::Result<ExitStatus> {
        self.child.wait().await.map(ExitStatus::from)
    }

    async fn kill(&mut self) -> io::Result<()> {
        self.child.kill().await
    }

    fn id(&self) -> Option<u32> {
        self.child.id()
    }
}
