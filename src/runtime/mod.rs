//! Agent runtime abstraction
//!
//! The agent's reasoning engine is an opaque external process. Everything
//! the bridge needs from it is captured by `AgentRuntime`: launch a process
//! for one execution and hand back its raw pipes plus a control handle.
//! Swap the real CLI for the scripted runtime in tests without changing the
//! bridge.

use crate::error::Result;
use crate::types::{PermissionMode, SessionOptions};
use async_trait::async_trait;
use std::io;
use std::path::PathBuf;
use tokio::io::{AsyncRead, AsyncWrite};

pub mod control;
pub mod process;
pub mod scripted;

pub type BoxedReader = Box<dyn AsyncRead + Send + Unpin>;
pub type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Everything needed to launch one execution
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchSpec {
    pub session_id: String,
    /// Continue the session's prior conversation instead of starting fresh
    pub resume: bool,
    pub cwd: PathBuf,
    pub options: SessionOptions,
    pub permission_mode: PermissionMode,
}

/// How a runtime process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitStatus {
    /// Exit code, `None` when the process was terminated by a signal
    pub code: Option<i32>,
}

impl ExitStatus {
    pub fn success() -> Self {
        Self { code: Some(0) }
    }

    pub fn code(code: i32) -> Self {
        Self { code: Some(code) }
    }

    pub fn signaled() -> Self {
        Self { code: None }
    }

    /// A non-null, non-zero exit code
    pub fn is_failure(&self) -> bool {
        matches!(self.code, Some(code) if code != 0)
    }
}

impl From<std::process::ExitStatus> for ExitStatus {
    fn from(status: std::process::ExitStatus) -> Self {
        Self {
            code: status.code(),
        }
    }
}

/// Lifecycle control over a launched runtime process
#[async_trait]
pub trait ProcessControl: Send {
    /// Wait for the process to exit
    async fn wait(&mut self) -> io::Result<ExitStatus>;

    /// Terminate the process and reap it
    async fn kill(&mut self) -> io::Result<()>;

    /// OS process id, when there is one
    fn id(&self) -> Option<u32> {
        None
    }
}

/// A launched runtime process with its raw pipes
pub struct RuntimeProcess {
    pub stdout: BoxedReader,
    pub stderr: BoxedReader,
    pub stdin: BoxedWriter,
    pub control: Box<dyn ProcessControl>,
}

/// Launches agent runtime processes
#[async_trait]
pub trait AgentRuntime: Send + Sync {
    /// Start a process for one execution
    async fn launch(&self, spec: &LaunchSpec) -> Result<RuntimeProcess>;

    /// Runtime name (e.g., "claude-cli", "scripted")
    fn name(&self) -> &str;
}
