//! Scripted in-memory runtime for testing and demos
//!
//! Each launch consumes one queued [`Script`] and plays it against
//! in-memory pipes: stdout bytes, stderr lines, pauses, waits for the
//! bridge's control responses, and an exit status. A [`ScriptProbe`]
//! returned when the script is queued exposes what the bridge wrote to
//! stdin and whether the process was killed.

use super::{AgentRuntime, ExitStatus, LaunchSpec, ProcessControl, RuntimeProcess};
use crate::error::{BridgeError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream};
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio_util::sync::CancellationToken;

const PIPE_CAPACITY: usize = 64 * 1024;

/// One step of a scripted runtime process
#[derive(Debug, Clone)]
pub enum ScriptStep {
    /// Raw stdout bytes, written as-is (may hold partial lines)
    Stdout(Vec<u8>),
    /// One JSON object followed by a newline on stdout
    Line(Value),
    /// One stderr line
    Stderr(String),
    Sleep(Duration),
    /// Block until a stdin message containing this JSON pattern arrives
    AwaitStdin(Value),
    /// Exit with the given code (`None` = killed by a signal)
    Exit(Option<i32>),
    /// Never exit on its own
    Hang,
}

/// Ordered steps played by one scripted process
#[derive(Debug, Clone, Default)]
pub struct Script {
    steps: Vec<ScriptStep>,
}

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(mut self, value: Value) -> Self {
        self.steps.push(ScriptStep::Line(value));
        self
    }

    pub fn stdout(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.steps.push(ScriptStep::Stdout(bytes.into()));
        self
    }

    pub fn stderr(mut self, line: impl Into<String>) -> Self {
        self.steps.push(ScriptStep::Stderr(line.into()));
        self
    }

    pub fn sleep(mut self, duration: Duration) -> Self {
        self.steps.push(ScriptStep::Sleep(duration));
        self
    }

    /// Wait for the bridge's `control_response` to `request_id`
    pub fn await_response(self, request_id: impl Into<String>) -> Self {
        self.await_stdin(serde_json::json!({
            "type": "control_response",
            "response": { "request_id": request_id.into() },
        }))
    }

    /// Wait for any stdin message that contains `pattern`
    pub fn await_stdin(mut self, pattern: Value) -> Self {
        self.steps.push(ScriptStep::AwaitStdin(pattern));
        self
    }

    pub fn exit(mut self, code: Option<i32>) -> Self {
        self.steps.push(ScriptStep::Exit(code));
        self
    }

    pub fn hang(mut self) -> Self {
        self.steps.push(ScriptStep::Hang);
        self
    }
}

/// Observation handle for one queued script
#[derive(Clone, Default)]
pub struct ScriptProbe {
    stdin: Arc<Mutex<Vec<Value>>>,
    killed: Arc<AtomicBool>,
}

impl ScriptProbe {
    /// JSON messages the bridge wrote to the process's stdin so far
    pub async fn stdin_messages(&self) -> Vec<Value> {
        self.stdin.lock().await.clone()
    }

    /// Whether the bridge killed the process before it exited on its own
    pub fn was_killed(&self) -> bool {
        self.killed.load(Ordering::SeqCst)
    }
}

/// Runtime that plays queued scripts instead of spawning a real agent
#[derive(Default)]
pub struct ScriptedRuntime {
    scripts: Mutex<VecDeque<(Script, ScriptProbe)>>,
    launches: Mutex<Vec<LaunchSpec>>,
}

impl ScriptedRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a script for the next launch
    pub async fn push(&self, script: Script) -> ScriptProbe {
        let probe = ScriptProbe::default();
        self.scripts
            .lock()
            .await
            .push_back((script, probe.clone()));
        probe
    }

    /// Every launch request seen so far, in order
    pub async fn launches(&self) -> Vec<LaunchSpec> {
        self.launches.lock().await.clone()
    }
}

#[async_trait]
impl AgentRuntime for ScriptedRuntime {
    async fn launch(&self, spec: &LaunchSpec) -> Result<RuntimeProcess> {
        let (script, probe) = self
            .scripts
            .lock()
            .await
            .pop_front()
            .ok_or_else(|| BridgeError::Launch("no script queued".to_string()))?;
        self.launches.lock().await.push(spec.clone());

        let (stdout_read, stdout_write) = tokio::io::duplex(PIPE_CAPACITY);
        let (stderr_read, stderr_write) = tokio::io::duplex(PIPE_CAPACITY);
        let (stdin_write, stdin_read) = tokio::io::duplex(PIPE_CAPACITY);

        let (responses_tx, responses_rx) = mpsc::unbounded_channel::<Value>();
        let stdin_log = probe.stdin.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdin_read).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if let Ok(value) = serde_json::from_str::<Value>(&line) {
                    stdin_log.lock().await.push(value.clone());
                    let _ = responses_tx.send(value);
                }
            }
        });

        let kill = CancellationToken::new();
        let (exit_tx, exit_rx) = oneshot::channel();
        let token = kill.clone();
        tokio::spawn(async move {
            let mut stdout = stdout_write;
            let mut stderr = stderr_write;
            let mut responses = responses_rx;
            let status = tokio::select! {
                status = play(script.steps, &mut stdout, &mut stderr, &mut responses) => status,
                _ = token.cancelled() => ExitStatus::signaled(),
            };
            drop(stdout);
            drop(stderr);
            let _ = exit_tx.send(status);
        });

        Ok(RuntimeProcess {
            stdout: Box::new(stdout_read),
            stderr: Box::new(stderr_read),
            stdin: Box::new(stdin_write),
            control: Box::new(ScriptedControl {
                exit_rx: Some(exit_rx),
                status: None,
                kill,
                killed: probe.killed.clone(),
            }),
        })
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

async fn play(
    steps: Vec<ScriptStep>,
    stdout: &mut DuplexStream,
    stderr: &mut DuplexStream,
    responses: &mut mpsc::UnboundedReceiver<Value>,
) -> ExitStatus {
    for step in steps {
        match step {
            ScriptStep::Stdout(bytes) => {
                if stdout.write_all(&bytes).await.is_err() {
                    return ExitStatus::code(1);
                }
                let _ = stdout.flush().await;
            }
            ScriptStep::Line(value) => {
                let mut line = value.to_string().into_bytes();
                line.push(b'\n');
                if stdout.write_all(&line).await.is_err() {
                    return ExitStatus::code(1);
                }
                let _ = stdout.flush().await;
            }
            ScriptStep::Stderr(line) => {
                let _ = stderr.write_all(format!("{line}\n").as_bytes()).await;
                let _ = stderr.flush().await;
            }
            ScriptStep::Sleep(duration) => tokio::time::sleep(duration).await,
            ScriptStep::AwaitStdin(pattern) => loop {
                match responses.recv().await {
                    Some(value) if contains(&value, &pattern) => break,
                    Some(_) => continue,
                    // stdin closed before the answer arrived
                    None => return ExitStatus::code(1),
                }
            },
            ScriptStep::Exit(code) => return ExitStatus { code },
            ScriptStep::Hang => std::future::pending::<()>().await,
        }
    }
    ExitStatus::success()
}

/// Whether every field of `pattern` is present in `value` with an equal
/// value, recursing into objects
fn contains(value: &Value, pattern: &Value) -> bool {
    match (value, pattern) {
        (Value::Object(value), Value::Object(pattern)) => pattern
            .iter()
            .all(|(k, p)| value.get(k).is_some_and(|v| contains(v, p))),
        _ => value == pattern,
    }
}

struct ScriptedControl {
    exit_rx: Option<oneshot::Receiver<ExitStatus>>,
    status: Option<ExitStatus>,
    kill: CancellationToken,
    killed: Arc<AtomicBool>,
}

#[async_trait]
impl ProcessControl for ScriptedControl {
    async fn wait(&mut self) -> io::Result<ExitStatus> {
        if let Some(status) = self.status {
            return Ok(status);
        }
        let status = match self.exit_rx.take() {
            Some(rx) => rx.await.unwrap_or_else(|_| ExitStatus::signaled()),
            None => ExitStatus::signaled(),
        };
        self.status = Some(status);
        Ok(status)
    }

    async fn kill(&mut self) -> io::Result<()> {
        if self.status.is_none() {
            if let Some(rx) = self.exit_rx.as_mut() {
                if let Ok(status) = rx.try_recv() {
                    self.status = Some(status);
                    self.exit_rx = None;
                    return Ok(());
                }
            }
            self.killed.store(true, Ordering::SeqCst);
            self.kill.cancel();
        }
        self.wait().await.map(|_| ())
    }
}
