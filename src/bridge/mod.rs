//! Streaming bridge
//!
//! Drives one execution of the agent runtime and relays its output to one
//! client as a stream of [`StreamEvent`]s:
//!
//! 1. `start` validates the request, registers a fresh [`ExecutionHandle`]
//!    and queues the `session` event before anything else happens.
//! 2. A driver task launches the runtime, writes the prompt to its stdin,
//!    and relays complete stdout lines in order. Permission requests are
//!    answered through the [`ApprovalGate`] without blocking the relay.
//! 3. When stdout closes, the driver waits for the exit status, classifies
//!    the run (see [`terminal::classify`]), and ends the stream with `done`.
//!
//! A client disconnect or an explicit abort kills the runtime, fails any
//! pending approval of the execution, and unregisters the handle.

pub mod lines;
pub mod terminal;

use crate::config::StreamConfig;
use crate::error::{BridgeError, Result};
use crate::event::{ErrorKind, RuntimeMessage, StreamEvent};
use crate::gate::{ApprovalGate, ApprovalKey, GateError, GatedCall};
use crate::projects::ProjectResolver;
use crate::registry::{ExecutionHandle, SessionRegistry};
use crate::runtime::control::{ControlRequest, ControlRequestBody, OutboundMessage, StdinCommand};
use crate::runtime::{
    AgentRuntime, BoxedReader, BoxedWriter, ExitStatus, LaunchSpec, ProcessControl,
    RuntimeProcess,
};
use crate::types::{ApprovalDecision, SessionOptions};
use lines::LineBuffer;
use std::collections::HashMap;
use std::sync::Arc;
use terminal::{DiagnosticTail, OutputTracker};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_stream::wrappers::ReceiverStream;

/// Stdout read size
const READ_CHUNK: usize = 8 * 1024;

/// Queued stdin messages per execution
const STDIN_QUEUE: usize = 64;

/// Client-facing event stream of one execution
pub type EventStream = ReceiverStream<StreamEvent>;

/// One chat message to run
#[derive(Debug, Clone, Default)]
pub struct StartRequest {
    pub project_id: Option<String>,
    pub prompt: String,
    /// Continue this session instead of starting a new one
    pub session_id: Option<String>,
    pub options: SessionOptions,
}

pub struct StreamingBridge {
    runtime: Arc<dyn AgentRuntime>,
    registry: Arc<SessionRegistry>,
    gate: Arc<ApprovalGate>,
    projects: Arc<dyn ProjectResolver>,
    config: StreamConfig,
}

impl StreamingBridge {
    pub fn new(
        runtime: Arc<dyn AgentRuntime>,
        registry: Arc<SessionRegistry>,
        gate: Arc<ApprovalGate>,
        projects: Arc<dyn ProjectResolver>,
        config: StreamConfig,
    ) -> Self {
        Self {
            runtime,
            registry,
            gate,
            projects,
            config,
        }
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    pub fn gate(&self) -> &Arc<ApprovalGate> {
        &self.gate
    }

    /// Start (or resume) an execution and return its event stream
    ///
    /// Input errors are returned before any session is created. Everything
    /// that goes wrong after this returns is reported inside the stream.
    pub async fn start(&self, request: StartRequest) -> Result<EventStream> {
        let project_id = request
            .project_id
            .filter(|id| !id.trim().is_empty())
            .ok_or(BridgeError::MissingProject)?;
        if request.prompt.trim().is_empty() {
            return Err(BridgeError::InvalidRequest(
                "prompt must not be empty".to_string(),
            ));
        }
        let cwd = self.projects.resolve(&project_id).await?;

        let requested = request.session_id.filter(|id| !id.trim().is_empty());
        let resumed = requested.is_some();
        let session_id = requested.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        let (events_tx, events_rx) = mpsc::channel(self.config.channel_capacity.max(1));
        let (stdin_tx, stdin_rx) = mpsc::channel(STDIN_QUEUE);
        let handle = Arc::new(ExecutionHandle::new(
            &session_id,
            cwd.clone(),
            request.options,
            stdin_tx,
        ));

        if let Some(displaced) = self.registry.register(handle.clone()).await {
            tracing::info!(
                session_id = %session_id,
                execution_id = %displaced.execution_id(),
                "Aborting displaced execution"
            );
            displaced.abort();
        }

        // Nothing else has been queued yet, so this cannot wait
        let _ = events_tx
            .send(StreamEvent::Session {
                session_id: session_id.clone(),
                resumed,
            })
            .await;

        tracing::info!(
            session_id = %session_id,
            execution_id = %handle.execution_id(),
            project_id = %project_id,
            mode = request.options.mode.as_str(),
            resumed,
            "Execution starting"
        );

        let spec = LaunchSpec {
            session_id,
            resume: resumed,
            cwd,
            options: request.options,
            permission_mode: handle.permission_mode().await,
        };
        let driver = Driver {
            runtime: self.runtime.clone(),
            registry: self.registry.clone(),
            gate: self.gate.clone(),
            config: self.config.clone(),
            handle,
            events: events_tx,
        };
        tokio::spawn(driver.run(spec, request.prompt, stdin_rx));

        Ok(ReceiverStream::new(events_rx))
    }
}

/// Why the relay loop stopped
enum Exit {
    /// Runtime stdout closed
    Eof,
    /// The client dropped the stream
    Disconnected,
    /// The execution was aborted
    Aborted,
    ApprovalTimeout(String),
}

/// How the stream ends
enum Ending {
    /// Close with an optional error event, then `done`
    Finished(Option<StreamEvent>),
    Aborted,
    Disconnected,
}

/// Per-execution relay state
struct Relay {
    lines: LineBuffer,
    tracker: OutputTracker,
    /// Interception tasks, each yielding its control request id
    approvals: JoinSet<String>,
    failures_tx: mpsc::UnboundedSender<GateError>,
    failures_rx: mpsc::UnboundedReceiver<GateError>,
    /// Control request id → approval key while the interception runs, for
    /// `control_cancel_request`
    requests: HashMap<String, ApprovalKey>,
}

struct Driver {
    runtime: Arc<dyn AgentRuntime>,
    registry: Arc<SessionRegistry>,
    gate: Arc<ApprovalGate>,
    config: StreamConfig,
    handle: Arc<ExecutionHandle>,
    events: mpsc::Sender<StreamEvent>,
}

impl Driver {
    async fn run(self, spec: LaunchSpec, prompt: String, stdin_rx: mpsc::Receiver<StdinCommand>) {
        let ending = self.drive(&spec, prompt, stdin_rx).await;

        self.handle.abort();
        self.gate.abort_execution(&self.handle).await;
        self.registry.release(&self.handle).await;

        let outcome = match ending {
            Ending::Finished(error) => {
                let outcome = match &error {
                    Some(StreamEvent::Error { kind, .. }) => kind.as_str(),
                    _ => "completed",
                };
                if let Some(event) = error {
                    self.send_final(event).await;
                }
                self.send_final(StreamEvent::Done).await;
                outcome
            }
            Ending::Aborted => {
                self.send_final(StreamEvent::Done).await;
                "aborted"
            }
            Ending::Disconnected => "disconnected",
        };

        tracing::info!(
            session_id = %spec.session_id,
            execution_id = %self.handle.execution_id(),
            outcome,
            "Execution finished"
        );
    }

    async fn drive(
        &self,
        spec: &LaunchSpec,
        prompt: String,
        stdin_rx: mpsc::Receiver<StdinCommand>,
    ) -> Ending {
        let process = match self.runtime.launch(spec).await {
            Ok(process) => process,
            Err(e) => {
                tracing::warn!(
                    session_id = %spec.session_id,
                    runtime = self.runtime.name(),
                    error = %e,
                    "Agent runtime launch failed"
                );
                return Ending::Finished(Some(StreamEvent::error(
                    ErrorKind::LaunchFailed,
                    e.to_string(),
                )));
            }
        };
        let RuntimeProcess {
            mut stdout,
            stderr,
            stdin,
            mut control,
        } = process;

        let stdin_task = tokio::spawn(write_stdin(stdin, stdin_rx, spec.session_id.clone()));
        let mut stderr_task = tokio::spawn(collect_stderr(
            stderr,
            self.config.stderr_tail_lines,
            spec.session_id.clone(),
        ));
        let _ = self.handle.send(OutboundMessage::UserPrompt(prompt)).await;

        let (failures_tx, failures_rx) = mpsc::unbounded_channel();
        let mut relay = Relay {
            lines: LineBuffer::new(),
            tracker: OutputTracker::new(),
            approvals: JoinSet::new(),
            failures_tx,
            failures_rx,
            requests: HashMap::new(),
        };
        let mut buf = vec![0u8; READ_CHUNK];

        let exit = loop {
            tokio::select! {
                biased;
                _ = self.events.closed() => break Exit::Disconnected,
                _ = self.handle.cancelled() => break Exit::Aborted,
                Some(message) = next_timeout(&mut relay.failures_rx) => {
                    break Exit::ApprovalTimeout(message);
                }
                Some(Ok(request_id)) = relay.approvals.join_next() => {
                    relay.requests.remove(&request_id);
                }
                read = stdout.read(&mut buf) => match read {
                    Ok(0) => break Exit::Eof,
                    Ok(n) => {
                        let mut stopped = None;
                        for line in relay.lines.push(&buf[..n]) {
                            if let Err(exit) = self.handle_line(&line, &mut relay).await {
                                stopped = Some(exit);
                                break;
                            }
                        }
                        if let Some(exit) = stopped {
                            break exit;
                        }
                    }
                    Err(e) => {
                        tracing::warn!(
                            session_id = %spec.session_id,
                            error = %e,
                            "Failed to read runtime output"
                        );
                        break Exit::Eof;
                    }
                },
            }
        };

        let exit = match (exit, relay.lines.finish()) {
            (Exit::Eof, Some(line)) => match self.handle_line(&line, &mut relay).await {
                Ok(()) => Exit::Eof,
                Err(exit) => exit,
            },
            (exit, _) => exit,
        };

        let ending = match exit {
            Exit::Eof => {
                let status = self.wait_for_exit(control.as_mut()).await;
                let waited = tokio::time::timeout(self.config.kill_grace(), &mut stderr_task).await;
                let tail = match waited {
                    Ok(Ok(tail)) => tail,
                    Ok(Err(_)) => DiagnosticTail::new(0),
                    Err(_) => {
                        stderr_task.abort();
                        DiagnosticTail::new(0)
                    }
                };
                tracing::debug!(
                    session_id = %spec.session_id,
                    code = ?status.code,
                    saw_output = relay.tracker.saw_output(),
                    saw_substantive = relay.tracker.saw_substantive(),
                    "Agent runtime exited"
                );
                Ending::Finished(terminal::classify(&relay.tracker, status, &tail))
            }
            Exit::Disconnected => {
                tracing::info!(session_id = %spec.session_id, "Client disconnected, stopping runtime");
                kill(control.as_mut(), &spec.session_id).await;
                stderr_task.abort();
                Ending::Disconnected
            }
            Exit::Aborted => {
                tracing::info!(session_id = %spec.session_id, "Execution aborted, stopping runtime");
                kill(control.as_mut(), &spec.session_id).await;
                stderr_task.abort();
                Ending::Aborted
            }
            Exit::ApprovalTimeout(message) => {
                tracing::warn!(session_id = %spec.session_id, error = %message, "Approval timed out, stopping runtime");
                kill(control.as_mut(), &spec.session_id).await;
                stderr_task.abort();
                Ending::Finished(Some(StreamEvent::error(ErrorKind::ApprovalTimeout, message)))
            }
        };

        // Fail whatever is still suspended in the gate, then let the
        // interception tasks finish answering
        self.handle.abort();
        while relay.approvals.join_next().await.is_some() {}
        stdin_task.abort();

        ending
    }

    /// Handle one complete stdout line; `Err` carries the reason the relay
    /// has to stop
    async fn handle_line(&self, line: &str, relay: &mut Relay) -> std::result::Result<(), Exit> {
        let message = match RuntimeMessage::parse(line) {
            Ok(message) => message,
            Err(e) => {
                relay.tracker.observe(false);
                tracing::debug!(
                    session_id = %self.handle.session_id(),
                    error = %e,
                    "Skipping unparseable runtime line"
                );
                return Ok(());
            }
        };
        relay.tracker.observe(message.is_substantive());

        match message {
            RuntimeMessage::ControlRequest(request) => {
                self.on_control_request(request, relay).await;
                Ok(())
            }
            RuntimeMessage::ControlCancelRequest { request_id } => {
                if let Some(key) = relay.requests.remove(&request_id) {
                    self.gate.cancel(&key).await;
                }
                Ok(())
            }
            RuntimeMessage::Result(_) => {
                let delivered = match message.into_stream_event() {
                    Some(event) => self.emit(event, relay).await,
                    None => Ok(()),
                };
                // The run is over; closing stdin lets the runtime exit
                self.handle.close_stdin().await;
                delivered
            }
            message => match message.into_stream_event() {
                Some(event) => self.emit(event, relay).await,
                None => Ok(()),
            },
        }
    }

    /// Relay one event to the client
    ///
    /// A client that stops reading must not hold up an abort or an
    /// approval timeout, so the send races both.
    async fn emit(&self, event: StreamEvent, relay: &mut Relay) -> std::result::Result<(), Exit> {
        tokio::select! {
            biased;
            _ = self.handle.cancelled() => Err(Exit::Aborted),
            Some(message) = next_timeout(&mut relay.failures_rx) => Err(Exit::ApprovalTimeout(message)),
            sent = self.events.send(event) => sent.map_err(|_| Exit::Disconnected),
        }
    }

    /// Send a closing event, giving up after the kill grace period
    async fn send_final(&self, event: StreamEvent) {
        let sent = tokio::time::timeout(self.config.kill_grace(), self.events.send(event)).await;
        if sent.is_err() {
            tracing::debug!(
                session_id = %self.handle.session_id(),
                "Client not reading, dropping closing event"
            );
        }
    }

    async fn on_control_request(&self, request: ControlRequest, relay: &mut Relay) {
        let interaction_id = request.interaction_id().to_string();
        let request_id = request.request_id;

        let (tool_name, input) = match request.request {
            ControlRequestBody::CanUseTool {
                tool_name, input, ..
            } => (tool_name, input),
            ControlRequestBody::Other => {
                tracing::debug!(
                    session_id = %self.handle.session_id(),
                    request_id = %request_id,
                    "Unsupported control request"
                );
                let _ = self
                    .handle
                    .send(OutboundMessage::ControlError {
                        request_id,
                        error: "Unsupported control request".to_string(),
                    })
                    .await;
                return;
            }
        };

        relay.requests.insert(
            request_id.clone(),
            ApprovalKey::new(self.handle.session_id(), &interaction_id),
        );

        let gate = self.gate.clone();
        let handle = self.handle.clone();
        let failures = relay.failures_tx.clone();
        relay.approvals.spawn(async move {
            let call = GatedCall {
                interaction_id,
                tool_name,
                input: input.clone(),
            };
            let reply = match gate.intercept(&handle, call).await {
                Ok(ApprovalDecision::Allow { updated_input }) => OutboundMessage::Allow {
                    request_id: request_id.clone(),
                    updated_input: updated_input.unwrap_or(input),
                },
                Ok(ApprovalDecision::Deny { message }) => OutboundMessage::Deny {
                    request_id: request_id.clone(),
                    message,
                },
                Err(err) => {
                    let reply = OutboundMessage::ControlError {
                        request_id: request_id.clone(),
                        error: err.to_string(),
                    };
                    let _ = failures.send(err);
                    reply
                }
            };
            let _ = handle.send(reply).await;
            request_id
        });
    }

    /// Wait for the runtime to exit after its stdout closed, killing it if
    /// it lingers past the grace period
    async fn wait_for_exit(&self, control: &mut dyn ProcessControl) -> ExitStatus {
        let waited = tokio::time::timeout(self.config.kill_grace(), control.wait()).await;
        match waited {
            Ok(Ok(status)) => status,
            Ok(Err(e)) => {
                tracing::warn!(
                    session_id = %self.handle.session_id(),
                    error = %e,
                    "Failed to wait for agent runtime"
                );
                ExitStatus::signaled()
            }
            Err(_) => {
                tracing::warn!(
                    session_id = %self.handle.session_id(),
                    pid = ?control.id(),
                    "Agent runtime did not exit after closing stdout, killing"
                );
                kill(control, self.handle.session_id()).await;
                control.wait().await.unwrap_or_else(|_| ExitStatus::signaled())
            }
        }
    }
}

/// Next approval timeout reported by an interception task; other gate
/// failures were already answered on stdin and are skipped
async fn next_timeout(failures: &mut mpsc::UnboundedReceiver<GateError>) -> Option<String> {
    while let Some(failure) = failures.recv().await {
        if let GateError::Timeout { .. } = failure {
            return Some(failure.to_string());
        }
    }
    None
}

async fn kill(control: &mut dyn ProcessControl, session_id: &str) {
    if let Err(e) = control.kill().await {
        tracing::warn!(session_id = %session_id, error = %e, "Failed to kill agent runtime");
    }
}

/// Own the runtime's stdin, writing queued messages in order
async fn write_stdin(
    mut stdin: BoxedWriter,
    mut commands: mpsc::Receiver<StdinCommand>,
    session_id: String,
) {
    while let Some(command) = commands.recv().await {
        match command {
            StdinCommand::Send(message) => {
                if let Err(e) = stdin.write_all(&message.encode()).await {
                    tracing::debug!(session_id = %session_id, error = %e, "Runtime stdin closed");
                    break;
                }
                let _ = stdin.flush().await;
            }
            StdinCommand::Close => break,
        }
    }
    let _ = stdin.shutdown().await;
}

/// Drain the runtime's stderr, logging each line and keeping the tail
async fn collect_stderr(stderr: BoxedReader, capacity: usize, session_id: String) -> DiagnosticTail {
    let mut tail = DiagnosticTail::new(capacity);
    let mut lines = BufReader::new(stderr).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        tracing::debug!(session_id = %session_id, line = %line, "runtime stderr");
        tail.push(line);
    }
    tail
}
