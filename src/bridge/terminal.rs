//! Terminal classification
//!
//! A relay that only watches the exit code misses the two failure modes
//! that matter most in practice: a runtime that never prints anything and
//! one that prints lifecycle noise but never answers. The bridge tracks two
//! facts across the whole execution (any output at all, any substantive
//! message) and combines them with the exit status when the runtime ends.

use crate::event::{ErrorKind, StreamEvent};
use crate::runtime::ExitStatus;
use std::collections::VecDeque;

/// What the runtime has produced so far
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct OutputTracker {
    saw_output: bool,
    saw_substantive: bool,
}

impl OutputTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one stdout line
    pub fn observe(&mut self, substantive: bool) {
        self.saw_output = true;
        self.saw_substantive |= substantive;
    }

    pub fn saw_output(&self) -> bool {
        self.saw_output
    }

    pub fn saw_substantive(&self) -> bool {
        self.saw_substantive
    }
}

/// Last few lines of the runtime's diagnostic channel
#[derive(Debug, Clone)]
pub struct DiagnosticTail {
    lines: VecDeque<String>,
    capacity: usize,
}

impl DiagnosticTail {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity.min(64)),
            capacity,
        }
    }

    pub fn push(&mut self, line: impl Into<String>) {
        if self.capacity == 0 {
            return;
        }
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line.into());
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    pub fn render(&self) -> String {
        self.lines().collect::<Vec<_>>().join("\n")
    }
}

/// Decide which `error` event, if any, closes an execution that ran to exit
///
/// Returns `None` when the runtime produced a substantive message and
/// exited cleanly: the relayed `result` is then authoritative.
pub fn classify(
    tracker: &OutputTracker,
    status: ExitStatus,
    tail: &DiagnosticTail,
) -> Option<StreamEvent> {
    match (tracker.saw_output(), tracker.saw_substantive(), status.code) {
        (false, _, Some(code)) if code != 0 => Some(StreamEvent::error(
            ErrorKind::RuntimeExited,
            with_diagnostics(
                format!("Agent runtime exited abnormally with code {code} before producing any output"),
                tail,
            ),
        )),
        (false, _, _) => Some(StreamEvent::error(
            ErrorKind::RuntimeSilent,
            "Agent runtime produced no output. It may have been killed or run out of resources",
        )),
        (true, false, _) => Some(StreamEvent::error(
            ErrorKind::RuntimeHang,
            "Agent runtime started but never responded",
        )),
        (true, true, Some(code)) if code != 0 => Some(StreamEvent::error(
            ErrorKind::RuntimeFailed,
            with_diagnostics(format!("Agent runtime failed with exit code {code}"), tail),
        )),
        (true, true, _) => None,
    }
}

fn with_diagnostics(message: String, tail: &DiagnosticTail) -> String {
    if tail.is_empty() {
        message
    } else {
        format!("{message}:\n{}", tail.render())
    }
}
