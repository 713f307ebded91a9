//! Reassembly of newline-delimited output split across read chunks

/// Buffers an incomplete trailing line across chunks and yields only
/// complete lines
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return every line it completed, in order
    ///
    /// A trailing `\r` is stripped and blank lines are skipped. Lines are
    /// decoded only once complete, so multi-byte characters split across
    /// chunks survive intact.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        if chunk.is_empty() {
            return Vec::new();
        }
        // Only the new bytes can contain the next newline
        let scan_from = self.pending.len();
        self.pending.extend_from_slice(chunk);

        let mut lines = Vec::new();
        let mut start = 0;
        let mut cursor = scan_from;
        while let Some(offset) = self.pending[cursor..].iter().position(|&b| b == b'\n') {
            let end = cursor + offset;
            if let Some(line) = decode(&self.pending[start..end]) {
                lines.push(line);
            }
            start = end + 1;
            cursor = start;
        }
        self.pending.drain(..start);
        lines
    }

    /// Take whatever is left after the stream ended without a final newline
    pub fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.pending);
        decode(&rest)
    }

    /// Bytes held back waiting for a newline
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

fn decode(bytes: &[u8]) -> Option<String> {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    let line = String::from_utf8_lossy(bytes);
    if line.trim().is_empty() {
        None
    } else {
        Some(line.into_owned())
    }
}
