//! Line framing for streamed hook output

use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use crate::styling::DIM;

/// Between the prefix and the line text
pub const SEPARATOR: &str = " │ ";

/// Turns an arbitrary byte stream into whole, prefixed lines on a shared sink.
///
/// Bytes are buffered until a `\n` arrives; each complete line is written as
/// `<prefix> │ <line>\n` while holding the sink's lock, so two framers sharing a
/// sink never interleave within a line. A trailing partial line is held until it
/// is completed or [`flush`](Write::flush) is called.
///
/// Every byte written is also kept verbatim and available from
/// [`LineFramer::into_captured`].
///
/// Writes never fail because of the sink: the reader feeding a framer must keep
/// draining the child's pipe. The first sink error is kept and returned from the
/// next `flush`.
pub struct LineFramer<'a, W: Write> {
    sink: &'a Mutex<W>,
    prefix: String,
    pending: Vec<u8>,
    captured: Vec<u8>,
    error: Option<io::Error>,
}

impl<'a, W: Write> LineFramer<'a, W> {
    /// A framer that writes `prefix` verbatim before each line.
    pub fn new(sink: &'a Mutex<W>, prefix: impl Into<String>) -> Self {
        Self {
            sink,
            prefix: prefix.into(),
            pending: Vec::new(),
            captured: Vec::new(),
            error: None,
        }
    }

    /// A framer whose prefix is dimmed when `color` is set.
    pub fn styled(sink: &'a Mutex<W>, prefix: &str, color: bool) -> Self {
        if color {
            Self::new(sink, format!("{DIM}{prefix}{DIM:#}"))
        } else {
            Self::new(sink, prefix)
        }
    }

    /// Everything written so far, unframed.
    pub fn captured(&self) -> &[u8] {
        &self.captured
    }

    pub fn into_captured(self) -> Vec<u8> {
        self.captured
    }

    fn emit(&mut self, lines: &[u8]) {
        if self.error.is_some() {
            return;
        }
        let mut sink = self.sink.lock().unwrap_or_else(PoisonError::into_inner);
        let result = lines
            .split(|&b| b == b'\n')
            .try_for_each(|line| {
                sink.write_all(self.prefix.as_bytes())?;
                sink.write_all(SEPARATOR.as_bytes())?;
                sink.write_all(line)?;
                sink.write_all(b"\n")
            })
            .and_then(|()| sink.flush());
        if let Err(e) = result {
            self.error = Some(e);
        }
    }
}

impl<W: Write> Write for LineFramer<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.captured.extend_from_slice(buf);
        self.pending.extend_from_slice(buf);

        if let Some(last_newline) = self.pending.iter().rposition(|&b| b == b'\n') {
            let rest = self.pending.split_off(last_newline + 1);
            let mut complete = std::mem::replace(&mut self.pending, rest);
            complete.pop();
            self.emit(&complete);
        }

        Ok(buf.len())
    }

    /// Emit a held partial line, terminated with `\n`.
    ///
    /// Does nothing when no partial line is held, so repeated flushes are safe.
    fn flush(&mut self) -> io::Result<()> {
        if !self.pending.is_empty() {
            let partial = std::mem::take(&mut self.pending);
            self.emit(&partial);
        }
        match self.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
