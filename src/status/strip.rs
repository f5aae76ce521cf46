// src/status/strip.rs

//! Chunk-boundary-safe decoding of process output.
//!
//! Process output arrives in arbitrary slices: an escape sequence or a
//! multi-byte character can be split across two reads. Both helpers here
//! keep the partial state between calls, so feeding a stream in pieces
//! gives exactly the same text as feeding it in one go.

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

/// Byte sink shared between the stripping writer and its owner.
#[derive(Debug, Clone, Default)]
struct SharedSink(Rc<RefCell<Vec<u8>>>);

impl SharedSink {
    fn take(&self) -> Vec<u8> {
        std::mem::take(&mut *self.0.borrow_mut())
    }
}

impl Write for SharedSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Incremental terminal-formatting stripper.
///
/// Wraps a long-lived `strip_ansi_escapes::Writer`, whose escape-sequence
/// parser keeps its state across `feed` calls.
pub struct AnsiStripper {
    writer: strip_ansi_escapes::Writer<SharedSink>,
    sink: SharedSink,
}

impl AnsiStripper {
    pub fn new() -> Self {
        let sink = SharedSink::default();
        Self {
            writer: strip_ansi_escapes::Writer::new(sink.clone()),
            sink,
        }
    }

    /// Strip one chunk, returning the plain text it completes.
    pub fn feed(&mut self, chunk: &[u8]) -> String {
        // Writing into an in-memory sink cannot fail.
        let _ = self.writer.write_all(chunk);
        let _ = self.writer.flush();
        let bytes = self.sink.take();
        match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        }
    }
}

impl Default for AnsiStripper {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AnsiStripper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnsiStripper").finish_non_exhaustive()
    }
}

/// Strip a complete text in one pass.
pub fn strip_all(text: &str) -> String {
    strip_ansi_escapes::strip_str(text)
}

/// UTF-8 decoder that holds back an incomplete trailing character until the
/// next chunk completes it. Invalid sequences become U+FFFD.
#[derive(Debug, Default)]
pub struct Utf8Carry {
    pending: Vec<u8>,
}

impl Utf8Carry {
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        self.pending.extend_from_slice(chunk);

        let mut out = String::with_capacity(self.pending.len());
        let mut pos = 0;

        while pos < self.pending.len() {
            match std::str::from_utf8(&self.pending[pos..]) {
                Ok(text) => {
                    out.push_str(text);
                    pos = self.pending.len();
                }
                Err(e) => {
                    let valid_end = pos + e.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&self.pending[pos..valid_end]));
                    match e.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            pos = valid_end + len;
                        }
                        None => {
                            // Incomplete character at the end: keep it.
                            pos = valid_end;
                            break;
                        }
                    }
                }
            }
        }

        self.pending.drain(..pos);
        out
    }

    /// Bytes held back waiting for the rest of a character.
    pub fn pending(&self) -> &[u8] {
        &self.pending
    }
}
