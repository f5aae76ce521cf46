// src/status/log.rs

use crate::status::strip::{AnsiStripper, Utf8Carry};

/// Append-only log of one task: the raw text as received (formatting kept)
/// and its formatting-stripped projection used for status matching.
///
/// Both views are extended per chunk; neither is ever recomputed from the
/// whole buffer.
#[derive(Debug, Default)]
pub struct LogBuffer {
    raw: String,
    plain: String,
    raw_decoder: Utf8Carry,
    stripper: AnsiStripper,
}

impl LogBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one output chunk and return the raw text it added.
    ///
    /// The returned text may be shorter than `chunk` when the chunk ends in
    /// the middle of a UTF-8 character; the remainder shows up with the
    /// next chunk.
    pub fn append(&mut self, chunk: &[u8]) -> &str {
        let start = self.raw.len();
        let text = self.raw_decoder.decode(chunk);
        self.raw.push_str(&text);
        let plain = self.stripper.feed(chunk);
        self.plain.push_str(&plain);
        &self.raw[start..]
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn plain(&self) -> &str {
        &self.plain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_raw_and_plain_views_in_step() {
        let mut log = LogBuffer::new();
        assert_eq!(log.append(b"\x1b[31mERR\x1b[0m one\n"), "\x1b[31mERR\x1b[0m one\n");
        log.append(b"two\n");
        assert_eq!(log.raw(), "\x1b[31mERR\x1b[0m one\ntwo\n");
        assert_eq!(log.plain(), "ERR one\ntwo\n");
    }

    #[test]
    fn split_character_is_returned_once_complete() {
        let mut log = LogBuffer::new();
        let check = "✓".as_bytes();
        assert_eq!(log.append(&check[..1]), "");
        assert_eq!(log.append(&check[1..]), "✓");
        assert_eq!(log.raw(), "✓");
        assert_eq!(log.plain(), "✓");
    }
}
