// Copyright (c) 2025 Mauka MCP Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Delimited framing: one JSON-RPC message per delimiter byte (default LF).

use std::io::{BufRead, Write};

use super::{FrameBuffer, FrameError, Framer};

/// Framer that separates messages with a single configured delimiter byte.
///
/// The delimiter MUST NOT appear inside a message payload; JSON text never
/// contains a bare newline outside a string, so LF is a safe default.
#[derive(Debug, Clone)]
pub struct DelimitedFramer {
    delimiter: u8,
    skip_empty: bool,
}

impl DelimitedFramer {
    /// Creates a framer using `delimiter`, skipping empty (whitespace-only)
    /// frames when `skip_empty` is set.
    pub fn new(delimiter: u8, skip_empty: bool) -> Self {
        Self { delimiter, skip_empty }
    }
}

impl Default for DelimitedFramer {
    fn default() -> Self {
        Self::new(b'\n', true)
    }
}

impl Framer for DelimitedFramer {
    fn read_frame<R: BufRead>(&mut self, reader: &mut R, buffer: &mut FrameBuffer) -> Result<bool, FrameError> {
        buffer.reset();
        loop {
            let mut line = Vec::new();
            let bytes_read = reader.read_until(self.delimiter, &mut line)?;
            if bytes_read == 0 {
                return Ok(false);
            }
            if line.last() == Some(&self.delimiter) {
                line.pop();
            }
            let trimmed: &[u8] = trim_ascii_whitespace(&line);
            if trimmed.is_empty() && self.skip_empty {
                continue;
            }
            buffer.content.extend_from_slice(trimmed);
            crate::logging::log_frame_read(buffer.content.len());
            return Ok(true);
        }
    }

    fn write_frame<W: Write>(&mut self, writer: &mut W, payload: &str) -> Result<(), FrameError> {
        writer.write_all(payload.as_bytes())?;
        writer.write_all(&[self.delimiter])?;
        writer.flush()?;
        crate::logging::log_frame_write(payload.len());
        Ok(())
    }
}

fn trim_ascii_whitespace(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|b| !b.is_ascii_whitespace()).unwrap_or(bytes.len());
    let end = bytes.iter().rposition(|b| !b.is_ascii_whitespace()).map_or(start, |p| p + 1);
    &bytes[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reads_single_frame() {
        let mut framer = DelimitedFramer::default();
        let mut reader = Cursor::new(b"hello\n".to_vec());
        let mut buffer = FrameBuffer::new();
        assert!(framer.read_frame(&mut reader, &mut buffer).unwrap());
        assert_eq!(buffer.content_str(), "hello");
    }

    #[test]
    fn reads_successive_frames() {
        let mut framer = DelimitedFramer::default();
        let mut reader = Cursor::new(b"one\ntwo\n".to_vec());
        let mut buffer = FrameBuffer::new();
        assert!(framer.read_frame(&mut reader, &mut buffer).unwrap());
        assert_eq!(buffer.content_str(), "one");
        assert!(framer.read_frame(&mut reader, &mut buffer).unwrap());
        assert_eq!(buffer.content_str(), "two");
        assert!(!framer.read_frame(&mut reader, &mut buffer).unwrap());
    }

    #[test]
    fn skips_empty_frames_by_default() {
        let mut framer = DelimitedFramer::default();
        let mut reader = Cursor::new(b"\n\nreal\n".to_vec());
        let mut buffer = FrameBuffer::new();
        assert!(framer.read_frame(&mut reader, &mut buffer).unwrap());
        assert_eq!(buffer.content_str(), "real");
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let mut framer = DelimitedFramer::default();
        let mut reader = Cursor::new(b"  hello  \n".to_vec());
        let mut buffer = FrameBuffer::new();
        assert!(framer.read_frame(&mut reader, &mut buffer).unwrap());
        assert_eq!(buffer.content_str(), "hello");
    }

    #[test]
    fn no_trailing_delimiter_is_clean_eof_when_empty() {
        let mut framer = DelimitedFramer::default();
        let mut reader = Cursor::new(Vec::new());
        let mut buffer = FrameBuffer::new();
        assert!(!framer.read_frame(&mut reader, &mut buffer).unwrap());
    }

    #[test]
    fn write_frame_appends_delimiter() {
        let mut framer = DelimitedFramer::new(b';', false);
        let mut out = Vec::new();
        framer.write_frame(&mut out, "payload").unwrap();
        assert_eq!(out, b"payload;");
    }
}
