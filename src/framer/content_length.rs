// Copyright (c) 2025 Mauka MCP Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! `Content-Length`-prefixed framing, in the style of LSP/HTTP header blocks.

use std::io::{BufRead, Read, Write};

use super::{FrameBuffer, FrameError, Framer};

/// What to do when a header block has no `Content-Length`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingLengthPolicy {
    /// Treat it as a recoverable error; the caller may try the next frame.
    Recoverable,
    /// Treat it as fatal, ending the read loop.
    Fatal,
}

/// Framer that reads/writes a `Content-Length: N\r\n\r\n<N bytes>` block,
/// optionally preceded by an HTTP-style request line.
#[derive(Debug, Clone)]
pub struct ContentLengthFramer {
    accept_request_line: bool,
    missing_length_policy: MissingLengthPolicy,
}

impl ContentLengthFramer {
    /// Creates a new framer. `accept_request_line` allows (but does not
    /// require) a leading `METHOD path HTTP/x.y` line before the headers.
    pub fn new(accept_request_line: bool, missing_length_policy: MissingLengthPolicy) -> Self {
        Self {
            accept_request_line,
            missing_length_policy,
        }
    }
}

impl Default for ContentLengthFramer {
    fn default() -> Self {
        Self::new(false, MissingLengthPolicy::Fatal)
    }
}

impl ContentLengthFramer {
    /// The policy a driving loop should apply when [`Framer::read_frame`]
    /// fails with [`FrameError::MissingContentLength`]: keep reading frames
    /// ([`MissingLengthPolicy::Recoverable`]) or stop
    /// ([`MissingLengthPolicy::Fatal`]). The framer itself always surfaces
    /// the same error either way; this only advises the caller's loop.
    pub fn missing_length_policy(&self) -> MissingLengthPolicy {
        self.missing_length_policy
    }
}

fn read_line<R: BufRead>(reader: &mut R) -> Result<Option<String>, FrameError> {
    let mut line = Vec::new();
    let bytes_read = reader.read_until(b'\n', &mut line)?;
    if bytes_read == 0 {
        return Ok(None);
    }
    while matches!(line.last(), Some(b'\n') | Some(b'\r')) {
        line.pop();
    }
    Ok(Some(String::from_utf8_lossy(&line).into_owned()))
}

fn looks_like_request_line(line: &str) -> bool {
    line.splitn(3, ' ').count() == 3 && line.contains("HTTP/")
}

impl Framer for ContentLengthFramer {
    fn read_frame<R: BufRead>(&mut self, reader: &mut R, buffer: &mut FrameBuffer) -> Result<bool, FrameError> {
        buffer.reset();

        let Some(mut line) = read_line(reader)? else {
            return Ok(false);
        };

        if self.accept_request_line && looks_like_request_line(&line) {
            let Some(next) = read_line(reader)? else {
                return Err(FrameError::UnexpectedEof);
            };
            line = next;
        }

        loop {
            if line.is_empty() {
                break;
            }
            if let Some((name, value)) = line.split_once(':') {
                buffer
                    .headers
                    .insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
            }
            let Some(next) = read_line(reader)? else {
                return Err(FrameError::UnexpectedEof);
            };
            line = next;
        }

        let content_length = match buffer.headers.get("content-length") {
            Some(raw) => raw
                .parse::<usize>()
                .map_err(|_| FrameError::InvalidContentLength(raw.clone()))?,
            None => return Err(FrameError::MissingContentLength),
        };

        let mut content = vec![0u8; content_length];
        read_exact_or_eof(reader, &mut content)?;
        buffer.content = content;
        crate::logging::log_frame_read(buffer.content.len());
        Ok(true)
    }

    fn write_frame<W: Write>(&mut self, writer: &mut W, payload: &str) -> Result<(), FrameError> {
        let header = format!("Content-Length: {}\r\n\r\n", payload.len());
        writer.write_all(header.as_bytes())?;
        writer.write_all(payload.as_bytes())?;
        writer.flush()?;
        crate::logging::log_frame_write(payload.len());
        Ok(())
    }
}

/// Reads exactly `buf.len()` bytes, looping over partial reads, and maps a
/// too-early EOF to [`FrameError::UnexpectedEof`].
fn read_exact_or_eof<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<(), FrameError> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..])?;
        if n == 0 {
            return Err(FrameError::UnexpectedEof);
        }
        filled += n;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reads_single_frame() {
        let mut framer = ContentLengthFramer::default();
        let mut reader = Cursor::new(b"Content-Length: 5\r\n\r\nhello".to_vec());
        let mut buffer = FrameBuffer::new();
        assert!(framer.read_frame(&mut reader, &mut buffer).unwrap());
        assert_eq!(buffer.content_str(), "hello");
    }

    #[test]
    fn header_names_are_case_insensitive() {
        let mut framer = ContentLengthFramer::default();
        let mut reader = Cursor::new(b"CONTENT-LENGTH: 2\r\n\r\nhi".to_vec());
        let mut buffer = FrameBuffer::new();
        assert!(framer.read_frame(&mut reader, &mut buffer).unwrap());
        assert_eq!(buffer.content_str(), "hi");
    }

    #[test]
    fn unknown_headers_are_retained_but_ignored() {
        let mut framer = ContentLengthFramer::default();
        let mut reader = Cursor::new(b"Content-Length: 2\r\nX-Custom: abc\r\n\r\nhi".to_vec());
        let mut buffer = FrameBuffer::new();
        assert!(framer.read_frame(&mut reader, &mut buffer).unwrap());
        assert_eq!(buffer.content_str(), "hi");
        assert_eq!(buffer.headers.get("x-custom").map(String::as_str), Some("abc"));
    }

    #[test]
    fn missing_content_length_is_an_error() {
        let mut framer = ContentLengthFramer::default();
        let mut reader = Cursor::new(b"X-Custom: abc\r\n\r\nhi".to_vec());
        let mut buffer = FrameBuffer::new();
        let err = framer.read_frame(&mut reader, &mut buffer).unwrap_err();
        assert!(matches!(err, FrameError::MissingContentLength));
    }

    #[test]
    fn partial_content_before_eof_is_unexpected_eof() {
        let mut framer = ContentLengthFramer::default();
        let mut reader = Cursor::new(b"Content-Length: 10\r\n\r\nshort".to_vec());
        let mut buffer = FrameBuffer::new();
        let err = framer.read_frame(&mut reader, &mut buffer).unwrap_err();
        assert!(matches!(err, FrameError::UnexpectedEof));
    }

    #[test]
    fn clean_eof_at_header_boundary_stops_cleanly() {
        let mut framer = ContentLengthFramer::default();
        let mut reader = Cursor::new(Vec::new());
        let mut buffer = FrameBuffer::new();
        assert!(!framer.read_frame(&mut reader, &mut buffer).unwrap());
    }

    #[test]
    fn accepts_leading_http_request_line_when_enabled() {
        let mut framer = ContentLengthFramer::new(true, MissingLengthPolicy::Fatal);
        let mut reader = Cursor::new(b"POST / HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello".to_vec());
        let mut buffer = FrameBuffer::new();
        assert!(framer.read_frame(&mut reader, &mut buffer).unwrap());
        assert_eq!(buffer.content_str(), "hello");
    }

    #[test]
    fn write_frame_produces_header_and_body() {
        let mut framer = ContentLengthFramer::default();
        let mut out = Vec::new();
        framer.write_frame(&mut out, "hi").unwrap();
        assert_eq!(out, b"Content-Length: 2\r\n\r\nhi");
    }
}
