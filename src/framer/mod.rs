// Copyright (c) 2025 Mauka MCP Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! The streaming framer (C2): delineates one JSON-RPC message from the next
//! on top of a byte reader/writer, using either a single-byte delimiter or a
//! `Content-Length` header block.
//!
//! Both framings share the same [`Framer`] contract so a pipeline can be
//! written once against the trait and swap framings at construction time.

pub mod content_length;
pub mod delimited;

use std::collections::HashMap;
use std::io::{self, BufRead, Write};

pub use content_length::{ContentLengthFramer, MissingLengthPolicy};
pub use delimited::DelimitedFramer;

/// Failure reading or writing a frame.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The stream ended before a complete frame could be read.
    #[error("unexpected end of stream while reading a frame")]
    UnexpectedEof,

    /// Content-Length framing requires the header but none was present.
    #[error("missing Content-Length header")]
    MissingContentLength,

    /// The Content-Length header's value could not be parsed as an integer.
    #[error("invalid Content-Length value: {0}")]
    InvalidContentLength(String),

    /// The underlying reader or writer failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Scratch storage owned by a framer for one frame: raw header bytes, the
/// parsed header map, and the content payload. Reused and [`reset`](FrameBuffer::reset)
/// between frames rather than reallocated.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    /// Header lines seen for the current frame, keyed by lowercased name.
    pub headers: HashMap<String, String>,
    /// The frame's content bytes, valid UTF-8 JSON text.
    pub content: Vec<u8>,
}

impl FrameBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears all state, ready for the next frame.
    pub fn reset(&mut self) {
        self.headers.clear();
        self.content.clear();
    }

    /// Returns the content as a `&str`, assuming valid UTF-8 (guaranteed for
    /// JSON text read off a conforming peer).
    pub fn content_str(&self) -> &str {
        std::str::from_utf8(&self.content).expect("frame content is valid UTF-8")
    }
}

/// Reads and writes frames over a byte stream.
///
/// Implementations are not required to be `Sync`; a framer is scoped to one
/// connection/pipeline, matching the single-threaded-per-pipeline scheduling
/// model.
pub trait Framer {
    /// Reads the next frame's content into `buffer`, returning `true` if a
    /// frame was read or `false` on a clean end-of-stream (no partial frame
    /// had been started).
    fn read_frame<R: BufRead>(&mut self, reader: &mut R, buffer: &mut FrameBuffer) -> Result<bool, FrameError>;

    /// Writes `payload` as one frame.
    fn write_frame<W: Write>(&mut self, writer: &mut W, payload: &str) -> Result<(), FrameError>;
}
