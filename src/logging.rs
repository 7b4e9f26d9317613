// Copyright (c) 2025 Mauka MCP Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Cross-cutting pipeline logging (C7).
//!
//! A handful of named call sites for the log lines the pipeline and framer
//! emit, all routed through `tracing`. Keeping them here instead of scattering
//! bare `tracing::debug!`/`warn!` calls across the codec, framer, and registry
//! keeps the event names and fields consistent.

use tracing::{debug, warn};

/// Logs a successful frame read.
pub fn log_frame_read(bytes_read: usize) {
    debug!(bytes_read, "frame read");
}

/// Logs a successful frame write.
pub fn log_frame_write(bytes_written: usize) {
    debug!(bytes_written, "frame written");
}

/// Logs a dispatch miss: no handler was registered for `method`.
pub fn log_dispatch_miss(method: &str) {
    warn!(method, "dispatch miss: method not found");
}

/// Logs a handler invocation failure (a declared error or a caught panic).
pub fn log_handler_failure(method: &str, failure: &str) {
    warn!(method, failure, "handler invocation failed");
}

/// Logs an arena reset, with the number of bytes reclaimed.
pub fn log_arena_reset(bytes_reclaimed: usize) {
    debug!(bytes_reclaimed, "arena reset");
}
