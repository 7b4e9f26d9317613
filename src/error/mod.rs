//! Error module for the Honu RPC library.
//!
//! This module provides the crate-wide error type used for failures the
//! library surfaces to *its Rust caller* — bad config files, I/O failures,
//! malformed JSON the caller handed us directly. It is deliberately distinct
//! from [`crate::jsonrpc::error::JsonRpcError`], which never reaches a Rust
//! `Result` and only ever travels on the wire.

use std::fmt::{Display, Formatter};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use thiserror::Error;

pub mod config;

/// Result type alias used throughout the crate for non-wire failures.
pub type HonuResult<T> = Result<T, HonuError>;

/// Core error enum for the Honu RPC library.
#[derive(Error, Debug)]
pub enum HonuError {
    /// Errors occurring during configuration loading or validation.
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// IO errors that may occur on the underlying byte stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors surfaced outside the wire protocol
    /// (e.g. a caller asking the codec to serialize an un-serializable value).
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Custom error with message for cases where a specific variant doesn't exist.
    #[error("{0}")]
    Custom(String),
}

/// Error reporting structure to provide context and debugging information.
#[derive(Debug)]
pub struct ErrorContext {
    /// The original error that occurred.
    pub error: HonuError,

    /// The component where the error occurred.
    pub component: String,

    /// Additional context information to help with debugging.
    pub details: Option<String>,
}

impl ErrorContext {
    /// Creates a new error context with the given error and component.
    pub fn new<S: Into<String>>(error: HonuError, component: S) -> Self {
        Self {
            error,
            component: component.into(),
            details: None,
        }
    }

    /// Adds detail information to the error context.
    pub fn with_details<S: Into<String>>(mut self, details: S) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl Display for ErrorContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "error in {}: {}", self.component, self.error)?;
        if let Some(details) = &self.details {
            write!(f, "\ndetails: {details}")?;
        }
        Ok(())
    }
}

/// Error reporter trait for reporting library-internal errors to various sinks.
pub trait ErrorReporter: Send + Sync + std::fmt::Debug {
    /// Report an error with context.
    fn report(&self, context: ErrorContext);
}

/// A simple error reporter implementation that logs errors using `tracing`.
#[derive(Default, Debug)]
pub struct TracingErrorReporter;

impl ErrorReporter for TracingErrorReporter {
    fn report(&self, context: ErrorContext) {
        tracing::error!(
            error = %context.error,
            component = %context.component,
            details = context.details.as_deref().unwrap_or("none"),
            "library error reported"
        );
    }
}

/// Global error reporter instance, set once at application startup.
static ERROR_REPORTER: OnceCell<Arc<dyn ErrorReporter>> = OnceCell::new();

/// Sets the global error reporter.
///
/// Only the first call takes effect; later calls are no-ops. Intended to be
/// called once during application startup by a consumer of the library (the
/// library itself never calls this).
pub fn set_error_reporter(reporter: Arc<dyn ErrorReporter>) {
    let _ = ERROR_REPORTER.set(reporter);
}

/// Reports an error through the global reporter, falling back to stderr if
/// none has been configured.
pub fn report_error(context: ErrorContext) {
    match ERROR_REPORTER.get() {
        Some(reporter) => reporter.report(context),
        None => eprintln!("{context}"),
    }
}
