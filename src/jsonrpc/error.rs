// Copyright (c) 2025 Mauka MCP Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Error types for the JSON-RPC 2.0 wire protocol.
//!
//! This module defines the closed error code taxonomy and the error object
//! shape from the [JSON-RPC 2.0 specification](https://www.jsonrpc.org/specification#error_object).
//! Everything here is wire-facing: instances serialize into the `error` field
//! of a response. Library-internal failures that never reach the wire live in
//! [`crate::error`] instead.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Standard JSON-RPC 2.0 error codes.
///
/// The taxonomy is closed: every implementation-specific condition maps into
/// [`ErrorCode::ServerError`] with a descriptive message rather than minting a
/// new code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Invalid JSON was received.
    ParseError,
    /// The JSON sent is not a valid Request object.
    InvalidRequest,
    /// The method does not exist or is not available.
    MethodNotFound,
    /// Invalid method parameter(s).
    InvalidParams,
    /// Internal JSON-RPC error (e.g. a handler threw).
    InternalError,
    /// Implementation-defined server error in `[-32099, -32000]`.
    ServerError,
}

impl ErrorCode {
    /// Returns a short human-readable description of the error code.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::ParseError => "Parse error",
            ErrorCode::InvalidRequest => "Invalid Request",
            ErrorCode::MethodNotFound => "Method not found",
            ErrorCode::InvalidParams => "Invalid params",
            ErrorCode::InternalError => "Internal error",
            ErrorCode::ServerError => "Server error",
        }
    }

    /// Classifies a raw integer error code.
    ///
    /// Returns `None` if the code doesn't fall into any predefined or
    /// reserved-range bucket.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            -32700 => Some(ErrorCode::ParseError),
            -32600 => Some(ErrorCode::InvalidRequest),
            -32601 => Some(ErrorCode::MethodNotFound),
            -32602 => Some(ErrorCode::InvalidParams),
            -32603 => Some(ErrorCode::InternalError),
            c if (-32099..=-32000).contains(&c) => Some(ErrorCode::ServerError),
            _ => None,
        }
    }

    /// Returns the canonical integer code for this variant.
    ///
    /// [`ErrorCode::ServerError`] always returns `-32000`; implementations
    /// wanting a distinct code within the reserved range should build the
    /// [`JsonRpcError`] directly with that integer and attach context via
    /// `message`/`data` instead.
    pub fn code(&self) -> i32 {
        match self {
            ErrorCode::ParseError => -32700,
            ErrorCode::InvalidRequest => -32600,
            ErrorCode::MethodNotFound => -32601,
            ErrorCode::InvalidParams => -32602,
            ErrorCode::InternalError => -32603,
            ErrorCode::ServerError => -32000,
        }
    }
}

impl From<ErrorCode> for i32 {
    fn from(code: ErrorCode) -> i32 {
        code.code()
    }
}

/// A JSON-RPC error object, as it appears in the `error` field of a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// The error code.
    pub code: i32,

    /// A short description of the error.
    pub message: String,

    /// Additional information about the error, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl JsonRpcError {
    /// Creates a new JSON-RPC error from a classified code.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.code(),
            message: message.into(),
            data: None,
        }
    }

    /// Creates a new JSON-RPC error with additional data.
    pub fn with_data(code: ErrorCode, message: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            code: code.code(),
            message: message.into(),
            data: Some(data),
        }
    }

    /// Creates a standard parse error.
    pub fn parse_error() -> Self {
        Self::new(ErrorCode::ParseError, "Parse error")
    }

    /// Creates a standard invalid request error.
    pub fn invalid_request() -> Self {
        Self::new(ErrorCode::InvalidRequest, "Invalid Request")
    }

    /// Creates a standard method-not-found error.
    pub fn method_not_found() -> Self {
        Self::new(ErrorCode::MethodNotFound, "Method not found.")
    }

    /// Creates a standard invalid-params error with a detail message.
    pub fn invalid_params<S: Into<String>>(msg: S) -> Self {
        Self::new(ErrorCode::InvalidParams, msg)
    }

    /// Creates a standard internal-error with a detail message.
    pub fn internal_error<S: Into<String>>(msg: S) -> Self {
        Self::new(ErrorCode::InternalError, msg)
    }

    /// Creates a server error carrying the symbolic name of the failure that
    /// produced it, per the request pipeline's dispatcher-failure policy.
    pub fn server_error<S: Into<String>>(name: S) -> Self {
        Self::new(ErrorCode::ServerError, name)
    }

    /// Returns true if `code` falls within the well-known taxonomy.
    pub fn is_standard(&self) -> bool {
        ErrorCode::from_code(self.code).is_some()
    }
}

/// Error type for codec-level operations (parsing/validating raw JSON text
/// before it becomes an [`JsonRpcError`] response).
#[derive(Debug, Error)]
pub enum Error {
    /// The input was not valid JSON at all.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The input was valid JSON but not a valid JSON-RPC message.
    #[error("invalid JSON-RPC request: {0}")]
    InvalidRequest(String),
}

impl Error {
    /// Converts a codec error into the wire-facing error object it implies.
    pub fn to_jsonrpc_error(&self) -> JsonRpcError {
        match self {
            Error::Json(_) => JsonRpcError::parse_error(),
            Error::InvalidRequest(msg) => JsonRpcError::invalid_request_with(msg),
        }
    }
}

impl JsonRpcError {
    fn invalid_request_with(msg: &str) -> Self {
        Self::new(ErrorCode::InvalidRequest, format!("Invalid Request: {msg}"))
    }
}

/// Specialized result type for codec operations.
pub type Result<T> = std::result::Result<T, Error>;
