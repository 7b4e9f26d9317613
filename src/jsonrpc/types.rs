// Copyright (c) 2025 Mauka MCP Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Core data types for the JSON-RPC 2.0 protocol.
//!
//! This module defines the request/response/batch shapes used throughout the
//! codec, pipelines, and registry, according to the
//! [specification](https://www.jsonrpc.org/specification).

use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::JsonRpcError;

/// JSON-RPC request identifier.
///
/// Can be a string, number, or explicit JSON `null`. A request with no `id`
/// member at all is a notification; that absence is represented as
/// `Option<RpcId>` on [`RpcRequest`] rather than as a variant here, so a
/// request carrying a literal `"id": null` (distinct, if discouraged) is
/// still representable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RpcId {
    /// String identifier.
    String(String),

    /// Numeric identifier. Restricted to the safe-integer range by the codec.
    Integer(i64),

    /// Explicit JSON `null` identifier.
    Null,
}

impl fmt::Display for RpcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RpcId::String(s) => write!(f, "{s}"),
            RpcId::Integer(n) => write!(f, "{n}"),
            RpcId::Null => write!(f, "null"),
        }
    }
}

/// A parsed JSON-RPC 2.0 request or notification.
///
/// When parsing fails or a structural validation rule is violated,
/// `parse_error` carries the resulting [`JsonRpcError`] and the rest of the
/// fields are filled in on a best-effort basis — `id` in particular is
/// preserved whenever it could be recovered from the malformed input.
#[derive(Debug, Clone)]
pub struct RpcRequest {
    /// JSON-RPC protocol version. Must be `"2.0"` for a well-formed request.
    pub version: String,

    /// Name of the method to invoke. Non-empty; `rpc.`-prefixed names are
    /// reserved and rejected at registration, not here.
    pub method: String,

    /// Method parameters: absent, a positional array, or a named object.
    pub params: Option<serde_json::Value>,

    /// Request identifier. `None` means this is a notification.
    pub id: Option<RpcId>,

    /// Set when parsing or validation produced an error for this request.
    /// The request is otherwise unusable for dispatch.
    pub parse_error: Option<JsonRpcError>,
}

impl RpcRequest {
    /// Creates a new, well-formed JSON-RPC 2.0 request.
    pub fn new(
        method: impl Into<String>,
        params: Option<serde_json::Value>,
        id: Option<RpcId>,
    ) -> Self {
        Self {
            version: "2.0".to_string(),
            method: method.into(),
            params,
            id,
            parse_error: None,
        }
    }

    /// Creates a new request with a string id.
    pub fn with_string_id(
        method: impl Into<String>,
        params: Option<serde_json::Value>,
        id: impl Into<String>,
    ) -> Self {
        Self::new(method, params, Some(RpcId::String(id.into())))
    }

    /// Creates a new request with an integer id.
    pub fn with_integer_id(
        method: impl Into<String>,
        params: Option<serde_json::Value>,
        id: i64,
    ) -> Self {
        Self::new(method, params, Some(RpcId::Integer(id)))
    }

    /// Creates a new notification (no id).
    pub fn notification(method: impl Into<String>, params: Option<serde_json::Value>) -> Self {
        Self::new(method, params, None)
    }

    /// Returns true if this request is a notification (no response expected).
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }

    /// Returns true if parsing/validation failed for this request.
    pub fn is_parse_error(&self) -> bool {
        self.parse_error.is_some()
    }

    /// Serializes this request to its wire representation.
    ///
    /// # Panics
    ///
    /// Panics if called on a request with `parse_error` set; such requests
    /// never reach the wire as requests (they become error responses).
    pub fn to_wire_value(&self) -> serde_json::Value {
        assert!(
            self.parse_error.is_none(),
            "cannot serialize a request that failed to parse"
        );
        let mut obj = serde_json::Map::new();
        obj.insert("jsonrpc".to_string(), serde_json::Value::String(self.version.clone()));
        obj.insert("method".to_string(), serde_json::Value::String(self.method.clone()));
        if let Some(params) = &self.params {
            obj.insert("params".to_string(), params.clone());
        }
        if let Some(id) = &self.id {
            obj.insert("id".to_string(), serde_json::to_value(id).expect("id serializes"));
        }
        serde_json::Value::Object(obj)
    }
}

/// The outcome half of a [`RpcResponse`]: exactly one of a result or an
/// error, never both.
#[derive(Debug, Clone)]
pub enum RpcOutcome {
    /// A successful result payload.
    Result(serde_json::Value),
    /// An error object.
    Error(JsonRpcError),
}

/// A parsed or composed JSON-RPC 2.0 response.
#[derive(Debug, Clone)]
pub struct RpcResponse {
    /// JSON-RPC protocol version, always `"2.0"`.
    pub version: String,

    /// The identifier from the request this responds to. Serialized as JSON
    /// `null` when the originating request's id could not be recovered.
    pub id: RpcId,

    /// The result or error payload.
    pub outcome: RpcOutcome,
}

impl RpcResponse {
    /// Creates a new successful response.
    pub fn success(id: RpcId, result: serde_json::Value) -> Self {
        Self {
            version: "2.0".to_string(),
            id,
            outcome: RpcOutcome::Result(result),
        }
    }

    /// Creates a new error response.
    pub fn error(id: RpcId, error: JsonRpcError) -> Self {
        Self {
            version: "2.0".to_string(),
            id,
            outcome: RpcOutcome::Error(error),
        }
    }

    /// Returns true if this response carries a successful result.
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, RpcOutcome::Result(_))
    }

    /// Returns true if this response carries an error.
    pub fn is_error(&self) -> bool {
        matches!(self.outcome, RpcOutcome::Error(_))
    }

    /// Serializes this response to its wire representation.
    pub fn to_wire_value(&self) -> serde_json::Value {
        let mut obj = serde_json::Map::new();
        obj.insert("jsonrpc".to_string(), serde_json::Value::String(self.version.clone()));
        match &self.outcome {
            RpcOutcome::Result(value) => {
                obj.insert("result".to_string(), value.clone());
            }
            RpcOutcome::Error(error) => {
                obj.insert(
                    "error".to_string(),
                    serde_json::to_value(error).expect("JsonRpcError serializes"),
                );
            }
        }
        obj.insert("id".to_string(), serde_json::to_value(&self.id).expect("id serializes"));
        serde_json::Value::Object(obj)
    }
}

/// Either a single request or a non-empty batch, as produced by
/// [`super::codec::parse_request`].
#[derive(Debug, Clone)]
pub enum RpcRequestMessage {
    /// A single request or notification.
    Single(RpcRequest),
    /// A batch of requests, parsed independently.
    Batch(Vec<RpcRequest>),
}

impl RpcRequestMessage {
    /// Returns true if this is a batch message.
    pub fn is_batch(&self) -> bool {
        matches!(self, RpcRequestMessage::Batch(_))
    }

    /// Returns the single request, if this message is not a batch.
    pub fn as_single(&self) -> Option<&RpcRequest> {
        match self {
            RpcRequestMessage::Single(r) => Some(r),
            RpcRequestMessage::Batch(_) => None,
        }
    }

    /// Returns the batch entries, if this message is a batch.
    pub fn as_batch(&self) -> Option<&[RpcRequest]> {
        match self {
            RpcRequestMessage::Batch(b) => Some(b),
            RpcRequestMessage::Single(_) => None,
        }
    }
}

/// Either a single response or a batch of responses.
#[derive(Debug, Clone)]
pub enum RpcResponseMessage {
    /// A single response.
    Single(RpcResponse),
    /// A batch of responses.
    Batch(Vec<RpcResponse>),
}

impl RpcResponseMessage {
    /// Returns true if this is a batch message.
    pub fn is_batch(&self) -> bool {
        matches!(self, RpcResponseMessage::Batch(_))
    }
}

/// The result of dispatching a single request, produced by a
/// [`super::dispatch::RequestDispatcher`].
#[derive(Debug, Clone)]
pub enum DispatchResult {
    /// No reply: the request was a notification, or the handler
    /// intentionally produced nothing.
    None,
    /// An already-serialized JSON result payload.
    Result(String),
    /// A structured error.
    Err {
        /// The error code.
        code: i32,
        /// A short description.
        message: String,
        /// Optional additional data.
        data: Option<serde_json::Value>,
    },
    /// Emit whatever reply the boxed result implies, then ask the framer
    /// loop to stop after writing it.
    EndStream(Box<DispatchResult>),
}

impl DispatchResult {
    /// Convenience constructor for a structured error with no `data`.
    pub fn err(code: i32, message: impl Into<String>) -> Self {
        DispatchResult::Err {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Returns true if this result carries an `EndStream` request, at any
    /// nesting depth (nesting should not occur in practice but is handled).
    pub fn is_end_stream(&self) -> bool {
        matches!(self, DispatchResult::EndStream(_))
    }

    /// Strips any `EndStream` wrapper, returning the reply it implies.
    pub fn into_reply(self) -> DispatchResult {
        match self {
            DispatchResult::EndStream(inner) => inner.into_reply(),
            other => other,
        }
    }
}
