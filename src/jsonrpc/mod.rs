// Copyright (c) 2025 Mauka MCP Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! JSON-RPC 2.0 protocol core.
//!
//! This module implements the [JSON-RPC 2.0 specification](https://www.jsonrpc.org/specification):
//! a message codec (parse/compose requests, responses, and batches), the
//! dispatcher interface the request/response pipelines drive, and a
//! reflective handler registry that binds native functions to method names.
//!
//! # Example
//!
//! ```
//! use honu_rpc::jsonrpc::arena::Arena;
//! use honu_rpc::jsonrpc::codec::{parse_request, write_success};
//! use honu_rpc::jsonrpc::registry::{HandlerRegistry, Json};
//! use honu_rpc::jsonrpc::types::{DispatchResult, RpcRequestMessage};
//! use honu_rpc::jsonrpc::dispatch::RequestDispatcher;
//!
//! fn echo(_arena: &Arena, message: String) -> Json<String> {
//!     Json(message)
//! }
//!
//! let mut registry = HandlerRegistry::new();
//! registry.register_handler("echo", echo).unwrap();
//!
//! let message = parse_request(r#"{"jsonrpc":"2.0","method":"echo","params":["hi"],"id":1}"#);
//! let request = match message {
//!     RpcRequestMessage::Single(r) => r,
//!     _ => unreachable!(),
//! };
//! let arena = Arena::new();
//! let result = registry.dispatch(&arena, &request);
//! match result {
//!     DispatchResult::Result(json) => {
//!         assert_eq!(write_success(request.id.clone().unwrap(), &json), r#"{"jsonrpc":"2.0","result":"hi","id":1}"#);
//!     }
//!     other => panic!("unexpected: {other:?}"),
//! }
//! ```

pub mod arena;
pub mod codec;
pub mod dispatch;
pub mod error;
pub mod pipeline;
pub mod registry;
pub mod types;

pub use dispatch::{FnDispatcher, RequestDispatcher, ResponseDispatcher};
pub use error::{Error, ErrorCode, JsonRpcError, Result};
pub use pipeline::{run_request, run_request_to_string, run_response, RunStatus};
pub use registry::HandlerRegistry;
pub use types::{DispatchResult, RpcId, RpcRequest, RpcRequestMessage, RpcResponse, RpcResponseMessage};
