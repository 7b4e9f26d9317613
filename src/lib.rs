//! Honu RPC: a JSON-RPC 2.0 library.
//!
//! Four tightly-coupled subsystems turn a byte stream into invoked native
//! handlers and back to a byte stream:
//!
//! - [`jsonrpc::codec`] — parse and compose JSON-RPC 2.0 requests, responses,
//!   and batches.
//! - [`framer`] — delineate messages on a byte stream via a delimiter or a
//!   `Content-Length` header.
//! - [`jsonrpc::dispatch`] — the small capability traits the pipelines drive.
//! - [`jsonrpc::pipeline`] — orchestrate parse → dispatch → compose for both
//!   directions of traffic.
//! - [`jsonrpc::registry`] — reflectively bind native functions to method
//!   names, with per-invocation arena memory.
//!
//! Everything else — transports, example servers, CLI demos — is an external
//! collaborator that consumes the core through a byte reader, a byte writer,
//! a dispatcher handle, and a handler signature. This crate ships exactly one
//! such collaborator, a stdio demo binary, to exercise the library end to
//! end; it is not part of the library's public contract.

pub mod config;
pub mod error;
pub mod framer;
pub mod jsonrpc;
pub mod logging;

/// Version of this crate, as declared in `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
