// Copyright (c) 2025 Mauka MCP Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! The request pipeline (C4): parse → dispatch → compose for incoming
//! requests, including batch assembly and notification suppression.

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::{debug, warn};

use crate::jsonrpc::arena::Arena;
use crate::jsonrpc::codec::{parse_request, write_error, write_success};
use crate::jsonrpc::dispatch::RequestDispatcher;
use crate::jsonrpc::types::{DispatchResult, RpcId, RpcRequest, RpcRequestMessage};

/// The outcome of running one frame's worth of request bytes through the
/// pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Nothing was written (an all-notification message, or a notification
    /// that resolved to `None`/an error).
    NoReply,
    /// A reply was written to the output.
    Replied,
    /// A reply may or may not have been written; either way, the driving
    /// loop should stop reading further frames after this one.
    EndStream,
}

/// Runs one request/notification/batch message through the pipeline,
/// writing any reply to `out`.
pub fn run_request<D, W>(dispatcher: &D, arena: &Arena, raw: &str, out: &mut W) -> Result<RunStatus, fmt::Error>
where
    D: RequestDispatcher,
    W: fmt::Write,
{
    match parse_request(raw) {
        RpcRequestMessage::Single(request) => run_single(dispatcher, arena, &request, out),
        RpcRequestMessage::Batch(requests) => run_batch(dispatcher, arena, &requests, out),
    }
}

/// Convenience wrapper over [`run_request`] that captures the reply (if any)
/// into an owned `String`.
pub fn run_request_to_string<D: RequestDispatcher>(dispatcher: &D, arena: &Arena, raw: &str) -> (String, RunStatus) {
    let mut out = String::new();
    let status = run_request(dispatcher, arena, raw, &mut out).expect("writing to a String never fails");
    (out, status)
}

fn run_single<D, W>(dispatcher: &D, arena: &Arena, request: &RpcRequest, out: &mut W) -> Result<RunStatus, fmt::Error>
where
    D: RequestDispatcher,
    W: fmt::Write,
{
    if let Some(error) = &request.parse_error {
        let id = request.id.clone().unwrap_or(RpcId::Null);
        warn!(code = error.code, message = %error.message, "request failed to parse");
        out.write_str(&write_error(Some(id), error.code, &error.message, error.data.clone()))?;
        return Ok(RunStatus::Replied);
    }

    let result = dispatch_guarded(dispatcher, arena, request);
    dispatcher.dispatch_end(arena, request, &result);

    let (reply, end_stream) = translate(result, request);
    match reply {
        Some(text) => {
            out.write_str(&text)?;
            Ok(if end_stream { RunStatus::EndStream } else { RunStatus::Replied })
        }
        None => Ok(if end_stream { RunStatus::EndStream } else { RunStatus::NoReply }),
    }
}

fn run_batch<D, W>(dispatcher: &D, arena: &Arena, requests: &[RpcRequest], out: &mut W) -> Result<RunStatus, fmt::Error>
where
    D: RequestDispatcher,
    W: fmt::Write,
{
    let mut entries = Vec::new();
    let mut end_stream = false;

    for request in requests {
        let mut entry = String::new();
        if run_single(dispatcher, arena, request, &mut entry)? == RunStatus::EndStream {
            end_stream = true;
        }
        if !entry.is_empty() {
            entries.push(entry);
        }
    }

    if entries.is_empty() {
        debug!("batch produced no entries; suppressing the reply");
        return Ok(if end_stream { RunStatus::EndStream } else { RunStatus::NoReply });
    }

    out.write_char('[')?;
    for (i, entry) in entries.iter().enumerate() {
        if i > 0 {
            out.write_char(',')?;
        }
        out.write_str(entry)?;
    }
    out.write_char(']')?;
    Ok(if end_stream { RunStatus::EndStream } else { RunStatus::Replied })
}

fn dispatch_guarded<D: RequestDispatcher>(dispatcher: &D, arena: &Arena, request: &RpcRequest) -> DispatchResult {
    match catch_unwind(AssertUnwindSafe(|| dispatcher.dispatch(arena, request))) {
        Ok(result) => result,
        Err(panic) => {
            let name = panic_message(panic.as_ref());
            warn!(method = %request.method, failure = %name, "handler panicked during dispatch");
            DispatchResult::err(-32000, name)
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_string()
    }
}

/// Maps a `DispatchResult` onto (optional reply text, end-stream flag),
/// applying notification suppression per the specification's notification
/// policy: notifications never produce a reply, even from an error result,
/// but still honor a nested `EndStream` request to stop the loop.
fn translate(result: DispatchResult, request: &RpcRequest) -> (Option<String>, bool) {
    let end_stream = result.is_end_stream();
    let inner = result.into_reply();

    let is_notification = request.is_notification();
    let id = request.id.clone().unwrap_or(RpcId::Null);

    let reply = match inner {
        DispatchResult::None => None,
        DispatchResult::Result(json) => {
            if is_notification {
                None
            } else {
                Some(write_success(id, &json))
            }
        }
        DispatchResult::Err { code, message, data } => {
            if is_notification {
                None
            } else {
                Some(write_error(Some(id), code, &message, data))
            }
        }
        DispatchResult::EndStream(_) => unreachable!("EndStream nesting is flattened above"),
    };

    (reply, end_stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jsonrpc::dispatch::FnDispatcher;

    #[test]
    fn single_request_success_round_trip() {
        let dispatcher = FnDispatcher::new(|_arena, _req| DispatchResult::Result("5".to_string()));
        let arena = Arena::new();
        let (text, status) = run_request_to_string(
            &dispatcher,
            &arena,
            r#"{"jsonrpc":"2.0","method":"add","params":[2,3],"id":1}"#,
        );
        assert_eq!(status, RunStatus::Replied);
        assert_eq!(text, r#"{"jsonrpc":"2.0","result":5,"id":1}"#);
    }

    #[test]
    fn notification_produces_no_reply_even_on_error() {
        let dispatcher = FnDispatcher::new(|_arena, _req| DispatchResult::err(-32000, "boom"));
        let arena = Arena::new();
        let (text, status) = run_request_to_string(
            &dispatcher,
            &arena,
            r#"{"jsonrpc":"2.0","method":"add","params":[2,3]}"#,
        );
        assert_eq!(status, RunStatus::NoReply);
        assert!(text.is_empty());
    }

    #[test]
    fn parse_error_yields_id_null_response() {
        let dispatcher = FnDispatcher::new(|_arena, _req| DispatchResult::None);
        let arena = Arena::new();
        let (text, status) = run_request_to_string(&dispatcher, &arena, "not json");
        assert_eq!(status, RunStatus::Replied);
        assert!(text.contains(r#""id":null"#));
        assert!(text.contains("-32700"));
    }

    #[test]
    fn handler_panic_becomes_server_error() {
        let dispatcher = FnDispatcher::new(|_arena, _req| panic!("divide by zero"));
        let arena = Arena::new();
        let (text, status) = run_request_to_string(
            &dispatcher,
            &arena,
            r#"{"jsonrpc":"2.0","method":"divide","params":[],"id":1}"#,
        );
        assert_eq!(status, RunStatus::Replied);
        assert!(text.contains("divide by zero"));
        assert!(text.contains("-32000"));
    }

    #[test]
    fn batch_omits_notifications_and_preserves_order() {
        let dispatcher = FnDispatcher::new(|_arena, req| {
            if req.is_notification() {
                DispatchResult::None
            } else {
                DispatchResult::Result(format!("\"{}\"", req.method))
            }
        });
        let arena = Arena::new();
        let raw = r#"[
            {"jsonrpc":"2.0","method":"first","id":1},
            {"jsonrpc":"2.0","method":"notify_only"},
            {"jsonrpc":"2.0","method":"second","id":2}
        ]"#;
        let (text, status) = run_request_to_string(&dispatcher, &arena, raw);
        assert_eq!(status, RunStatus::Replied);
        assert_eq!(
            text,
            r#"[{"jsonrpc":"2.0","result":"first","id":1},{"jsonrpc":"2.0","result":"second","id":2}]"#
        );
    }

    #[test]
    fn all_notification_batch_suppresses_entire_reply() {
        let dispatcher = FnDispatcher::new(|_arena, _req| DispatchResult::None);
        let arena = Arena::new();
        let raw = r#"[{"jsonrpc":"2.0","method":"a"},{"jsonrpc":"2.0","method":"b"}]"#;
        let (text, status) = run_request_to_string(&dispatcher, &arena, raw);
        assert_eq!(status, RunStatus::NoReply);
        assert!(text.is_empty());
    }

    #[test]
    fn end_stream_signals_loop_to_stop() {
        let dispatcher =
            FnDispatcher::new(|_arena, _req| DispatchResult::EndStream(Box::new(DispatchResult::Result("1".to_string()))));
        let arena = Arena::new();
        let (text, status) = run_request_to_string(
            &dispatcher,
            &arena,
            r#"{"jsonrpc":"2.0","method":"shutdown","id":1}"#,
        );
        assert_eq!(status, RunStatus::EndStream);
        assert_eq!(text, r#"{"jsonrpc":"2.0","result":1,"id":1}"#);
    }
}
