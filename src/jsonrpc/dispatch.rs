// Copyright (c) 2025 Mauka MCP Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Dispatcher capability traits.
//!
//! The request and response pipelines (C4/C5) are generic over these small
//! trait objects rather than over a single concrete type, so a
//! [`super::registry::HandlerRegistry`], a user-written custom dispatcher,
//! and a fallback-only dispatcher can all drive the same pipeline.

use super::arena::Arena;
use super::types::{DispatchResult, RpcRequest, RpcResponse};

/// Consumes a parsed request and produces a [`DispatchResult`].
///
/// Implementations may fail (panic or return an internal error through their
/// own means); the pipeline treats any such failure as a `ServerError`
/// response, never propagating it to the caller of `run_request`.
pub trait RequestDispatcher {
    /// Dispatches a single request, using `arena` for any allocations the
    /// invocation needs.
    fn dispatch(&self, arena: &Arena, request: &RpcRequest) -> DispatchResult;

    /// Called once after the pipeline has finished consuming the
    /// `DispatchResult` from `dispatch`, to release per-invocation state
    /// (typically resetting `arena`).
    fn dispatch_end(&self, arena: &Arena, request: &RpcRequest, result: &DispatchResult) {
        let _ = (request, result);
        arena.reset();
    }
}

/// Consumes a parsed response. Used by client code driving the response
/// pipeline (C5).
pub trait ResponseDispatcher {
    /// Handles a single parsed response. Failures should be handled
    /// internally (e.g. logged); the response pipeline does not propagate
    /// them, to keep a client's receive loop alive across a bad reply.
    fn dispatch(&self, arena: &Arena, response: &RpcResponse);
}

/// A [`RequestDispatcher`] built from a plain closure, useful for tests and
/// small embedded use cases that don't need a full [`super::registry::HandlerRegistry`].
pub struct FnDispatcher<F>
where
    F: Fn(&Arena, &RpcRequest) -> DispatchResult,
{
    f: F,
}

impl<F> FnDispatcher<F>
where
    F: Fn(&Arena, &RpcRequest) -> DispatchResult,
{
    /// Wraps `f` as a [`RequestDispatcher`].
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> RequestDispatcher for FnDispatcher<F>
where
    F: Fn(&Arena, &RpcRequest) -> DispatchResult,
{
    fn dispatch(&self, arena: &Arena, request: &RpcRequest) -> DispatchResult {
        (self.f)(arena, request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fn_dispatcher_forwards_to_closure() {
        let dispatcher = FnDispatcher::new(|_arena, _req| DispatchResult::Result("1".to_string()));
        let arena = Arena::new();
        let request = RpcRequest::with_integer_id("ping", None, 1);
        match dispatcher.dispatch(&arena, &request) {
            DispatchResult::Result(s) => assert_eq!(s, "1"),
            _ => panic!("expected Result"),
        }
    }

    #[test]
    fn dispatch_end_resets_arena_by_default() {
        let dispatcher = FnDispatcher::new(|_arena, _req| DispatchResult::None);
        let arena = Arena::new();
        arena.alloc_str("scratch");
        let request = RpcRequest::notification("noop", None);
        let result = dispatcher.dispatch(&arena, &request);
        dispatcher.dispatch_end(&arena, &request, &result);
        assert_eq!(arena.allocated_bytes(), 0);
    }
}
