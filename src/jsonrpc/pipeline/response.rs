// Copyright (c) 2025 Mauka MCP Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! The response pipeline (C5): parse → dispatch for incoming responses,
//! symmetric to the request pipeline but producing no output of its own.
//!
//! This pipeline does not track pending requests, assign timeouts, or
//! correlate by id — a caller that wants request/response correlation builds
//! it on top using the `id` values it chose when composing requests.

use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::warn;

use crate::jsonrpc::arena::Arena;
use crate::jsonrpc::codec::parse_response;
use crate::jsonrpc::dispatch::ResponseDispatcher;
use crate::jsonrpc::types::RpcResponseMessage;

/// Runs one response/batch message through the pipeline, forwarding each
/// parsed [`crate::jsonrpc::types::RpcResponse`] to `dispatcher`.
///
/// Failures from `dispatcher.dispatch` (a panic) are caught and logged, not
/// propagated, so a single bad reply cannot tear down a client's receive
/// loop.
pub fn run_response<D: ResponseDispatcher>(dispatcher: &D, arena: &Arena, raw: &str) {
    match parse_response(raw) {
        RpcResponseMessage::Single(response) => dispatch_guarded(dispatcher, arena, &response),
        RpcResponseMessage::Batch(responses) => {
            for response in &responses {
                dispatch_guarded(dispatcher, arena, response);
            }
        }
    }
}

fn dispatch_guarded<D: ResponseDispatcher>(dispatcher: &D, arena: &Arena, response: &crate::jsonrpc::types::RpcResponse) {
    if let Err(panic) = catch_unwind(AssertUnwindSafe(|| dispatcher.dispatch(arena, response))) {
        let name = panic
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| panic.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "response dispatcher panicked".to_string());
        warn!(id = %response.id, failure = %name, "response dispatcher failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    struct CollectingDispatcher {
        seen: Arc<Mutex<Vec<String>>>,
    }

    impl ResponseDispatcher for CollectingDispatcher {
        fn dispatch(&self, _arena: &Arena, response: &crate::jsonrpc::types::RpcResponse) {
            self.seen.lock().push(response.id.to_string());
        }
    }

    #[test]
    fn single_response_is_forwarded() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let dispatcher = CollectingDispatcher { seen: seen.clone() };
        let arena = Arena::new();
        run_response(&dispatcher, &arena, r#"{"jsonrpc":"2.0","result":19,"id":1}"#);
        assert_eq!(*seen.lock(), vec!["1".to_string()]);
    }

    #[test]
    fn batch_responses_are_forwarded_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let dispatcher = CollectingDispatcher { seen: seen.clone() };
        let arena = Arena::new();
        let raw = r#"[{"jsonrpc":"2.0","result":1,"id":1},{"jsonrpc":"2.0","result":2,"id":2}]"#;
        run_response(&dispatcher, &arena, raw);
        assert_eq!(*seen.lock(), vec!["1".to_string(), "2".to_string()]);
    }

    #[test]
    fn panicking_dispatcher_does_not_propagate() {
        struct PanicDispatcher;
        impl ResponseDispatcher for PanicDispatcher {
            fn dispatch(&self, _arena: &Arena, _response: &crate::jsonrpc::types::RpcResponse) {
                panic!("callback exploded");
            }
        }
        let arena = Arena::new();
        run_response(&PanicDispatcher, &arena, r#"{"jsonrpc":"2.0","result":1,"id":1}"#);
    }
}
