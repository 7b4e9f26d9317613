// Copyright (c) 2025 Mauka MCP Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! The reflective handler registry (C6).
//!
//! [`HandlerRegistry`] binds method names to native functions via the
//! [`Handler`] trait, giving each registered method its own [`Arena`] and
//! dispatching through [`super::dispatch::RequestDispatcher`] the same way any
//! other dispatcher would.

pub mod descriptor;
pub mod handler_fn;
pub mod params;

use std::any::Any;
use std::collections::HashMap;

pub use descriptor::{HandlerDescriptor, ParamKind, ReturnKind};
pub use handler_fn::{Handler, HandlerOutcome, HandlerReturn, Json, WithContext, MAX_ARITY};
pub use params::ParamSource;

use super::arena::Arena;
use super::dispatch::RequestDispatcher;
use super::error::JsonRpcError;
use super::types::{DispatchResult, RpcRequest};

/// A failure that can occur while registering a handler.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistrationError {
    /// Method names beginning with `rpc.` are reserved by the specification.
    #[error("method name {0:?} is reserved (the \"rpc.\" prefix is reserved)")]
    ReservedMethodName(String),

    /// A method name was empty.
    #[error("method name must not be empty")]
    EmptyMethodName,

    /// A method with this name is already registered.
    #[error("method {0:?} is already registered")]
    AlreadyRegistered(String),

    /// The handler declares more parameters than the registry supports.
    #[error("handler for {0:?} declares more than {MAX_ARITY} parameters")]
    TooManyParameters(String),
}

struct HandlerEntry {
    descriptor: HandlerDescriptor,
    context: Option<Box<dyn Any + Send + Sync>>,
    invoker: Box<dyn Fn(Option<&dyn Any>, &Arena, &ParamSource<'_>) -> Result<HandlerOutcome, JsonRpcError> + Send + Sync>,
    arena: Arena,
}

/// Registers native handlers against method names and dispatches requests to
/// them, each with its own per-method arena.
///
/// A registry implements [`RequestDispatcher`] directly, so it can be handed
/// to the request pipeline (C4) exactly like any other dispatcher. The
/// `arena` parameter on [`RequestDispatcher::dispatch`] is ignored by this
/// implementation — each entry owns its own arena instead, since the
/// registry's resource model scopes memory to one arena per registered
/// handler, not per dispatch call.
#[derive(Default)]
pub struct HandlerRegistry {
    methods: HashMap<String, HandlerEntry>,
    on_fallback: Option<Box<dyn Fn(&RpcRequest) -> DispatchResult + Send + Sync>>,
    on_before: Option<Box<dyn Fn(&RpcRequest) + Send + Sync>>,
    on_after: Option<Box<dyn Fn(&RpcRequest, &DispatchResult) + Send + Sync>>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            methods: HashMap::new(),
            on_fallback: None,
            on_before: None,
            on_after: None,
        }
    }

    /// Installs a fallback invoked for requests whose method isn't
    /// registered, in place of the default `MethodNotFound` response.
    pub fn set_fallback<F>(&mut self, fallback: F)
    where
        F: Fn(&RpcRequest) -> DispatchResult + Send + Sync + 'static,
    {
        self.on_fallback = Some(Box::new(fallback));
    }

    /// Installs a hook run synchronously just before a request is dispatched.
    pub fn set_on_before<F>(&mut self, hook: F)
    where
        F: Fn(&RpcRequest) + Send + Sync + 'static,
    {
        self.on_before = Some(Box::new(hook));
    }

    /// Installs a hook run synchronously just after a request has been
    /// dispatched, given the result that will be returned.
    pub fn set_on_after<F>(&mut self, hook: F)
    where
        F: Fn(&RpcRequest, &DispatchResult) + Send + Sync + 'static,
    {
        self.on_after = Some(Box::new(hook));
    }

    fn validate_name(&self, method: &str) -> Result<(), RegistrationError> {
        if method.is_empty() {
            return Err(RegistrationError::EmptyMethodName);
        }
        if method.starts_with("rpc.") {
            return Err(RegistrationError::ReservedMethodName(method.to_string()));
        }
        if self.methods.contains_key(method) {
            return Err(RegistrationError::AlreadyRegistered(method.to_string()));
        }
        Ok(())
    }

    fn register_typed<Args, H>(
        &mut self,
        method: String,
        context: Option<Box<dyn Any + Send + Sync>>,
        handler: H,
    ) -> Result<(), RegistrationError>
    where
        H: Handler<Args> + Send + Sync + 'static,
        Args: 'static,
    {
        self.validate_name(&method)?;
        let descriptor = H::describe();
        if descriptor.arity() > MAX_ARITY {
            return Err(RegistrationError::TooManyParameters(method));
        }
        let invoker: Box<
            dyn Fn(Option<&dyn Any>, &Arena, &ParamSource<'_>) -> Result<HandlerOutcome, JsonRpcError> + Send + Sync,
        > = Box::new(move |ctx, arena, params| handler.call(ctx, arena, params));
        self.methods.insert(
            method,
            HandlerEntry {
                descriptor,
                context,
                invoker,
                arena: Arena::new(),
            },
        );
        Ok(())
    }

    /// Returns the descriptor for a registered method, if any.
    pub fn descriptor(&self, method: &str) -> Option<&HandlerDescriptor> {
        self.methods.get(method).map(|e| &e.descriptor)
    }

    /// Returns the number of registered methods.
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// Returns true if no methods are registered.
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Registers `handler` under `method`, with no context value.
    pub fn register_handler<Args, H>(&mut self, method: impl Into<String>, handler: H) -> Result<(), RegistrationError>
    where
        H: Handler<Args> + Send + Sync + 'static,
        Args: 'static,
    {
        self.register_typed(method.into(), None, handler)
    }

    /// Registers `handler` under `method`, bound to `context`.
    pub fn register_handler_with_context<Args, H, C>(
        &mut self,
        method: impl Into<String>,
        context: C,
        handler: H,
    ) -> Result<(), RegistrationError>
    where
        H: Handler<Args> + Send + Sync + 'static,
        C: Any + Send + Sync + 'static,
        Args: 'static,
    {
        self.register_typed(method.into(), Some(Box::new(context)), handler)
    }
}

impl RequestDispatcher for HandlerRegistry {
    fn dispatch(&self, _arena: &Arena, request: &RpcRequest) -> DispatchResult {
        if let Some(on_before) = &self.on_before {
            on_before(request);
        }

        let Some(entry) = self.methods.get(&request.method) else {
            crate::logging::log_dispatch_miss(&request.method);
            let result = match &self.on_fallback {
                Some(fallback) => fallback(request),
                None => DispatchResult::err(-32601, "Method not found."),
            };
            if let Some(on_after) = &self.on_after {
                on_after(request, &result);
            }
            return result;
        };

        let ctx_ref: Option<&dyn Any> = entry.context.as_ref().map(|c| c.as_ref() as &dyn Any);
        let params = ParamSource::new(request.params.as_ref());
        let result = match (entry.invoker)(ctx_ref, &entry.arena, &params) {
            Ok(HandlerOutcome::Void) => DispatchResult::None,
            Ok(HandlerOutcome::Value(value)) => {
                if request.is_notification() {
                    DispatchResult::None
                } else {
                    DispatchResult::Result(value.to_string())
                }
            }
            Ok(HandlerOutcome::Raw(result)) => result,
            Err(err) => {
                crate::logging::log_handler_failure(&request.method, &err.message);
                if request.is_notification() {
                    DispatchResult::None
                } else {
                    DispatchResult::Err {
                        code: err.code,
                        message: err.message,
                        data: err.data,
                    }
                }
            }
        };

        if let Some(on_after) = &self.on_after {
            on_after(request, &result);
        }

        result
    }

    fn dispatch_end(&self, _arena: &Arena, request: &RpcRequest, _result: &DispatchResult) {
        if let Some(entry) = self.methods.get(&request.method) {
            let bytes_before = entry.arena.allocated_bytes();
            entry.arena.reset();
            crate::logging::log_arena_reset(bytes_before);
        }
    }
}
