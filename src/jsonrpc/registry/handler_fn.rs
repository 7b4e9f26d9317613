// Copyright (c) 2025 Mauka MCP Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! The reflective `Handler<Args>` trait.
//!
//! A blanket implementation is generated for each argument-tuple arity up to
//! [`MAX_ARITY`], mirroring the "one trait, many blanket impls keyed by tuple
//! shape" pattern used for `axum`'s own `Handler` trait, generalized here
//! from "one fixed argument shape" to "one instance per declared arity."
//! Context-taking handlers get a second family of impls keyed by a
//! [`WithContext<C>`] marker occupying the tuple's leading slot, which keeps
//! the two families structurally distinct so they don't overlap under
//! Rust's coherence rules.

use std::any::Any;
use std::fmt::Display;
use std::marker::PhantomData;

use serde::Serialize;

use super::descriptor::{infer_param_kind, HandlerDescriptor, ReturnKind};
use super::params::{decode_one, ParamSource};
use crate::jsonrpc::arena::Arena;
use crate::jsonrpc::error::JsonRpcError;
use crate::jsonrpc::types::DispatchResult;

/// Largest number of user-declared parameters a handler may take.
pub const MAX_ARITY: usize = 9;

/// The normalized result of a handler invocation, before the registry maps
/// it onto a [`DispatchResult`].
#[derive(Debug)]
pub enum HandlerOutcome {
    /// The handler produces no reply.
    Void,
    /// A value to serialize into the response's `result` field.
    Value(serde_json::Value),
    /// A [`DispatchResult`] the handler built itself, passed through as-is.
    Raw(DispatchResult),
}

/// Marks a handler's return value as one to be JSON-serialized into the
/// response. Required rather than a bare `T: Serialize` blanket impl so that
/// `()`, `DispatchResult`, and `Result<_, _>` can each get their own impl of
/// [`HandlerReturn`] without overlapping it.
pub struct Json<T>(pub T);

/// A handler's return value, normalized into a [`HandlerOutcome`].
pub trait HandlerReturn {
    /// Converts this return value into its [`HandlerOutcome`].
    fn into_outcome(self) -> Result<HandlerOutcome, JsonRpcError>;

    /// The [`ReturnKind`] this implementation represents, for descriptors.
    fn kind() -> ReturnKind;
}

impl HandlerReturn for () {
    fn into_outcome(self) -> Result<HandlerOutcome, JsonRpcError> {
        Ok(HandlerOutcome::Void)
    }

    fn kind() -> ReturnKind {
        ReturnKind::Void
    }
}

impl<T: Serialize> HandlerReturn for Json<T> {
    fn into_outcome(self) -> Result<HandlerOutcome, JsonRpcError> {
        serde_json::to_value(self.0)
            .map(HandlerOutcome::Value)
            .map_err(|e| JsonRpcError::internal_error(e.to_string()))
    }

    fn kind() -> ReturnKind {
        ReturnKind::Value
    }
}

impl HandlerReturn for DispatchResult {
    fn into_outcome(self) -> Result<HandlerOutcome, JsonRpcError> {
        Ok(HandlerOutcome::Raw(self))
    }

    fn kind() -> ReturnKind {
        ReturnKind::DispatchResult
    }
}

impl<T, E> HandlerReturn for Result<T, E>
where
    T: HandlerReturn,
    E: Display,
{
    fn into_outcome(self) -> Result<HandlerOutcome, JsonRpcError> {
        match self {
            Ok(value) => value.into_outcome(),
            Err(err) => Err(JsonRpcError::server_error(err.to_string())),
        }
    }

    fn kind() -> ReturnKind {
        ReturnKind::ErrorUnion
    }
}

/// Marker occupying a context-taking handler's leading tuple slot, so
/// `Handler<(WithContext<C>, T1, ..)>` is a structurally distinct
/// instantiation from the context-free `Handler<(T1, ..)>`.
pub struct WithContext<C>(PhantomData<C>);

/// A native function bound to a JSON-RPC method.
///
/// `Args` is a tuple encoding both the arity and (via [`WithContext`]) the
/// presence of a context parameter; callers never name it directly; it is
/// inferred from the handler passed to
/// [`super::HandlerRegistry::register`].
pub trait Handler<Args>: 'static {
    /// Invokes the handler.
    ///
    /// `ctx` is `Some` only when the handler was registered with a context;
    /// implementations that don't take one ignore it.
    fn call(
        &self,
        ctx: Option<&dyn Any>,
        arena: &Arena,
        params: &ParamSource<'_>,
    ) -> Result<HandlerOutcome, JsonRpcError>;

    /// Builds this handler's [`HandlerDescriptor`] by reflecting on `Args`.
    fn describe() -> HandlerDescriptor;
}

macro_rules! impl_handler {
    ($arity:expr; $($T:ident),*) => {
        #[allow(non_snake_case, unused_variables, unused_mut)]
        impl<F, R, $($T,)*> Handler<($($T,)*)> for F
        where
            F: Fn(&Arena, $($T,)*) -> R + 'static,
            R: HandlerReturn,
            $($T: serde::de::DeserializeOwned + 'static,)*
        {
            fn call(
                &self,
                _ctx: Option<&dyn Any>,
                arena: &Arena,
                params: &ParamSource<'_>,
            ) -> Result<HandlerOutcome, JsonRpcError> {
                let mut values = params.decode_slots($arity)?.into_iter();
                $(let $T: $T = decode_one(values.next());)*
                $(let $T = $T?;)*
                (self)(arena, $($T,)*).into_outcome()
            }

            fn describe() -> HandlerDescriptor {
                HandlerDescriptor {
                    has_ctx: false,
                    has_arena: true,
                    param_kinds: vec![$(infer_param_kind::<$T>()),*],
                    return_kind: R::kind(),
                }
            }
        }

        #[allow(non_snake_case, unused_variables, unused_mut)]
        impl<F, C, R, $($T,)*> Handler<(WithContext<C>, $($T,)*)> for F
        where
            F: Fn(&C, &Arena, $($T,)*) -> R + 'static,
            C: 'static,
            R: HandlerReturn,
            $($T: serde::de::DeserializeOwned + 'static,)*
        {
            fn call(
                &self,
                ctx: Option<&dyn Any>,
                arena: &Arena,
                params: &ParamSource<'_>,
            ) -> Result<HandlerOutcome, JsonRpcError> {
                let ctx = ctx
                    .and_then(|c| c.downcast_ref::<C>())
                    .expect("handler registered with a context must be invoked with one of the same type");
                let mut values = params.decode_slots($arity)?.into_iter();
                $(let $T: $T = decode_one(values.next());)*
                $(let $T = $T?;)*
                (self)(ctx, arena, $($T,)*).into_outcome()
            }

            fn describe() -> HandlerDescriptor {
                HandlerDescriptor {
                    has_ctx: true,
                    has_arena: true,
                    param_kinds: vec![$(infer_param_kind::<$T>()),*],
                    return_kind: R::kind(),
                }
            }
        }
    };
}

impl_handler!(0;);
impl_handler!(1; T1);
impl_handler!(2; T1, T2);
impl_handler!(3; T1, T2, T3);
impl_handler!(4; T1, T2, T3, T4);
impl_handler!(5; T1, T2, T3, T4, T5);
impl_handler!(6; T1, T2, T3, T4, T5, T6);
impl_handler!(7; T1, T2, T3, T4, T5, T6, T7);
impl_handler!(8; T1, T2, T3, T4, T5, T6, T7, T8);
impl_handler!(9; T1, T2, T3, T4, T5, T6, T7, T8, T9);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn add(_arena: &Arena, a: i64, b: i64) -> Json<i64> {
        Json(a + b)
    }

    #[test]
    fn zero_arity_handler_describes_correctly() {
        fn ping(_arena: &Arena) -> Json<&'static str> {
            Json("pong")
        }
        let descriptor = <fn(&Arena) -> Json<&'static str> as Handler<()>>::describe();
        assert_eq!(descriptor.arity(), 0);
        assert!(!descriptor.has_ctx);
        let _: fn(&Arena) -> Json<&'static str> = ping;
    }

    #[test]
    fn two_arity_handler_invokes_and_serializes() {
        let arena = Arena::new();
        let params = json!([2, 3]);
        let source = ParamSource::new(Some(&params));
        let outcome = Handler::<(i64, i64)>::call(&add, None, &arena, &source).unwrap();
        match outcome {
            HandlerOutcome::Value(v) => assert_eq!(v, json!(5)),
            _ => panic!("expected Value"),
        }
    }

    #[test]
    fn context_handler_downcasts_context() {
        struct Ctx {
            prefix: String,
        }
        fn greet(ctx: &Ctx, _arena: &Arena, name: String) -> Json<String> {
            Json(format!("{}{}", ctx.prefix, name))
        }
        let ctx = Ctx { prefix: "hi, ".to_string() };
        let arena = Arena::new();
        let params = json!(["world"]);
        let source = ParamSource::new(Some(&params));
        let outcome = Handler::<(WithContext<Ctx>, String)>::call(
            &greet,
            Some(&ctx as &dyn Any),
            &arena,
            &source,
        )
        .unwrap();
        match outcome {
            HandlerOutcome::Value(v) => assert_eq!(v, json!("hi, world")),
            _ => panic!("expected Value"),
        }
    }

    #[test]
    fn error_union_maps_err_to_server_error() {
        fn fails(_arena: &Arena) -> Result<Json<i64>, String> {
            Err("boom".to_string())
        }
        let arena = Arena::new();
        let source = ParamSource::new(None);
        let err = Handler::<()>::call(&fails, None, &arena, &source).unwrap_err();
        assert_eq!(err.code, -32000);
        assert_eq!(err.message, "boom");
    }

    #[test]
    fn void_return_produces_no_reply() {
        fn log_it(_arena: &Arena, _message: String) {}
        let arena = Arena::new();
        let params = json!(["hello"]);
        let source = ParamSource::new(Some(&params));
        let outcome = Handler::<(String,)>::call(&log_it, None, &arena, &source).unwrap();
        assert!(matches!(outcome, HandlerOutcome::Void));
    }
}
