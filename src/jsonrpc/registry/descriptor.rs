// Copyright (c) 2025 Mauka MCP Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Handler descriptors: the metadata the registry derives by reflecting on a
//! handler's signature at registration time.

/// How a single user-declared parameter is classified.
///
/// This classification is informational — built from
/// [`std::any::type_name`] as a best-effort label for diagnostics and
/// registration-time checks. Actual decoding always goes through
/// [`serde::de::DeserializeOwned`] directly and does not depend on this
/// classification being exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Receives the raw `serde_json::Value` verbatim, no decoding.
    Value,
    /// A JSON scalar: bool, integer, float, or string.
    Primitive,
    /// A JSON object decoded into a user-defined struct.
    Struct,
    /// `Option<T>`, accepting JSON `null` or an absent slot.
    Optional,
    /// `Vec<T>`, accepting a nested JSON array.
    Sequence,
}

/// How a handler's return value maps onto a [`super::handler_fn::HandlerOutcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnKind {
    /// `()`: the handler never produces a reply.
    Void,
    /// `Json<T>`: the handler's value is serialized into the result field.
    Value,
    /// `Result<_, E>`: an `Err` becomes a `ServerError` carrying `E`'s display.
    ErrorUnion,
    /// `DispatchResult`: passed through unchanged.
    DispatchResult,
}

/// Reflected metadata about one registered handler.
#[derive(Debug, Clone)]
pub struct HandlerDescriptor {
    /// Whether the handler's first parameter is a context value.
    pub has_ctx: bool,
    /// Whether the handler takes the per-invocation arena (always true for
    /// handlers bound through this registry).
    pub has_arena: bool,
    /// Classification of each user-declared parameter, in declared order.
    pub param_kinds: Vec<ParamKind>,
    /// How the return value maps to a reply.
    pub return_kind: ReturnKind,
}

impl HandlerDescriptor {
    /// Number of user-declared parameters.
    pub fn arity(&self) -> usize {
        self.param_kinds.len()
    }
}

/// Best-effort classification of `T` via its type name.
///
/// This is a diagnostic aid, not a dispatch mechanism: whatever it returns,
/// decoding a parameter of type `T` always goes through
/// `serde_json::from_value::<T>`, which works correctly regardless of how
/// this function classifies `T`.
pub fn infer_param_kind<T: ?Sized>() -> ParamKind {
    let name = std::any::type_name::<T>();
    if name.starts_with("core::option::Option<") || name.starts_with("Option<") {
        ParamKind::Optional
    } else if name.starts_with("alloc::vec::Vec<") || name.starts_with("Vec<") {
        ParamKind::Sequence
    } else if name.ends_with("serde_json::value::Value") || name.ends_with("::Value") {
        ParamKind::Value
    } else if matches!(
        name,
        "bool" | "i8" | "i16" | "i32" | "i64" | "i128" | "isize"
            | "u8" | "u16" | "u32" | "u64" | "u128" | "usize"
            | "f32" | "f64" | "&str" | "alloc::string::String"
    ) {
        ParamKind::Primitive
    } else {
        ParamKind::Struct
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_primitives() {
        assert_eq!(infer_param_kind::<bool>(), ParamKind::Primitive);
        assert_eq!(infer_param_kind::<i64>(), ParamKind::Primitive);
        assert_eq!(infer_param_kind::<String>(), ParamKind::Primitive);
    }

    #[test]
    fn classifies_containers() {
        assert_eq!(infer_param_kind::<Option<i64>>(), ParamKind::Optional);
        assert_eq!(infer_param_kind::<Vec<String>>(), ParamKind::Sequence);
        assert_eq!(infer_param_kind::<serde_json::Value>(), ParamKind::Value);
    }

    #[derive(serde::Deserialize)]
    struct Point {
        #[allow(dead_code)]
        x: i64,
    }

    #[test]
    fn classifies_unrecognized_types_as_struct() {
        assert_eq!(infer_param_kind::<Point>(), ParamKind::Struct);
    }
}
