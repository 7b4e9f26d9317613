// Copyright (c) 2025 Mauka MCP Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Maps a request's `params` value onto a handler's declared parameter slots.

use serde_json::Value;

use crate::jsonrpc::error::JsonRpcError;

/// A request's `params` field, not yet mapped onto a specific handler's
/// parameter list.
pub struct ParamSource<'a> {
    params: Option<&'a Value>,
}

impl<'a> ParamSource<'a> {
    /// Wraps a request's `params` value.
    pub fn new(params: Option<&'a Value>) -> Self {
        Self { params }
    }

    /// Maps `params` onto `arity` positional slots, following §4.6's
    /// parameter-mapping strategy:
    /// - absent params: only `arity == 0` is accepted;
    /// - a positional array: its length must equal `arity`;
    /// - a named object: only `arity == 1` is accepted, and the whole object
    ///   is handed to that single (struct) parameter.
    pub fn decode_slots(&self, arity: usize) -> Result<Vec<Value>, JsonRpcError> {
        match self.params {
            None => {
                if arity == 0 {
                    Ok(Vec::new())
                } else {
                    Err(JsonRpcError::invalid_params(format!(
                        "method requires {arity} parameter(s), but none were supplied"
                    )))
                }
            }
            Some(Value::Array(items)) => {
                if items.len() != arity {
                    Err(JsonRpcError::invalid_params(format!(
                        "expected {arity} positional parameter(s), got {}",
                        items.len()
                    )))
                } else {
                    Ok(items.clone())
                }
            }
            Some(obj @ Value::Object(_)) => {
                if arity != 1 {
                    Err(JsonRpcError::invalid_params(
                        "named params are only supported for handlers with exactly one struct parameter",
                    ))
                } else {
                    Ok(vec![obj.clone()])
                }
            }
            Some(_) => Err(JsonRpcError::invalid_params("params must be an array or object")),
        }
    }
}

/// Decodes one positional slot into `T`, treating a missing slot as JSON
/// `null` (so `Option<T>` parameters can be omitted).
pub fn decode_one<T: serde::de::DeserializeOwned>(value: Option<Value>) -> Result<T, JsonRpcError> {
    let value = value.unwrap_or(Value::Null);
    serde_json::from_value(value).map_err(|e| JsonRpcError::invalid_params(e.to_string()))
}
