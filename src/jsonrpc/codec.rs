// Copyright (c) 2025 Mauka MCP Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Parsing and composing JSON-RPC 2.0 messages.
//!
//! Parsing never fails outright: malformed input always yields *something* —
//! a well-formed request, a request carrying a `parse_error` with whatever
//! `id` could be recovered, or a bare parse-error carrier with `id: null`.
//! Composing builds the wire envelope directly rather than going through a
//! derived `Serialize` impl, since result payloads arrive pre-serialized from
//! the registry and must be inlined verbatim.

use serde_json::value::RawValue;
use serde_json::{Map, Value};
use std::collections::HashSet;

use super::error::{ErrorCode, JsonRpcError};
use super::types::{RpcId, RpcRequest, RpcRequestMessage, RpcResponse, RpcResponseMessage};

/// Largest integer value that round-trips exactly through an IEEE-754 double
/// (JavaScript's `Number.MAX_SAFE_INTEGER`).
const MAX_SAFE_INTEGER: i64 = 9_007_199_254_740_991;
/// `Number.MIN_SAFE_INTEGER`.
const MIN_SAFE_INTEGER: i64 = -9_007_199_254_740_991;

/// Parses a JSON-RPC request message: a single request or a batch.
///
/// Always returns a value; malformed input is represented as a request (or
/// batch entry) with `parse_error` set rather than as a `Result::Err`.
pub fn parse_request(raw: &str) -> RpcRequestMessage {
    let trimmed = raw.trim();
    let value: Value = match serde_json::from_str(trimmed) {
        Ok(v) => v,
        Err(_) => return RpcRequestMessage::Single(parse_error_request(JsonRpcError::parse_error())),
    };

    match value {
        Value::Array(arr) => {
            if arr.is_empty() {
                return RpcRequestMessage::Single(parse_error_request(JsonRpcError::invalid_request()));
            }
            match serde_json::from_str::<Vec<&RawValue>>(trimmed) {
                Ok(raws) => RpcRequestMessage::Batch(
                    raws.into_iter().map(|raw| parse_single_request(raw.get())).collect(),
                ),
                Err(_) => RpcRequestMessage::Single(parse_error_request(JsonRpcError::parse_error())),
            }
        }
        Value::Object(_) => RpcRequestMessage::Single(parse_single_request(trimmed)),
        _ => RpcRequestMessage::Single(parse_error_request(JsonRpcError::new(
            ErrorCode::InvalidRequest,
            "request must be an object or array",
        ))),
    }
}

/// Parses a JSON-RPC response message: a single response or a batch.
pub fn parse_response(raw: &str) -> RpcResponseMessage {
    let trimmed = raw.trim();
    let value: Value = match serde_json::from_str(trimmed) {
        Ok(v) => v,
        Err(_) => return RpcResponseMessage::Single(RpcResponse::error(RpcId::Null, JsonRpcError::parse_error())),
    };

    match value {
        Value::Array(arr) => {
            if arr.is_empty() {
                return RpcResponseMessage::Single(RpcResponse::error(
                    RpcId::Null,
                    JsonRpcError::invalid_request(),
                ));
            }
            match serde_json::from_str::<Vec<&RawValue>>(trimmed) {
                Ok(raws) => RpcResponseMessage::Batch(
                    raws.into_iter().map(|raw| parse_single_response(raw.get())).collect(),
                ),
                Err(_) => RpcResponseMessage::Single(RpcResponse::error(
                    RpcId::Null,
                    JsonRpcError::parse_error(),
                )),
            }
        }
        Value::Object(_) => RpcResponseMessage::Single(parse_single_response(trimmed)),
        _ => RpcResponseMessage::Single(RpcResponse::error(RpcId::Null, JsonRpcError::invalid_request())),
    }
}

fn parse_error_request(error: JsonRpcError) -> RpcRequest {
    RpcRequest {
        version: "2.0".to_string(),
        method: String::new(),
        params: None,
        id: Some(RpcId::Null),
        parse_error: Some(error),
    }
}

fn parse_single_request(raw: &str) -> RpcRequest {
    let value: Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(_) => return parse_error_request(JsonRpcError::parse_error()),
    };

    let obj = match value.as_object() {
        Some(o) => o,
        None => return parse_error_request(JsonRpcError::invalid_request()),
    };

    if has_duplicate_top_level_keys(raw) {
        let id = extract_id(obj).ok().flatten();
        return error_request_with_id(id, JsonRpcError::new(ErrorCode::InvalidRequest, "duplicate keys"));
    }

    let id = match extract_id(obj) {
        Ok(id) => id,
        Err(err) => return error_request_with_id(None, err),
    };

    let version_ok = obj.get("jsonrpc").and_then(Value::as_str) == Some("2.0");
    if !version_ok {
        return error_request_with_id(
            id,
            JsonRpcError::new(ErrorCode::InvalidRequest, "jsonrpc must be \"2.0\""),
        );
    }

    let method = match obj.get("method").and_then(Value::as_str) {
        Some(m) if !m.is_empty() => m.to_string(),
        _ => {
            return error_request_with_id(
                id,
                JsonRpcError::new(ErrorCode::InvalidRequest, "method must be a non-empty string"),
            )
        }
    };

    match obj.get("params") {
        None | Some(Value::Null) => RpcRequest::new(method, None, id),
        Some(p @ Value::Array(_)) | Some(p @ Value::Object(_)) => RpcRequest::new(method, Some(p.clone()), id),
        Some(_) => {
            let mut request = RpcRequest::new(method, None, id);
            request.parse_error = Some(JsonRpcError::invalid_params("params must be an array or object"));
            request
        }
    }
}

fn parse_single_response(raw: &str) -> RpcResponse {
    let value: Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(_) => return RpcResponse::error(RpcId::Null, JsonRpcError::parse_error()),
    };

    let obj = match value.as_object() {
        Some(o) => o,
        None => return RpcResponse::error(RpcId::Null, JsonRpcError::invalid_request()),
    };

    let id = extract_id(obj).ok().flatten().unwrap_or(RpcId::Null);

    match (obj.contains_key("result"), obj.contains_key("error")) {
        (true, false) => RpcResponse::success(id, obj.get("result").cloned().unwrap_or(Value::Null)),
        (false, true) => {
            let error_value = obj.get("error").cloned().unwrap_or(Value::Null);
            match serde_json::from_value::<JsonRpcError>(error_value) {
                Ok(err) => RpcResponse::error(id, err),
                Err(_) => RpcResponse::error(id, JsonRpcError::invalid_request()),
            }
        }
        _ => RpcResponse::error(id, JsonRpcError::invalid_request()),
    }
}

fn error_request_with_id(id: Option<RpcId>, error: JsonRpcError) -> RpcRequest {
    RpcRequest {
        version: "2.0".to_string(),
        method: String::new(),
        params: None,
        id: Some(id.unwrap_or(RpcId::Null)),
        parse_error: Some(error),
    }
}

/// Extracts and validates the `id` member of a request/response object.
///
/// Returns `Ok(None)` when the member is absent (notification). Returns
/// `Err` when present but not a valid id shape, or a number outside the
/// safe-integer range.
fn extract_id(obj: &Map<String, Value>) -> Result<Option<RpcId>, JsonRpcError> {
    match obj.get("id") {
        None => Ok(None),
        Some(Value::Null) => Ok(Some(RpcId::Null)),
        Some(Value::String(s)) => Ok(Some(RpcId::String(s.clone()))),
        Some(Value::Number(n)) => {
            let i = n
                .as_i64()
                .ok_or_else(|| JsonRpcError::new(ErrorCode::InvalidRequest, "id must be an integer"))?;
            if !(MIN_SAFE_INTEGER..=MAX_SAFE_INTEGER).contains(&i) {
                return Err(JsonRpcError::new(
                    ErrorCode::InvalidRequest,
                    "id is outside the safe integer range",
                ));
            }
            Ok(Some(RpcId::Integer(i)))
        }
        Some(_) => Err(JsonRpcError::new(
            ErrorCode::InvalidRequest,
            "id must be a string, number, or null",
        )),
    }
}

/// Scans a JSON object's raw text for duplicate keys at its top level.
///
/// `serde_json`'s own parser silently keeps the last value for a repeated
/// key; this walks the raw text tracking string/escape state and brace
/// depth to catch the case the structural parse can't see.
fn has_duplicate_top_level_keys(raw: &str) -> bool {
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escape = false;
    let mut expect_key = true;
    let mut key_start: Option<usize> = None;
    let mut seen: HashSet<&str> = HashSet::new();

    for (i, c) in raw.char_indices() {
        if in_string {
            if escape {
                escape = false;
            } else if c == '\\' {
                escape = true;
            } else if c == '"' {
                in_string = false;
                if depth == 1 && expect_key {
                    if let Some(start) = key_start {
                        if !seen.insert(&raw[start..i]) {
                            return true;
                        }
                    }
                }
            }
            continue;
        }
        match c {
            '"' => {
                in_string = true;
                if depth == 1 && expect_key {
                    key_start = Some(i + 1);
                }
            }
            '{' | '[' => depth += 1,
            '}' | ']' => depth -= 1,
            ':' if depth == 1 => expect_key = false,
            ',' if depth == 1 => expect_key = true,
            _ => {}
        }
    }
    false
}

/// Composes a JSON-RPC request (or notification when `id` is `None`), in
/// canonical field order (`jsonrpc`, `method`, `params`, `id`).
pub fn write_request(method: &str, params: Option<Value>, id: Option<RpcId>) -> String {
    let method_json = serde_json::to_string(method).expect("method serializes");
    let mut out = format!(r#"{{"jsonrpc":"2.0","method":{method_json}"#);
    if let Some(params) = &params {
        if !params.is_null() {
            out.push_str(&format!(r#","params":{params}"#));
        }
    }
    if let Some(id) = &id {
        out.push_str(&format!(r#","id":{}"#, serde_json::to_string(id).expect("id serializes")));
    }
    out.push('}');
    out
}

/// Composes a success response, inlining the already-serialized `result_json`
/// verbatim (it is never re-serialized).
pub fn write_success(id: RpcId, result_json: &str) -> String {
    let id_json = serde_json::to_string(&id).expect("RpcId serializes");
    format!(r#"{{"jsonrpc":"2.0","result":{result_json},"id":{id_json}}}"#)
}

/// Composes an error response. `id` is serialized as `null` when unknown.
pub fn write_error(id: Option<RpcId>, code: i32, message: &str, data: Option<Value>) -> String {
    let id_json = serde_json::to_string(&id.unwrap_or(RpcId::Null)).expect("id serializes");
    let message_json = serde_json::to_string(message).expect("message serializes");
    let mut error_obj = format!(r#"{{"code":{code},"message":{message_json}"#);
    if let Some(data) = &data {
        error_obj.push_str(&format!(r#","data":{data}"#));
    }
    error_obj.push('}');
    format!(r#"{{"jsonrpc":"2.0","error":{error_obj},"id":{id_json}}}"#)
}

/// Composes a batch of already-serialized response (or request) texts into
/// a JSON array, comma-separated, writing nothing for empty `items`.
///
/// Callers are responsible for omitting notification slots from `items`
/// before calling this (per the batch-suppression policy in the pipeline).
pub fn write_batch<W: std::fmt::Write>(writer: &mut W, items: &[String]) -> std::fmt::Result {
    write!(writer, "[")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(writer, ",")?;
        }
        write!(writer, "{item}")?;
    }
    write!(writer, "]")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_valid_single_request() {
        let raw = r#"{"jsonrpc": "2.0", "method": "subtract", "params": {"minuend": 42, "subtrahend": 23}, "id": 1}"#;
        match parse_request(raw) {
            RpcRequestMessage::Single(req) => {
                assert!(!req.is_parse_error());
                assert_eq!(req.method, "subtract");
                assert_eq!(req.id, Some(RpcId::Integer(1)));
            }
            RpcRequestMessage::Batch(_) => panic!("expected single"),
        }
    }

    #[test]
    fn parses_notification() {
        let raw = r#"{"jsonrpc": "2.0", "method": "update", "params": [1, 2, 3]}"#;
        match parse_request(raw) {
            RpcRequestMessage::Single(req) => assert!(req.is_notification()),
            RpcRequestMessage::Batch(_) => panic!("expected single"),
        }
    }

    #[test]
    fn parses_batch() {
        let raw = r#"[
            {"jsonrpc": "2.0", "method": "sum", "params": [1,2,4], "id": "1"},
            {"jsonrpc": "2.0", "method": "notify_hello", "params": [7]},
            {"jsonrpc": "2.0", "method": "subtract", "params": {"minuend": 42, "subtrahend": 23}, "id": "3"}
        ]"#;
        match parse_request(raw) {
            RpcRequestMessage::Batch(reqs) => {
                assert_eq!(reqs.len(), 3);
                assert!(reqs[1].is_notification());
            }
            RpcRequestMessage::Single(_) => panic!("expected batch"),
        }
    }

    #[test]
    fn empty_batch_is_invalid_request_with_null_id() {
        match parse_request("[]") {
            RpcRequestMessage::Single(req) => {
                let err = req.parse_error.expect("should have parse error");
                assert_eq!(err.code, -32600);
                assert_eq!(req.id, Some(RpcId::Null));
            }
            RpcRequestMessage::Batch(_) => panic!("expected single"),
        }
    }

    #[test]
    fn invalid_json_yields_parse_error_with_null_id() {
        match parse_request("{ this is not json") {
            RpcRequestMessage::Single(req) => {
                assert_eq!(req.parse_error.unwrap().code, -32700);
                assert_eq!(req.id, Some(RpcId::Null));
            }
            RpcRequestMessage::Batch(_) => panic!("expected single"),
        }
    }

    #[test]
    fn root_not_object_or_array_is_invalid_request() {
        match parse_request("42") {
            RpcRequestMessage::Single(req) => {
                assert_eq!(req.parse_error.unwrap().code, -32600);
            }
            RpcRequestMessage::Batch(_) => panic!("expected single"),
        }
    }

    #[test]
    fn wrong_version_preserves_recoverable_id() {
        let raw = r#"{"jsonrpc": "1.0", "method": "subtract", "id": 7}"#;
        match parse_request(raw) {
            RpcRequestMessage::Single(req) => {
                assert_eq!(req.parse_error.unwrap().code, -32600);
                assert_eq!(req.id, Some(RpcId::Integer(7)));
            }
            RpcRequestMessage::Batch(_) => panic!("expected single"),
        }
    }

    #[test]
    fn empty_method_is_invalid_request() {
        let raw = r#"{"jsonrpc": "2.0", "method": "", "id": 1}"#;
        match parse_request(raw) {
            RpcRequestMessage::Single(req) => assert_eq!(req.parse_error.unwrap().code, -32600),
            RpcRequestMessage::Batch(_) => panic!("expected single"),
        }
    }

    #[test]
    fn non_array_object_params_is_invalid_params() {
        let raw = r#"{"jsonrpc": "2.0", "method": "test", "params": "not-an-object-or-array", "id": 1}"#;
        match parse_request(raw) {
            RpcRequestMessage::Single(req) => assert_eq!(req.parse_error.unwrap().code, -32602),
            RpcRequestMessage::Batch(_) => panic!("expected single"),
        }
    }

    #[test]
    fn duplicate_keys_are_invalid_request() {
        let raw = r#"{"jsonrpc": "2.0", "method": "a", "method": "b", "id": 1}"#;
        match parse_request(raw) {
            RpcRequestMessage::Single(req) => assert_eq!(req.parse_error.unwrap().code, -32600),
            RpcRequestMessage::Batch(_) => panic!("expected single"),
        }
    }

    #[test]
    fn duplicate_detection_ignores_nested_keys() {
        let raw = r#"{"jsonrpc": "2.0", "method": "a", "params": {"method": "x", "id": 1}, "id": 2}"#;
        assert!(!has_duplicate_top_level_keys(raw));
    }

    #[test]
    fn id_out_of_safe_integer_range_is_invalid_request() {
        let raw = r#"{"jsonrpc": "2.0", "method": "a", "id": 9007199254740993}"#;
        match parse_request(raw) {
            RpcRequestMessage::Single(req) => assert_eq!(req.parse_error.unwrap().code, -32600),
            RpcRequestMessage::Batch(_) => panic!("expected single"),
        }
    }

    #[test]
    fn parses_success_response() {
        let raw = r#"{"jsonrpc": "2.0", "result": 19, "id": 1}"#;
        match parse_response(raw) {
            RpcResponseMessage::Single(resp) => {
                assert!(resp.is_success());
                assert_eq!(resp.id, RpcId::Integer(1));
            }
            RpcResponseMessage::Batch(_) => panic!("expected single"),
        }
    }

    #[test]
    fn parses_error_response() {
        let raw = r#"{"jsonrpc": "2.0", "error": {"code": -32601, "message": "Method not found"}, "id": 1}"#;
        match parse_response(raw) {
            RpcResponseMessage::Single(resp) => {
                assert!(resp.is_error());
            }
            RpcResponseMessage::Batch(_) => panic!("expected single"),
        }
    }

    #[test]
    fn write_success_inlines_preserialized_json() {
        let out = write_success(RpcId::Integer(1), "19");
        assert_eq!(out, r#"{"jsonrpc":"2.0","result":19,"id":1}"#);
    }

    #[test]
    fn write_error_defaults_unknown_id_to_null() {
        let out = write_error(None, -32601, "Method not found", None);
        assert_eq!(
            out,
            r#"{"jsonrpc":"2.0","error":{"code":-32601,"message":"Method not found"},"id":null}"#
        );
    }

    #[test]
    fn write_request_omits_id_for_notification() {
        let out = write_request("update", Some(json!([1, 2, 3])), None);
        assert_eq!(out, r#"{"jsonrpc":"2.0","method":"update","params":[1,2,3]}"#);
    }

    #[test]
    fn write_batch_comma_separates_and_empty_is_brackets_only() {
        let mut out = String::new();
        write_batch(&mut out, &["1".to_string(), "2".to_string()]).unwrap();
        assert_eq!(out, "[1,2]");

        let mut empty = String::new();
        write_batch(&mut empty, &[]).unwrap();
        assert_eq!(empty, "[]");
    }
}
