//! JSON-RPC 2.0 message types for MCP protocol.
//!
//! This module defines the envelopes exchanged with MCP clients over HTTP.
//! Parsing is deliberately lenient: the `jsonrpc` field is not checked, and
//! a missing `method` or `id` is carried through as absent so the
//! dispatcher can answer with an error that echoes whatever the client
//! sent.
//!
//! # Message Types
//!
//! - **Request**: `method`, optional `params`, optional `id`
//! - **Response**: a reply carrying `result`
//! - **Error**: a reply carrying `{code, message}`
//!
//! Both reply kinds always serialise `id`, as `null` when the request had
//! none or it could not be recovered.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The MCP protocol version this implementation supports.
pub const MCP_PROTOCOL_VERSION: &str = "2024-11-05";

/// Server name for capability negotiation.
pub const SERVER_NAME: &str = "sublime-editor-context";

/// A JSON-RPC 2.0 request ID.
///
/// Clients normally send strings or integers. Anything else is kept as raw
/// JSON so it can be echoed back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    /// Numeric request ID.
    Number(i64),
    /// String request ID.
    String(String),
    /// Any other JSON value.
    Other(Value),
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s}"),
            Self::Other(v) => write!(f, "{v}"),
        }
    }
}

/// A JSON-RPC 2.0 request message.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JsonRpcRequest {
    /// Request identifier, echoed in the reply.
    #[serde(default)]
    pub id: Option<RequestId>,

    /// The method to invoke, as sent. Any JSON type is accepted so that a
    /// non-string method is answered as an unknown method.
    #[serde(default)]
    pub method: Option<Value>,

    /// Optional parameters for the method.
    #[serde(default)]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    /// Creates a request for `method` with no params.
    #[must_use]
    pub fn new(id: Option<RequestId>, method: impl Into<String>) -> Self {
        Self {
            id,
            method: Some(Value::String(method.into())),
            params: None,
        }
    }

    /// Attaches params to the request.
    #[must_use]
    pub fn with_params(mut self, params: Value) -> Self {
        self.params = Some(params);
        self
    }

    /// The method, if the client sent it as a string.
    #[must_use]
    pub fn method(&self) -> Option<&str> {
        self.method.as_ref().and_then(Value::as_str)
    }

    /// The method as shown in error messages: the string itself, the JSON
    /// text of any other value, or `null` when absent.
    #[must_use]
    pub fn method_name(&self) -> Cow<'_, str> {
        match &self.method {
            None => Cow::Borrowed("null"),
            Some(Value::String(name)) => Cow::Borrowed(name),
            Some(other) => Cow::Owned(other.to_string()),
        }
    }
}

/// A successful JSON-RPC 2.0 response.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcResponse {
    /// Always "2.0".
    pub jsonrpc: &'static str,

    /// The request ID this response corresponds to.
    pub id: Option<RequestId>,

    /// The result of the method call.
    pub result: Value,
}

impl JsonRpcResponse {
    /// Creates a new success response.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Value is not const-compatible
    pub fn success(id: Option<RequestId>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result,
        }
    }
}

/// JSON-RPC 2.0 error codes used by this server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// The method does not exist or is not available.
    MethodNotFound,
    /// Internal JSON-RPC error.
    InternalError,
}

impl ErrorCode {
    /// Returns the numeric code for this error.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::MethodNotFound => -32601,
            Self::InternalError => -32603,
        }
    }

    /// Returns the default message for this error code.
    #[must_use]
    pub const fn default_message(self) -> &'static str {
        match self {
            Self::MethodNotFound => "Method not found",
            Self::InternalError => "Internal error",
        }
    }
}

/// A JSON-RPC 2.0 error object.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcErrorData {
    /// The error code.
    pub code: i32,

    /// A short description of the error.
    pub message: String,
}

impl JsonRpcErrorData {
    /// Creates a new error with a custom message.
    #[must_use]
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.code(),
            message: message.into(),
        }
    }
}

/// A JSON-RPC 2.0 error response.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcError {
    /// Always "2.0".
    pub jsonrpc: &'static str,

    /// The request ID this error corresponds to (if known).
    pub id: Option<RequestId>,

    /// The error details.
    pub error: JsonRpcErrorData,
}

impl JsonRpcError {
    /// Creates a new error response.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // JsonRpcErrorData contains String
    pub fn new(id: Option<RequestId>, error: JsonRpcErrorData) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            error,
        }
    }

    /// Creates a method not found error response.
    #[must_use]
    pub fn method_not_found(id: Option<RequestId>, method: &str) -> Self {
        Self::new(
            id,
            JsonRpcErrorData::with_message(
                ErrorCode::MethodNotFound,
                format!("{}: {method}", ErrorCode::MethodNotFound.default_message()),
            ),
        )
    }

    /// Creates an internal error response.
    #[must_use]
    pub fn internal_error(id: Option<RequestId>, message: impl Into<String>) -> Self {
        Self::new(
            id,
            JsonRpcErrorData::with_message(ErrorCode::InternalError, message),
        )
    }

    /// Returns `true` if this error carries `code`.
    #[must_use]
    pub fn is(&self, code: ErrorCode) -> bool {
        self.error.code == code.code()
    }
}

/// Parses an HTTP request body into a JSON-RPC request.
///
/// Every failure maps to an internal error. When the body is a JSON object
/// whose `id` can still be read, that id is attached to the error.
///
/// # Errors
///
/// Returns a `JsonRpcError` if the body is not UTF-8, not JSON, or not a
/// JSON object.
pub fn parse_message(body: &[u8]) -> Result<JsonRpcRequest, JsonRpcError> {
    let text =
        std::str::from_utf8(body).map_err(|e| JsonRpcError::internal_error(None, e.to_string()))?;

    let value: Value = serde_json::from_str(text)
        .map_err(|e| JsonRpcError::internal_error(None, e.to_string()))?;

    let Some(obj) = value.as_object() else {
        return Err(JsonRpcError::internal_error(
            None,
            "request must be a JSON object",
        ));
    };

    let id = obj
        .get("id")
        .and_then(|id| serde_json::from_value::<Option<RequestId>>(id.clone()).ok())
        .flatten();

    serde_json::from_value(value).map_err(|e| JsonRpcError::internal_error(id, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_request() {
        let json = br#"{"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}"#;
        let req = parse_message(json).unwrap();

        assert_eq!(req.id, Some(RequestId::Number(1)));
        assert_eq!(req.method(), Some("initialize"));
    }

    #[test]
    fn parse_string_id() {
        let json = br#"{"jsonrpc": "2.0", "id": "abc-123", "method": "test"}"#;
        let req = parse_message(json).unwrap();
        assert_eq!(req.id, Some(RequestId::String("abc-123".to_string())));
    }

    #[test]
    fn parse_without_jsonrpc_or_id() {
        let req = parse_message(br#"{"method": "resources/list"}"#).unwrap();
        assert_eq!(req.id, None);
        assert_eq!(req.method_name(), "resources/list");
    }

    #[test]
    fn missing_method_renders_as_null() {
        let req = parse_message(br#"{"id": 3}"#).unwrap();
        assert_eq!(req.method, None);
        assert_eq!(req.method_name(), "null");
    }

    #[test]
    fn fractional_id_is_kept_verbatim() {
        let req = parse_message(br#"{"id": 1.5, "method": "x"}"#).unwrap();
        let echoed = serde_json::to_value(&req.id).unwrap();
        assert_eq!(echoed, serde_json::json!(1.5));
    }

    #[test]
    fn parse_invalid_json() {
        let err = parse_message(b"not valid json").unwrap_err();
        assert!(err.is(ErrorCode::InternalError));
        assert_eq!(err.id, None);
    }

    #[test]
    fn parse_invalid_utf8() {
        let err = parse_message(&[0x7b, 0xff, 0xfe, 0x7d]).unwrap_err();
        assert!(err.is(ErrorCode::InternalError));
        assert_eq!(err.id, None);
    }

    #[test]
    fn parse_non_object() {
        let err = parse_message(b"[1, 2, 3]").unwrap_err();
        assert!(err.is(ErrorCode::InternalError));
    }

    #[test]
    fn wrongly_typed_method_is_kept_as_json() {
        let req = parse_message(br#"{"id": 9, "method": 12}"#).unwrap();
        assert_eq!(req.id, Some(RequestId::Number(9)));
        assert_eq!(req.method(), None);
        assert_eq!(req.method_name(), "12");

        let req = parse_message(br#"{"method": ["initialize"]}"#).unwrap();
        assert_eq!(req.method(), None);
        assert_eq!(req.method_name(), r#"["initialize"]"#);
    }

    #[test]
    fn null_method_renders_as_null() {
        let req = parse_message(br#"{"id": 1, "method": null}"#).unwrap();
        assert_eq!(req.method_name(), "null");
    }

    #[test]
    fn serialise_success_response() {
        let response =
            JsonRpcResponse::success(Some(RequestId::Number(1)), serde_json::json!({"ok": true}));
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains(r#""jsonrpc":"2.0""#));
        assert!(json.contains(r#""id":1"#));
        assert!(json.contains(r#""result":{"ok":true}"#));
    }

    #[test]
    fn serialise_error_response() {
        let error = JsonRpcError::method_not_found(Some(RequestId::Number(1)), "unknown/method");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains(r#""jsonrpc":"2.0""#));
        assert!(json.contains(r#""id":1"#));
        assert!(json.contains(r#""code":-32601"#));
        assert!(json.contains("Method not found: unknown/method"));
    }

    #[test]
    fn absent_id_serialises_as_null() {
        let error = JsonRpcError::internal_error(None, "boom");
        let value = serde_json::to_value(&error).unwrap();
        assert_eq!(value["id"], Value::Null);
        assert_eq!(value["error"]["code"], -32603);
    }

    #[test]
    fn request_id_display() {
        assert_eq!(format!("{}", RequestId::Number(42)), "42");
        assert_eq!(format!("{}", RequestId::String("abc".to_string())), "abc");
    }
}
