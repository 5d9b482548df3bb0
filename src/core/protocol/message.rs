//! JSON-RPC 2.0 envelope types.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value, json};

use crate::domains::tools::ValidationError;

/// Invalid JSON was received.
pub const PARSE_ERROR: i32 = -32700;
/// The JSON sent is not a valid request object.
pub const INVALID_REQUEST: i32 = -32600;
/// The method (or tool) does not exist.
pub const METHOD_NOT_FOUND: i32 = -32601;
/// Invalid method parameters.
pub const INVALID_PARAMS: i32 = -32602;
/// Internal JSON-RPC error.
pub const INTERNAL_ERROR: i32 = -32603;
/// Transport-shape violations (wrong HTTP verb, content type).
pub const SERVER_ERROR: i32 = -32000;

/// JSON-RPC 2.0 ID - any JSON number or a string, echoed back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    Number(Number),
    Str(String),
}

impl RequestId {
    /// Read an id from a raw JSON value, if it has a valid shape.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(Self::Number(n.clone())),
            Value::String(s) => Some(Self::Str(s.clone())),
            _ => None,
        }
    }
}

impl From<i64> for RequestId {
    fn from(id: i64) -> Self {
        Self::Number(id.into())
    }
}

/// JSON-RPC 2.0 request envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    /// The raw `id` member: `None` when absent, `Some(Value::Null)` for an
    /// explicit `null`.
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    /// A request without an `id` member is a notification and gets no response.
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }

    /// The id to echo in the response (`null` when it was `null`).
    pub fn response_id(&self) -> Option<RequestId> {
        self.id.as_ref().and_then(RequestId::from_value)
    }
}

/// Keeps a present `null` distinguishable from an absent member.
fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// JSON-RPC 2.0 error object (protocol-level errors).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Attach structured detail.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn parse_error(detail: impl Into<String>) -> Self {
        Self::new(PARSE_ERROR, "Parse error").with_data(json!(detail.into()))
    }

    pub fn invalid_request(detail: impl Into<String>) -> Self {
        Self::new(INVALID_REQUEST, "Invalid Request").with_data(json!(detail.into()))
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::new(METHOD_NOT_FOUND, format!("Method not found: {method}"))
    }

    pub fn tool_not_found(name: &str) -> Self {
        Self::new(METHOD_NOT_FOUND, format!("Tool not found: {name}"))
            .with_data(json!({ "tool": name }))
    }

    pub fn invalid_params(detail: impl Into<String>) -> Self {
        Self::new(INVALID_PARAMS, detail)
    }

    /// Arguments rejected by a tool's input schema.
    pub fn invalid_arguments(tool: &str, error: &ValidationError) -> Self {
        Self::new(
            INVALID_PARAMS,
            format!("Invalid arguments for tool {tool}: {error}"),
        )
        .with_data(error.to_data())
    }

    pub fn internal_error(detail: impl Into<String>) -> Self {
        Self::new(INTERNAL_ERROR, detail)
    }

    /// Any HTTP verb other than POST against the protocol endpoint.
    pub fn method_not_allowed() -> Self {
        Self::new(SERVER_ERROR, "Method not allowed.")
    }

    pub fn unsupported_media_type() -> Self {
        Self::new(
            SERVER_ERROR,
            "Unsupported Media Type: Content-Type must be application/json",
        )
    }

    /// The request body could not be read (e.g. it exceeded the size limit).
    pub fn unreadable_body(detail: impl Into<String>) -> Self {
        Self::new(SERVER_ERROR, detail)
    }
}

/// Outcome carried by a response: exactly one of `result` or `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponsePayload {
    Result(Value),
    Error(JsonRpcError),
}

/// JSON-RPC 2.0 response envelope.
///
/// `id` is always serialized; it is `null` when the request id could not be
/// recovered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(flatten)]
    pub payload: ResponsePayload,
    pub id: Option<RequestId>,
}

impl JsonRpcResponse {
    /// Create a success response.
    pub fn success(id: Option<RequestId>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            payload: ResponsePayload::Result(result),
            id,
        }
    }

    /// Create an error response.
    pub fn error(id: Option<RequestId>, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            payload: ResponsePayload::Error(error),
            id,
        }
    }

    /// The fixed response for non-POST requests.
    pub fn method_not_allowed() -> Self {
        Self::error(None, JsonRpcError::method_not_allowed())
    }

    pub fn result(&self) -> Option<&Value> {
        match &self.payload {
            ResponsePayload::Result(result) => Some(result),
            ResponsePayload::Error(_) => None,
        }
    }

    pub fn error_object(&self) -> Option<&JsonRpcError> {
        match &self.payload {
            ResponsePayload::Error(error) => Some(error),
            ResponsePayload::Result(_) => None,
        }
    }
}
