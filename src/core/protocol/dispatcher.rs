//! JSON-RPC dispatcher.
//!
//! Each call to [`Dispatcher::dispatch`] walks one request through
//! parse → resolve → validate → invoke → respond. Any step before invocation
//! may end the request with a protocol error; invocation itself always yields
//! a tool outcome, which is returned as a successful result even when the
//! tool reports a failure.
//!
//! The dispatcher keeps no state between requests: it only reads the
//! immutable tool registry.

use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::message::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, RequestId};
use crate::core::config::ServerConfig;
use crate::domains::tools::{ToolInvoker, ToolRegistry};

/// Protocol revisions this server can speak, newest first.
pub const SUPPORTED_PROTOCOL_VERSIONS: &[&str] =
    &["2025-06-18", "2025-03-26", "2024-11-05", "2024-10-07"];

/// Log levels accepted by `logging/setLevel` (RFC 5424 names).
const LOG_LEVELS: &[&str] = &[
    "debug",
    "info",
    "notice",
    "warning",
    "error",
    "critical",
    "alert",
    "emergency",
];

const INSTRUCTIONS: &str =
    "Stateless MCP server. Call `greet` for a greeting or `fetch_external_data` for upstream fixtures.";

/// Parameters for `tools/call`.
#[derive(Debug, Deserialize)]
struct ToolCallParams {
    name: String,
    #[serde(default)]
    arguments: Option<Value>,
}

/// Parameters for `logging/setLevel`.
#[derive(Debug, Deserialize)]
struct SetLevelParams {
    level: String,
}

/// Routes JSON-RPC requests to tools.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
    invoker: ToolInvoker,
    server_info: ServerConfig,
}

impl Dispatcher {
    pub fn new(registry: Arc<ToolRegistry>, invoker: ToolInvoker, server_info: ServerConfig) -> Self {
        Self {
            registry,
            invoker,
            server_info,
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Handle one raw request body.
    ///
    /// Returns `None` only for notifications (requests without an `id`
    /// member), which are processed but get no JSON-RPC response.
    pub async fn dispatch(&self, body: &[u8]) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_slice(body) {
            Ok(value) => value,
            Err(e) => {
                warn!("Parse error: {}", e);
                return Some(JsonRpcResponse::error(
                    None,
                    JsonRpcError::parse_error(e.to_string()),
                ));
            }
        };

        let request = match parse_request(value) {
            Ok(request) => request,
            Err(response) => return Some(response),
        };

        self.handle_request(request).await
    }

    /// Handle an already parsed request envelope.
    #[instrument(skip_all, fields(method = %request.method))]
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let notification = request.is_notification();
        let id = request.response_id();
        let params = request.params;

        let response = match request.method.as_str() {
            method if method.starts_with("notifications/") => {
                debug!("Received notification: {}", method);
                JsonRpcResponse::success(id, json!({}))
            }
            "initialize" => self.handle_initialize(id, params.as_ref()),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => self.handle_tools_list(id),
            "tools/call" => self.handle_tools_call(id, params).await,
            "logging/setLevel" => handle_set_level(id, params),
            // A tool may also be addressed directly by its name.
            method if self.registry.contains(method) => {
                self.call_tool(id, method, params.as_ref()).await
            }
            method => {
                warn!("Unknown method: {}", method);
                JsonRpcResponse::error(id, JsonRpcError::method_not_found(method))
            }
        };

        if notification {
            debug!("No response for notification {}", request.method);
            return None;
        }
        Some(response)
    }

    fn handle_initialize(&self, id: Option<RequestId>, params: Option<&Value>) -> JsonRpcResponse {
        let requested = params
            .and_then(|p| p.get("protocolVersion"))
            .and_then(Value::as_str);
        let protocol_version = requested
            .filter(|v| SUPPORTED_PROTOCOL_VERSIONS.contains(v))
            .unwrap_or(SUPPORTED_PROTOCOL_VERSIONS[0]);
        info!("Initialize (protocol {})", protocol_version);

        JsonRpcResponse::success(
            id,
            json!({
                "protocolVersion": protocol_version,
                "capabilities": {
                    "tools": { "listChanged": false },
                    "logging": {}
                },
                "serverInfo": {
                    "name": self.server_info.name,
                    "version": self.server_info.version
                },
                "instructions": INSTRUCTIONS
            }),
        )
    }

    fn handle_tools_list(&self, id: Option<RequestId>) -> JsonRpcResponse {
        let tools: Vec<Value> = self
            .registry
            .definitions()
            .iter()
            .map(|definition| definition.to_listing())
            .collect();
        JsonRpcResponse::success(id, json!({ "tools": tools }))
    }

    async fn handle_tools_call(&self, id: Option<RequestId>, params: Option<Value>) -> JsonRpcResponse {
        let params: ToolCallParams = match params {
            Some(value) => match serde_json::from_value(value) {
                Ok(params) => params,
                Err(e) => {
                    return JsonRpcResponse::error(
                        id,
                        JsonRpcError::invalid_params(format!("Invalid tools/call params: {e}")),
                    );
                }
            },
            None => {
                return JsonRpcResponse::error(
                    id,
                    JsonRpcError::invalid_params("Missing params for tools/call"),
                );
            }
        };

        self.call_tool(id, &params.name, params.arguments.as_ref()).await
    }

    /// Resolve, validate and invoke a tool.
    async fn call_tool(
        &self,
        id: Option<RequestId>,
        name: &str,
        arguments: Option<&Value>,
    ) -> JsonRpcResponse {
        let definition = match self.registry.lookup(name) {
            Ok(definition) => definition,
            Err(_) => {
                warn!("Unknown tool requested: {}", name);
                return JsonRpcResponse::error(id, JsonRpcError::tool_not_found(name));
            }
        };

        let args = match definition.input_schema().validate(arguments) {
            Ok(args) => args,
            Err(e) => {
                warn!("Rejected arguments for {}: {}", name, e);
                return JsonRpcResponse::error(id, JsonRpcError::invalid_arguments(name, &e));
            }
        };

        info!("Calling tool: {}", name);
        let outcome = self.invoker.invoke(definition, args).await;

        match serde_json::to_value(&outcome) {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(e) => JsonRpcResponse::error(
                id,
                JsonRpcError::internal_error(format!("Failed to serialize tool result: {e}")),
            ),
        }
    }
}

/// Turn a parsed JSON value into a request envelope, or an `Invalid Request`
/// response carrying whatever id could be recovered.
fn parse_request(value: Value) -> Result<JsonRpcRequest, JsonRpcResponse> {
    let Value::Object(ref object) = value else {
        let detail = if value.is_array() {
            "Batch requests are not supported"
        } else {
            "Request must be a JSON object"
        };
        return Err(JsonRpcResponse::error(None, JsonRpcError::invalid_request(detail)));
    };

    let raw_id = object.get("id");
    let id = raw_id.and_then(RequestId::from_value);
    if let Some(raw_id) = raw_id {
        if !raw_id.is_null() && id.is_none() {
            return Err(JsonRpcResponse::error(
                None,
                JsonRpcError::invalid_request("id must be a string, a number or null"),
            ));
        }
    }

    let request: JsonRpcRequest = serde_json::from_value(value)
        .map_err(|e| JsonRpcResponse::error(id.clone(), JsonRpcError::invalid_request(e.to_string())))?;

    if request.jsonrpc != "2.0" {
        return Err(JsonRpcResponse::error(
            id,
            JsonRpcError::invalid_request("jsonrpc must be \"2.0\""),
        ));
    }

    Ok(request)
}

/// `logging/setLevel` is accepted for compatibility; nothing is retained
/// because the server keeps no per-client state.
fn handle_set_level(id: Option<RequestId>, params: Option<Value>) -> JsonRpcResponse {
    let params: Option<SetLevelParams> = params.and_then(|p| serde_json::from_value(p).ok());
    match params {
        Some(SetLevelParams { level }) if LOG_LEVELS.contains(&level.as_str()) => {
            debug!("Client requested log level {}", level);
            JsonRpcResponse::success(id, json!({}))
        }
        Some(SetLevelParams { level }) => JsonRpcResponse::error(
            id,
            JsonRpcError::invalid_params(format!("Unknown log level: {level}")),
        ),
        None => JsonRpcResponse::error(
            id,
            JsonRpcError::invalid_params("Missing level for logging/setLevel"),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::protocol::message::{
        INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND, PARSE_ERROR,
    };
    use crate::domains::tools::definitions::GreetTool;
    use crate::domains::tools::{
        Schema, ToolDefinition, ToolError, ToolHandler, ToolOutcome, ValidatedArgs,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts how often its handler actually runs.
    struct CountingTool(Arc<AtomicUsize>);

    #[async_trait::async_trait]
    impl ToolHandler for CountingTool {
        async fn call(&self, _args: ValidatedArgs) -> Result<ToolOutcome, ToolError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(ToolOutcome::text("counted"))
        }
    }

    struct BrokenTool;

    #[async_trait::async_trait]
    impl ToolHandler for BrokenTool {
        async fn call(&self, _args: ValidatedArgs) -> Result<ToolOutcome, ToolError> {
            Err(ToolError::internal("lost the plot"))
        }
    }

    fn dispatcher_with(extra: Vec<ToolDefinition>) -> Dispatcher {
        let mut registry = ToolRegistry::new();
        registry.register(GreetTool::definition()).unwrap();
        for definition in extra {
            registry.register(definition).unwrap();
        }
        Dispatcher::new(
            Arc::new(registry),
            ToolInvoker::default(),
            ServerConfig::default(),
        )
    }

    fn dispatcher() -> Dispatcher {
        dispatcher_with(Vec::new())
    }

    async fn send(dispatcher: &Dispatcher, body: Value) -> Value {
        let response = dispatcher
            .dispatch(body.to_string().as_bytes())
            .await
            .expect("request must produce a response");
        serde_json::to_value(response).unwrap()
    }

    fn call(id: i64, name: &str, arguments: Value) -> Value {
        json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": "tools/call",
            "params": { "name": name, "arguments": arguments }
        })
    }

    #[tokio::test]
    async fn test_greet_round_trip() {
        let response = send(&dispatcher(), call(1, "greet", json!({ "name": "Ada" }))).await;
        assert_eq!(
            response,
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "result": { "content": [{ "type": "text", "text": "Hello, Ada!" }] }
            })
        );
    }

    #[tokio::test]
    async fn test_greet_without_arguments() {
        let body = json!({
            "jsonrpc": "2.0",
            "id": "a",
            "method": "tools/call",
            "params": { "name": "greet" }
        });
        let response = send(&dispatcher(), body).await;
        assert_eq!(response["id"], "a");
        assert_eq!(response["result"]["content"][0]["text"], "Hello, World!");
    }

    #[tokio::test]
    async fn test_malformed_json_yields_parse_error_with_null_id() {
        let bodies: [&[u8]; 3] = [b"{\"jsonrpc\": \"2.0\", \"id\": 4,", b"not json", b""];
        for body in bodies {
            let response = dispatcher().dispatch(body).await.unwrap();
            let value = serde_json::to_value(&response).unwrap();
            assert_eq!(value["error"]["code"], PARSE_ERROR);
            assert_eq!(value["id"], Value::Null);
            assert!(value.get("result").is_none());
        }
    }

    #[tokio::test]
    async fn test_invalid_envelopes() {
        let d = dispatcher();

        let response = send(&d, json!({ "jsonrpc": "1.0", "id": 9, "method": "ping" })).await;
        assert_eq!(response["error"]["code"], INVALID_REQUEST);
        assert_eq!(response["id"], 9);

        let response = send(&d, json!({ "jsonrpc": "2.0", "id": "x" })).await;
        assert_eq!(response["error"]["code"], INVALID_REQUEST);
        assert_eq!(response["id"], "x");

        let response = send(&d, json!([{ "jsonrpc": "2.0", "id": 1, "method": "ping" }])).await;
        assert_eq!(response["error"]["code"], INVALID_REQUEST);
        assert_eq!(response["id"], Value::Null);

        let response = send(&d, json!("ping")).await;
        assert_eq!(response["error"]["code"], INVALID_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_protocol_error() {
        let response = send(&dispatcher(), call(2, "launch_rockets", json!({}))).await;
        assert_eq!(response["error"]["code"], METHOD_NOT_FOUND);
        assert_eq!(response["error"]["message"], "Tool not found: launch_rockets");
        assert_eq!(response["error"]["data"]["tool"], "launch_rockets");
        assert_eq!(response["id"], 2);
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let response = send(
            &dispatcher(),
            json!({ "jsonrpc": "2.0", "id": 3, "method": "resources/list" }),
        )
        .await;
        assert_eq!(response["error"]["code"], METHOD_NOT_FOUND);
        assert_eq!(response["error"]["message"], "Method not found: resources/list");
    }

    #[tokio::test]
    async fn test_validation_failure_is_protocol_error() {
        let response = send(&dispatcher(), call(4, "greet", json!({ "name": 42 }))).await;
        assert_eq!(response["error"]["code"], INVALID_PARAMS);
        assert_eq!(
            response["error"]["data"],
            json!({ "path": "arguments.name", "expected": "string", "actual": "integer" })
        );
        assert!(response.get("result").is_none());

        let response = send(&dispatcher(), call(5, "greet", json!({ "name": null }))).await;
        assert_eq!(response["error"]["code"], INVALID_PARAMS);
        assert_eq!(response["error"]["data"]["actual"], "null");
    }

    #[tokio::test]
    async fn test_tools_call_params_required() {
        let d = dispatcher();
        let response = send(&d, json!({ "jsonrpc": "2.0", "id": 5, "method": "tools/call" })).await;
        assert_eq!(response["error"]["code"], INVALID_PARAMS);

        let response = send(
            &d,
            json!({ "jsonrpc": "2.0", "id": 6, "method": "tools/call", "params": { "arguments": {} } }),
        )
        .await;
        assert_eq!(response["error"]["code"], INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_tool_fault_is_successful_envelope() {
        let broken = ToolDefinition::new("broken", "always fails", Schema::empty(), Arc::new(BrokenTool));
        let response = send(&dispatcher_with(vec![broken]), call(7, "broken", json!({}))).await;
        assert!(response.get("error").is_none());
        assert_eq!(response["result"]["isError"], true);
        assert_eq!(
            response["result"]["content"][0]["text"],
            "Internal error: lost the plot"
        );
    }

    #[tokio::test]
    async fn test_tool_addressed_by_method_name() {
        let response = send(
            &dispatcher(),
            json!({ "jsonrpc": "2.0", "id": 8, "method": "greet", "params": { "name": "Lin" } }),
        )
        .await;
        assert_eq!(response["result"]["content"][0]["text"], "Hello, Lin!");
    }

    #[tokio::test]
    async fn test_tools_list() {
        let response = send(
            &dispatcher(),
            json!({ "jsonrpc": "2.0", "id": 1, "method": "tools/list" }),
        )
        .await;
        let tools = response["result"]["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0]["name"], "greet");
        assert_eq!(tools[0]["title"], "Greet");
        assert_eq!(tools[0]["description"], "Return a friendly greeting");
        assert_eq!(tools[0]["inputSchema"]["type"], "object");
        assert!(tools[0]["inputSchema"]["properties"].get("name").is_some());
    }

    #[tokio::test]
    async fn test_initialize_negotiates_version() {
        let d = dispatcher();
        let response = send(
            &d,
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "initialize",
                "params": { "protocolVersion": "2024-11-05", "capabilities": {} }
            }),
        )
        .await;
        assert_eq!(response["result"]["protocolVersion"], "2024-11-05");
        assert_eq!(response["result"]["serverInfo"]["name"], "hello-mcp-server");

        let response = send(
            &d,
            json!({
                "jsonrpc": "2.0",
                "id": 2,
                "method": "initialize",
                "params": { "protocolVersion": "1999-01-01" }
            }),
        )
        .await;
        assert_eq!(
            response["result"]["protocolVersion"],
            SUPPORTED_PROTOCOL_VERSIONS[0]
        );
    }

    #[tokio::test]
    async fn test_ping_and_set_level() {
        let d = dispatcher();
        let response = send(&d, json!({ "jsonrpc": "2.0", "id": 1, "method": "ping" })).await;
        assert_eq!(response["result"], json!({}));

        let response = send(
            &d,
            json!({ "jsonrpc": "2.0", "id": 2, "method": "logging/setLevel", "params": { "level": "warning" } }),
        )
        .await;
        assert_eq!(response["result"], json!({}));

        let response = send(
            &d,
            json!({ "jsonrpc": "2.0", "id": 3, "method": "logging/setLevel", "params": { "level": "loud" } }),
        )
        .await;
        assert_eq!(response["error"]["code"], INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_notifications_get_no_response() {
        let d = dispatcher();
        let body = json!({ "jsonrpc": "2.0", "method": "notifications/initialized" });
        assert!(d.dispatch(body.to_string().as_bytes()).await.is_none());

        let body = json!({ "jsonrpc": "2.0", "method": "ping" });
        assert!(d.dispatch(body.to_string().as_bytes()).await.is_none());
    }

    #[tokio::test]
    async fn test_notification_method_with_id_is_answered() {
        let response = send(
            &dispatcher(),
            json!({ "jsonrpc": "2.0", "id": 7, "method": "notifications/cancelled" }),
        )
        .await;
        assert_eq!(response, json!({ "jsonrpc": "2.0", "id": 7, "result": {} }));
    }

    #[tokio::test]
    async fn test_id_less_tool_call_still_runs() {
        let counter = Arc::new(AtomicUsize::new(0));
        let counting = ToolDefinition::new(
            "counting",
            "counts calls",
            Schema::empty(),
            Arc::new(CountingTool(counter.clone())),
        );
        let d = dispatcher_with(vec![counting]);
        let body = json!({
            "jsonrpc": "2.0",
            "method": "tools/call",
            "params": { "name": "counting" }
        });
        assert!(d.dispatch(body.to_string().as_bytes()).await.is_none());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_numeric_ids_echoed_verbatim() {
        let d = dispatcher();
        for id in [json!(1.5), json!(u64::MAX), json!(0)] {
            let response = send(&d, json!({ "jsonrpc": "2.0", "id": id, "method": "ping" })).await;
            assert_eq!(response["id"], id);
            assert_eq!(response["result"], json!({}));
        }

        let response = send(&d, json!({ "jsonrpc": "2.0", "id": null, "method": "ping" })).await;
        assert_eq!(response["id"], Value::Null);
        assert_eq!(response["result"], json!({}));
    }

    #[tokio::test]
    async fn test_invalid_id_shape() {
        let response = send(
            &dispatcher(),
            json!({ "jsonrpc": "2.0", "id": { "n": 1 }, "method": "ping" }),
        )
        .await;
        assert_eq!(response["error"]["code"], INVALID_REQUEST);
        assert_eq!(response["id"], Value::Null);
    }

    #[tokio::test]
    async fn test_repeated_requests_are_independent() {
        let counter = Arc::new(AtomicUsize::new(0));
        let counting = ToolDefinition::new(
            "counting",
            "counts calls",
            Schema::empty(),
            Arc::new(CountingTool(counter.clone())),
        );
        let d = dispatcher_with(vec![counting]);

        let first = send(&d, call(1, "greet", json!({ "name": "Ada" }))).await;
        let second = send(&d, call(1, "greet", json!({ "name": "Ada" }))).await;
        assert_eq!(first, second);

        send(&d, call(2, "counting", json!({}))).await;
        send(&d, call(2, "counting", json!({}))).await;
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }
}
