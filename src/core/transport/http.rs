//! HTTP transport implementation.
//!
//! Stateless JSON-RPC over HTTP: `POST <rpc_path>` carries one JSON-RPC
//! message and gets one JSON-RPC response back. Any other verb against the
//! protocol endpoint is refused with a fixed `-32000` error and status 405,
//! before the body is read. No session or connection state is kept.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State, rejection::BytesRejection},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use bytes::Bytes;
use http::{HeaderMap, StatusCode, header};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, instrument, warn};

use super::{HttpConfig, TransportError, TransportResult};
use crate::core::McpServer;
use crate::core::protocol::JsonRpcResponse;
use crate::core::protocol::message::{INVALID_REQUEST, JsonRpcError, PARSE_ERROR};

/// HTTP transport handler.
pub struct HttpTransport {
    config: HttpConfig,
}

/// Application state shared across HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// The MCP server instance.
    server: McpServer,
}

impl HttpTransport {
    /// Create a new HTTP transport with the given config.
    pub fn new(config: HttpConfig) -> Self {
        Self { config }
    }

    /// Get the bind address.
    pub fn address(&self) -> String {
        self.config.address()
    }

    /// Build the axum router for `server`.
    pub fn router(&self, server: McpServer) -> Router {
        let state = AppState { server };

        let mut app = Router::new()
            .route(
                &self.config.rpc_path,
                post(handle_rpc).fallback(method_not_allowed),
            )
            .route("/health", get(health_check));

        if self.config.rpc_path != "/" {
            app = app.route("/", get(root_handler));
        }

        let mut app = app
            .layer(DefaultBodyLimit::max(self.config.max_body_bytes))
            .layer(TraceLayer::new_for_http())
            .with_state(state);

        // Add CORS if enabled
        if self.config.enable_cors {
            let cors = CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any);
            app = app.layer(cors);
        }

        app
    }

    /// Run the HTTP transport until Ctrl-C.
    pub async fn run(self, server: McpServer) -> TransportResult<()> {
        let addr = self.address();
        let app = self.router(server);

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| TransportError::bind(&addr, e))?;

        let cors_status = if self.config.enable_cors {
            "enabled"
        } else {
            "disabled"
        };
        info!(
            "Ready - listening on {} (stateless JSON-RPC over HTTP, CORS {})",
            addr, cors_status
        );
        info!("  → JSON-RPC: POST {}", self.config.rpc_path);
        info!("  → Health:   GET /health");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| TransportError::http(e.to_string()))?;

        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Root handler - provides API info.
async fn root_handler(State(state): State<AppState>) -> impl IntoResponse {
    let rpc_path = &state.server.config().http.rpc_path;
    Json(serde_json::json!({
        "name": state.server.name(),
        "version": state.server.version(),
        "transport": "HTTP",
        "endpoints": {
            "rpc": rpc_path,
            "health": "/health"
        },
        "protocol": "JSON-RPC 2.0",
        "documentation": format!("Send POST requests to {rpc_path} with JSON-RPC messages")
    }))
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Any verb other than POST on the protocol endpoint.
async fn method_not_allowed() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, "POST")],
        Json(JsonRpcResponse::method_not_allowed()),
    )
}

/// Handle JSON-RPC requests.
#[instrument(skip_all)]
async fn handle_rpc(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    if !is_json(&headers) {
        warn!("Rejected request with unsupported content type");
        return (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Json(JsonRpcResponse::error(
                None,
                JsonRpcError::unsupported_media_type(),
            )),
        )
            .into_response();
    }

    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            warn!("Rejected unreadable request body: {}", rejection.body_text());
            return (
                rejection.status(),
                Json(JsonRpcResponse::error(
                    None,
                    JsonRpcError::unreadable_body(rejection.body_text()),
                )),
            )
                .into_response();
        }
    };

    match state.server.handle_message(&body).await {
        Some(response) => (status_for(&response), Json(response)).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

/// Whether the request declares a JSON body.
fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
}

/// Malformed messages are client errors; everything else is delivered with 200.
fn status_for(response: &JsonRpcResponse) -> StatusCode {
    match response.error_object().map(|e| e.code) {
        Some(PARSE_ERROR) | Some(INVALID_REQUEST) => StatusCode::BAD_REQUEST,
        _ => StatusCode::OK,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Config;
    use axum::body::Body;
    use http::{Method, Request};
    use http_body_util::BodyExt;
    use mockito::Matcher;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn app_for(api_base: &str) -> Router {
        let config = Config::for_tests(api_base);
        let transport = HttpTransport::new(config.http.clone());
        let server = McpServer::new(config).unwrap();
        transport.router(server)
    }

    fn app() -> Router {
        app_for("http://127.0.0.1:9")
    }

    fn rpc(body: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/mcp")
            .header(header::CONTENT_TYPE, "application/json")
            .body(body.into())
            .unwrap()
    }

    fn call(name: &str, arguments: Value) -> Request<Body> {
        rpc(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "tools/call",
            "params": { "name": name, "arguments": arguments }
        })
        .to_string())
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_other_verbs_rejected() {
        let expected = json!({
            "jsonrpc": "2.0",
            "error": { "code": -32000, "message": "Method not allowed." },
            "id": null
        });

        for method in [Method::GET, Method::DELETE, Method::PUT, Method::PATCH] {
            let request = Request::builder()
                .method(method.clone())
                .uri("/mcp")
                .body(Body::from("{ not even json"))
                .unwrap();
            let (status, body) = send(app(), request).await;
            assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{method}");
            assert_eq!(body, expected, "{method}");
        }
    }

    #[tokio::test]
    async fn test_greet_over_http() {
        let (status, body) = send(app(), call("greet", json!({ "name": "Ada" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"]["content"][0]["text"], "Hello, Ada!");

        let (_, body) = send(app(), call("greet", json!({}))).await;
        assert_eq!(body["result"]["content"][0]["text"], "Hello, World!");
    }

    #[tokio::test]
    async fn test_malformed_json() {
        let (status, body) = send(app(), rpc("{\"jsonrpc\":")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], -32700);
        assert_eq!(body["id"], Value::Null);
        assert!(body.get("result").is_none());
    }

    #[tokio::test]
    async fn test_unsupported_content_type() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/mcp")
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Body::from("{}"))
            .unwrap();
        let (status, body) = send(app(), request).await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(body["error"]["code"], -32000);
        assert_eq!(body["id"], Value::Null);
    }

    #[tokio::test]
    async fn test_content_type_with_charset() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/mcp")
            .header(header::CONTENT_TYPE, "application/json; charset=utf-8")
            .body(Body::from(r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#))
            .unwrap();
        let (status, body) = send(app(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"], json!({}));
    }

    #[tokio::test]
    async fn test_oversized_body_is_json_rpc_error() {
        let mut config = Config::for_tests("http://127.0.0.1:9");
        config.http.max_body_bytes = 64;
        let transport = HttpTransport::new(config.http.clone());
        let app = transport.router(McpServer::new(config).unwrap());

        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "tools/call",
            "params": { "name": "greet", "arguments": { "name": "x".repeat(256) } }
        });
        let (status, body) = send(app, rpc(body.to_string())).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["jsonrpc"], "2.0");
        assert_eq!(body["error"]["code"], -32000);
        assert_eq!(body["id"], Value::Null);
    }

    #[tokio::test]
    async fn test_notification_with_id_gets_response() {
        let request = rpc(r#"{"jsonrpc":"2.0","id":7,"method":"notifications/cancelled"}"#);
        let (status, body) = send(app(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], 7);
        assert_eq!(body["result"], json!({}));
    }

    #[tokio::test]
    async fn test_notification_accepted() {
        let request = rpc(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#);
        let (status, body) = send(app(), request).await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body, Value::Null);
    }

    #[tokio::test]
    async fn test_health() {
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_root_lists_endpoints() {
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let (_, body) = send(app(), request).await;
        assert_eq!(body["endpoints"]["rpc"], "/mcp");
        assert_eq!(body["name"], "hello-mcp-server");
    }

    #[tokio::test]
    async fn test_upstream_unreachable_is_tool_error() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let app = app_for(&format!("http://127.0.0.1:{port}/fixtures"));

        let (status, body) = send(app, call("fetch_external_data", json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.get("error").is_none());
        assert_eq!(body["result"]["isError"], true);
        let text = body["result"]["content"][0]["text"].as_str().unwrap();
        assert!(text.starts_with("Failed to reach external API: "));
    }

    #[tokio::test]
    async fn test_upstream_status_is_tool_error() {
        let mut upstream = mockito::Server::new_async().await;
        let _mock = upstream
            .mock("GET", "/fixtures")
            .match_query(Matcher::UrlEncoded("code".into(), "test-code".into()))
            .with_status(404)
            .create_async()
            .await;
        let app = app_for(&format!("{}/fixtures", upstream.url()));

        let (status, body) = send(app, call("fetch_external_data", json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"]["isError"], true);
        assert_eq!(
            body["result"]["content"][0]["text"],
            "External API returned 404 Not Found"
        );
    }

    #[tokio::test]
    async fn test_concurrent_requests_are_independent() {
        let app = app();
        let requests = ["Ada", "Grace", "Linus", "Barbara"].map(|name| {
            let app = app.clone();
            async move {
                let (_, body) = send(app, call("greet", json!({ "name": name }))).await;
                (name, body)
            }
        });

        for (name, body) in futures::future::join_all(requests).await {
            assert_eq!(
                body["result"]["content"][0]["text"],
                format!("Hello, {name}!")
            );
        }
    }
}
