//! HTTP transport implementation.
//!
//! JSON-RPC over POST, so plain HTTP clients (curl, gateways) can reach the
//! order tools. `tools/call` params are handed to the dispatcher untouched,
//! which means every request shape the normalizer understands works here.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use rmcp::ServerHandler;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, instrument, warn};

use super::{TransportError, TransportResult, config::HttpConfig, shutdown_signal};
use crate::core::McpServer;

/// HTTP transport handler.
pub struct HttpTransport {
    config: HttpConfig,
}

/// JSON-RPC request structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

/// JSON-RPC response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
}

impl JsonRpcResponse {
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
            }),
        }
    }

    pub fn method_not_found(id: Option<Value>) -> Self {
        Self::error(id, -32601, "Method not found")
    }

    pub fn invalid_request(id: Option<Value>) -> Self {
        Self::error(id, -32600, "Invalid Request")
    }

    pub fn internal_error(id: Option<Value>, msg: impl Into<String>) -> Self {
        Self::error(id, -32603, msg)
    }
}

/// State shared across HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    server: McpServer,
    rpc_path: String,
}

impl HttpTransport {
    pub fn new(config: HttpConfig) -> Self {
        Self { config }
    }

    /// Build the axum router for this transport.
    pub fn router(&self, server: McpServer) -> Router {
        let state = AppState {
            server,
            rpc_path: self.config.rpc_path.clone(),
        };

        let mut app = Router::new()
            .route(&self.config.rpc_path, post(handle_rpc))
            .route("/health", get(health_check))
            .route("/", get(root_handler))
            .with_state(state)
            .layer(TraceLayer::new_for_http());

        if self.config.enable_cors {
            let cors = CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any);
            app = app.layer(cors);
        }

        app
    }

    /// Serve HTTP until a shutdown signal arrives.
    pub async fn run(self, server: McpServer) -> TransportResult<()> {
        let addr = self.config.bind.to_string();
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
            "Ready - listening on {} (JSON-RPC over HTTP, CORS {})",
            addr, cors_status
        );
        info!("  → JSON-RPC: POST {}", self.config.rpc_path);
        info!("  → Health:   GET /health");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| TransportError::http(e.to_string()))?;

        info!("HTTP listener on {} stopped", addr);
        Ok(())
    }
}

async fn root_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "name": state.server.name(),
        "version": state.server.version(),
        "transport": "HTTP",
        "endpoints": {
            "rpc": state.rpc_path,
            "health": "/health"
        },
        "protocol": "JSON-RPC 2.0",
        "tools": state.server.dispatcher().registry().tool_names()
    }))
}

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let store = state.server.dispatcher().store();
    Json(json!({
        "status": "healthy",
        "store": store.backend(),
        "connectionsInUse": store.connections_in_use(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

#[instrument(skip_all, fields(method))]
async fn handle_rpc(
    State(state): State<AppState>,
    Json(request): Json<JsonRpcRequest>,
) -> impl IntoResponse {
    tracing::Span::current().record("method", request.method.as_str());
    info!("Received JSON-RPC request: {}", request.method);

    let response = process_request(&state, request).await;

    (StatusCode::OK, Json(response))
}

/// Process a JSON-RPC request and return the response.
async fn process_request(state: &AppState, request: JsonRpcRequest) -> JsonRpcResponse {
    if request.jsonrpc != "2.0" {
        return JsonRpcResponse::invalid_request(request.id);
    }

    match request.method.as_str() {
        "initialize" => handle_initialize(state, request),
        "ping" => JsonRpcResponse::success(request.id, json!({})),
        "tools/list" => handle_tools_list(state, request),
        "tools/call" => handle_tools_call(state, request).await,
        method if method.starts_with("notifications/") => {
            info!("Received notification: {}", method);
            JsonRpcResponse::success(request.id, Value::Null)
        }
        _ => {
            warn!("Unknown method: {}", request.method);
            JsonRpcResponse::method_not_found(request.id)
        }
    }
}

fn handle_initialize(state: &AppState, request: JsonRpcRequest) -> JsonRpcResponse {
    match serde_json::to_value(state.server.get_info()) {
        Ok(info) => JsonRpcResponse::success(request.id, info),
        Err(e) => JsonRpcResponse::internal_error(request.id, e.to_string()),
    }
}

fn handle_tools_list(state: &AppState, request: JsonRpcRequest) -> JsonRpcResponse {
    JsonRpcResponse::success(request.id, json!({ "tools": state.server.list_tools() }))
}

/// Tool failures are answered as JSON-RPC successes carrying `isError`.
async fn handle_tools_call(state: &AppState, request: JsonRpcRequest) -> JsonRpcResponse {
    let params = request.params.unwrap_or(Value::Null);
    let result = state.server.call_tool(&params).await;
    JsonRpcResponse::success(request.id, result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{Config, StoreBackend};
    use bytes::Bytes;
    use http::{Request, header};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn memory_server() -> McpServer {
        let mut config = Config::default();
        config.store.backend = StoreBackend::Memory;
        McpServer::from_config(config).await.unwrap()
    }

    async fn rpc(app: Router, body: Value) -> Value {
        let request = Request::post("/mcp")
            .header(header::CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes: Bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_tools_list_over_http() {
        let app = HttpTransport::new(HttpConfig::default()).router(memory_server().await);
        let reply = rpc(app, json!({ "jsonrpc": "2.0", "id": 1, "method": "tools/list" })).await;

        let tools = reply["result"]["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 2);
        assert_eq!(tools[0]["inputSchema"]["properties"]["id"]["minimum"], json!(0));
    }

    #[tokio::test]
    async fn test_tools_call_accepts_alternate_shapes() {
        let server = memory_server().await;
        let app = HttpTransport::new(HttpConfig::default()).router(server.clone());

        let created = rpc(
            app.clone(),
            json!({
                "jsonrpc": "2.0", "id": 1, "method": "tools/call",
                "params": { "toolName": "orders_create", "args": { "client": "Ana", "amount": 10.5 } }
            }),
        )
        .await;
        let id = created["result"]["structuredContent"]["result"]["id"].clone();
        assert_eq!(id, json!(1));

        let status = rpc(
            app,
            json!({
                "jsonrpc": "2.0", "id": 2, "method": "tools/call",
                "params": { "tool": { "name": "orders_status_by_id" }, "parameters": { "id": id } }
            }),
        )
        .await;
        assert_eq!(status["result"]["structuredContent"]["result"]["client"], "Ana");
        assert_eq!(server.dispatcher().store().connections_in_use(), 0);
    }

    #[tokio::test]
    async fn test_tools_call_without_params_is_tool_error() {
        let app = HttpTransport::new(HttpConfig::default()).router(memory_server().await);
        let reply = rpc(app, json!({ "jsonrpc": "2.0", "id": 3, "method": "tools/call" })).await;

        assert!(reply.get("error").is_none());
        assert_eq!(reply["result"]["isError"], json!(true));
    }

    #[tokio::test]
    async fn test_unknown_method_and_bad_version() {
        let app = HttpTransport::new(HttpConfig::default()).router(memory_server().await);

        let reply = rpc(
            app.clone(),
            json!({ "jsonrpc": "2.0", "id": 4, "method": "resources/list" }),
        )
        .await;
        assert_eq!(reply["error"]["code"], json!(-32601));

        let reply = rpc(app, json!({ "jsonrpc": "1.0", "id": 5, "method": "ping" })).await;
        assert_eq!(reply["error"]["code"], json!(-32600));
    }

    #[tokio::test]
    async fn test_initialize_reports_server_info() {
        let app = HttpTransport::new(HttpConfig::default()).router(memory_server().await);
        let reply = rpc(app, json!({ "jsonrpc": "2.0", "id": 6, "method": "initialize" })).await;

        assert_eq!(reply["result"]["serverInfo"]["name"], "mcp-orders");
        assert!(reply["result"]["capabilities"]["tools"].is_object());
    }
}
