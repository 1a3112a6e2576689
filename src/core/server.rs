//! MCP Server implementation and lifecycle management.
//!
//! This module contains the main server handler that implements the MCP
//! protocol by delegating every `tools/call` to the [`Dispatcher`].
//!
//! ## Tool Architecture
//!
//! Tools are defined in `domains/tools/definitions/` with one file per tool
//! and registered in `ToolRegistry::with_default_tools()`.
//! **Adding a new tool does NOT require modifying this file!**

use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler, model::*, service::RequestContext,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, instrument};

use super::config::{Config, StoreBackend};
use super::error::Result;
use crate::domains::orders::{MemoryOrderStore, OrderPool, OrderStore, PgOrderStore};
use crate::domains::tools::{Dispatcher, ToolRegistry, response};

const INSTRUCTIONS: &str = "Order management tools: look up an order's status by ID \
     (orders_status_by_id) and create new pending orders (orders_create).";

/// The main MCP server handler.
///
/// This struct implements the `ServerHandler` trait from rmcp. It is cheap to
/// clone; every clone shares the same registry and order store.
#[derive(Clone)]
pub struct McpServer {
    /// Server configuration.
    config: Arc<Config>,

    /// Routes tool calls to their handlers.
    dispatcher: Dispatcher,
}

impl McpServer {
    /// Create a new MCP server around an existing dispatcher.
    pub fn new(config: Config, dispatcher: Dispatcher) -> Self {
        Self {
            config: Arc::new(config),
            dispatcher,
        }
    }

    /// Build the registry and the configured order store, then the server.
    pub async fn from_config(config: Config) -> Result<Self> {
        let registry = Arc::new(ToolRegistry::with_default_tools()?);
        info!("Registered {} tools: {:?}", registry.len(), registry.tool_names());

        let store = open_store(&config).await?;
        info!("Order store ready ({})", store.backend());

        Ok(Self::new(config, Dispatcher::new(registry, store)))
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Release the order store. Called once the transport has finished.
    pub async fn shutdown(&self) {
        info!("Closing order store");
        self.dispatcher.store().close().await;
    }

    // ========================================================================
    // HTTP Transport Support Methods
    // ========================================================================

    /// List all available tools (for HTTP transport).
    pub fn list_tools(&self) -> Vec<serde_json::Value> {
        self.dispatcher
            .list_tools()
            .into_iter()
            .map(|t| {
                json!({
                    "name": t.name,
                    "description": t.description,
                    "inputSchema": t.input_schema,
                    "outputSchema": t.output_schema
                })
            })
            .collect()
    }

    /// Call a tool from a raw request object (for HTTP transport).
    ///
    /// The request may use any shape the normalizer accepts.
    pub async fn call_tool(&self, request: &serde_json::Value) -> serde_json::Value {
        let result = self.dispatcher.dispatch(request).await;
        response::to_json(&result)
    }
}

/// Open the order store selected by the configuration.
async fn open_store(config: &Config) -> Result<Arc<dyn OrderStore>> {
    match config.store.backend {
        StoreBackend::Memory => Ok(Arc::new(MemoryOrderStore::new(
            config.database.max_connections as usize,
        ))),
        StoreBackend::Postgres => {
            let pool = OrderPool::connect_lazy(&config.database);
            if config.database.init_schema {
                pool.ensure_schema().await?;
            }
            Ok(Arc::new(PgOrderStore::new(pool)))
        }
    }
}

impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: self.config.server.name.clone(),
                version: self.config.server.version.clone(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[instrument(skip(self, _context))]
    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            tools: self.dispatcher.list_tools(),
            next_cursor: None,
            meta: None,
        })
    }

    #[instrument(skip_all)]
    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<CallToolResult, McpError> {
        let raw = json!({
            "name": request.name,
            "arguments": request.arguments
        });
        Ok(self.dispatcher.dispatch(&raw).await)
    }
}
