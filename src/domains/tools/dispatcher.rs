//! Tool call dispatch.
//!
//! One call moves through: normalize → registry lookup → validate → execute.
//! Each step can end the call; every ending becomes a [`CallToolResult`].
//!
//! | Ending | Reply |
//! |---|---|
//! | no tool name | error, no lookup and no store access |
//! | unknown name | error naming the tool |
//! | invalid arguments | error naming the field, no store access |
//! | store failure | error |
//! | handler success | result (text + `structuredContent.result`) |

use std::sync::Arc;

use rmcp::model::{CallToolResult, Tool};
use serde_json::Value;
use tracing::{Span, debug, info, instrument, warn};

use super::error::ToolError;
use super::normalize::normalize;
use super::registry::ToolRegistry;
use super::response;
use crate::domains::orders::OrderStore;

/// Routes tool calls to their handlers.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
    store: Arc<dyn OrderStore>,
}

impl Dispatcher {
    pub fn new(registry: Arc<ToolRegistry>, store: Arc<dyn OrderStore>) -> Self {
        Self { registry, store }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn store(&self) -> &Arc<dyn OrderStore> {
        &self.store
    }

    /// Descriptors for `tools/list`, in registration order.
    pub fn list_tools(&self) -> Vec<Tool> {
        info!("tools/list requested");
        self.registry.list()
    }

    /// Handle one `tools/call` request of any accepted shape.
    ///
    /// Never fails: every error is turned into an error reply.
    #[instrument(skip_all, fields(tool = tracing::field::Empty))]
    pub async fn dispatch(&self, request: &Value) -> CallToolResult {
        debug!("tools/call raw request: {}", request);

        match self.try_dispatch(request).await {
            Ok(result) => {
                info!("tools/call succeeded");
                response::success(result)
            }
            Err(e) => {
                warn!(kind = e.kind(), "tools/call failed: {}", e);
                response::error(e.to_string())
            }
        }
    }

    /// Run a call and return the raw result value.
    pub async fn try_dispatch(&self, request: &Value) -> Result<Value, ToolError> {
        let call = normalize(request).ok_or(ToolError::MissingName)?;
        Span::current().record("tool", call.name.as_str());
        info!("tools/call name={} args={:?}", call.name, call.arguments);

        let tool = self
            .registry
            .lookup(&call.name)
            .ok_or_else(|| ToolError::not_found(&call.name))?;

        let handler = tool.handler();
        let args = handler.schema().validate(&call.arguments)?;

        handler.execute(args, self.store.as_ref()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::live_database_config;
    use crate::domains::orders::{MemoryOrderStore, OrderPool, PgOrderStore, settled_connections};
    use crate::domains::tools::response::first_text;
    use serde_json::json;

    struct Fixture {
        dispatcher: Dispatcher,
        store: Arc<MemoryOrderStore>,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryOrderStore::new(3));
        let registry = Arc::new(ToolRegistry::with_default_tools().unwrap());
        Fixture {
            dispatcher: Dispatcher::new(registry, store.clone()),
            store,
        }
    }

    fn structured_result(result: &CallToolResult) -> Value {
        result
            .structured_content
            .as_ref()
            .and_then(|s| s.get("result"))
            .cloned()
            .expect("structured result")
    }

    #[tokio::test]
    async fn test_create_then_status_round_trip() {
        let f = fixture();

        let created = f
            .dispatcher
            .dispatch(&json!({
                "name": "orders_create",
                "arguments": { "client": "Ana", "amount": 10.5 }
            }))
            .await;
        assert_ne!(created.is_error, Some(true));
        let created = structured_result(&created);
        assert_eq!(created["status"], "pending");
        assert_eq!(created["amount"], json!(10.5));
        assert_eq!(created["client"], "Ana");

        let status = f
            .dispatcher
            .dispatch(&json!({
                "toolName": "orders_status_by_id",
                "args": { "id": created["id"] }
            }))
            .await;
        let status = structured_result(&status);
        assert_eq!(status, created);
    }

    #[tokio::test]
    async fn test_status_of_unknown_id_is_successful() {
        let f = fixture();
        let result = f
            .dispatcher
            .dispatch(&json!({ "name": "orders_status_by_id", "arguments": { "id": 41 } }))
            .await;

        assert_ne!(result.is_error, Some(true));
        assert_eq!(
            structured_result(&result),
            json!({ "id": 41, "message": "not found" })
        );
    }

    #[tokio::test]
    async fn test_non_positive_amount_writes_nothing() {
        let f = fixture();

        for amount in [json!(0), json!(-3.5)] {
            let result = f
                .dispatcher
                .dispatch(&json!({
                    "name": "orders_create",
                    "arguments": { "client": "Ana", "amount": amount }
                }))
                .await;

            assert_eq!(result.is_error, Some(true));
            assert!(first_text(&result).unwrap().contains("amount"));
        }

        assert!(f.store.is_empty());
        assert_eq!(f.store.operations(), 0);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_named_in_the_error() {
        let f = fixture();
        let result = f
            .dispatcher
            .dispatch(&json!({ "name": "orders_delete", "arguments": {} }))
            .await;

        assert_eq!(result.is_error, Some(true));
        assert!(first_text(&result).unwrap().contains("orders_delete"));
        assert_eq!(f.store.operations(), 0);
    }

    #[tokio::test]
    async fn test_missing_name_skips_registry_and_store() {
        let f = fixture();
        let result = f
            .dispatcher
            .dispatch(&json!({ "arguments": { "id": 1 } }))
            .await;

        assert_eq!(result.is_error, Some(true));
        assert_eq!(f.dispatcher.registry().lookup_count(), 0);
        assert_eq!(f.store.operations(), 0);

        let err = f.dispatcher.try_dispatch(&json!(null)).await.unwrap_err();
        assert!(matches!(err, ToolError::MissingName));
    }

    #[tokio::test]
    async fn test_storage_failure_becomes_error_reply() {
        let f = fixture();
        f.store.set_unavailable(true);

        let result = f
            .dispatcher
            .dispatch(&json!({ "name": "orders_status_by_id", "arguments": { "id": 1 } }))
            .await;

        assert_eq!(result.is_error, Some(true));
        assert!(first_text(&result).unwrap().starts_with("Storage error"));
    }

    #[tokio::test]
    async fn test_connections_return_to_baseline_for_every_outcome() {
        let f = fixture();
        let baseline = f.store.connections_in_use();

        let requests = [
            json!({ "name": "orders_create", "arguments": { "client": "Ana", "amount": 2 } }),
            json!({ "name": "orders_status_by_id", "arguments": { "id": 1 } }),
            json!({ "name": "orders_status_by_id", "arguments": { "id": 500 } }),
            json!({ "name": "orders_status_by_id", "arguments": { "id": -1 } }),
            json!({ "name": "nope" }),
            json!({}),
        ];
        for request in &requests {
            f.dispatcher.dispatch(request).await;
            assert_eq!(f.store.connections_in_use(), baseline, "after {request}");
        }

        f.store.set_unavailable(true);
        f.dispatcher.dispatch(&requests[0]).await;
        assert_eq!(f.store.connections_in_use(), baseline);
    }

    #[tokio::test]
    async fn test_postgres_connections_settle_to_baseline() {
        let Some(config) = live_database_config() else {
            eprintln!("PG_HOST not set, skipping live PostgreSQL dispatch");
            return;
        };
        let pool = OrderPool::connect_lazy(&config);
        pool.ensure_schema().await.unwrap();
        let store: Arc<dyn OrderStore> = Arc::new(PgOrderStore::new(pool));
        let registry = Arc::new(ToolRegistry::with_default_tools().unwrap());
        let dispatcher = Dispatcher::new(registry, store.clone());
        let baseline = settled_connections(store.as_ref(), 0).await;

        let created = dispatcher
            .dispatch(&json!({
                "name": "orders_create",
                "arguments": { "client": "Ana", "amount": 10.5 }
            }))
            .await;
        let id = structured_result(&created)["id"].clone();
        assert_eq!(settled_connections(store.as_ref(), baseline).await, baseline);

        let requests = [
            json!({ "name": "orders_status_by_id", "arguments": { "id": id } }),
            json!({ "name": "orders_status_by_id", "arguments": { "id": i64::MAX } }),
            json!({ "name": "orders_create", "arguments": { "client": "Ana", "amount": 0 } }),
        ];
        for request in &requests {
            dispatcher.dispatch(request).await;
            assert_eq!(
                settled_connections(store.as_ref(), baseline).await,
                baseline,
                "after {request}"
            );
        }

        let calls = (0..10).map(|i| {
            let dispatcher = dispatcher.clone();
            async move {
                dispatcher
                    .dispatch(&json!({
                        "name": "orders_create",
                        "arguments": { "client": format!("client-{i}"), "amount": i + 1 }
                    }))
                    .await
            }
        });
        let results = futures::future::join_all(calls).await;
        assert!(results.iter().all(|r| r.is_error != Some(true)));
        assert_eq!(settled_connections(store.as_ref(), baseline).await, baseline);

        store.close().await;
    }

    #[tokio::test]
    async fn test_concurrent_calls_are_independent() {
        let f = fixture();

        let calls = (0..20).map(|i| {
            let dispatcher = f.dispatcher.clone();
            async move {
                dispatcher
                    .dispatch(&json!({
                        "name": "orders_create",
                        "arguments": { "client": format!("client-{i}"), "amount": i + 1 }
                    }))
                    .await
            }
        });
        let results = futures::future::join_all(calls).await;

        assert!(results.iter().all(|r| r.is_error != Some(true)));
        assert_eq!(f.store.len(), 20);
        assert_eq!(f.store.connections_in_use(), 0);
    }
}
