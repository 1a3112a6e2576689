//! Order status lookup tool.
//!
//! Returns the stored order for an id. An unknown id is a normal outcome and
//! produces a successful reply with a "not found" message.

use std::sync::Arc;

use rmcp::handler::server::tool::cached_schema_for_type;
use rmcp::model::JsonObject;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, instrument};

use super::ResultEnvelope;
use crate::domains::orders::{Order, OrderStore, StoreError};
use crate::domains::tools::ToolError;
use crate::domains::tools::handlers::ToolHandler;
use crate::domains::tools::schema::{FieldKind, FieldSpec, ToolSchema, ValidatedArgs};

// ============================================================================
// Tool Parameters
// ============================================================================

const FIELDS: &[FieldSpec] = &[FieldSpec::required(
    "id",
    "Order id",
    FieldKind::Integer { minimum: 0 },
)];

/// Parameters for the status lookup tool.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderStatusParams {
    pub id: i64,
}

// ============================================================================
// Tool Output
// ============================================================================

/// Message returned for ids without a matching row.
pub const NOT_FOUND_MESSAGE: &str = "not found";

/// Outcome of a status lookup.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(untagged)]
pub enum StatusLookup {
    Found(Order),
    Missing(MissingOrder),
}

/// Payload for an id with no matching order.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct MissingOrder {
    pub id: i64,
    pub message: String,
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Order status tool - point lookup by primary key.
#[derive(Debug, Clone, Default)]
pub struct OrdersStatusByIdTool;

impl OrdersStatusByIdTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "orders_status_by_id";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Return the status of an order by ID.";

    pub const SCHEMA: ToolSchema = ToolSchema::new(Self::NAME, FIELDS);

    /// Execute the lookup.
    #[instrument(skip_all, fields(id = params.id))]
    pub async fn lookup(
        params: &OrderStatusParams,
        store: &dyn OrderStore,
    ) -> Result<StatusLookup, StoreError> {
        info!("Order status requested");

        let lookup = match store.find_order(params.id).await? {
            Some(order) => StatusLookup::Found(order),
            None => {
                info!("No order with id {}", params.id);
                StatusLookup::Missing(MissingOrder {
                    id: params.id,
                    message: NOT_FOUND_MESSAGE.to_string(),
                })
            }
        };
        Ok(lookup)
    }
}

#[async_trait::async_trait]
impl ToolHandler for OrdersStatusByIdTool {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        Self::DESCRIPTION
    }

    fn schema(&self) -> &'static ToolSchema {
        &Self::SCHEMA
    }

    fn output_schema(&self) -> Option<Arc<JsonObject>> {
        Some(cached_schema_for_type::<ResultEnvelope<StatusLookup>>())
    }

    async fn execute(
        &self,
        args: ValidatedArgs,
        store: &dyn OrderStore,
    ) -> Result<Value, ToolError> {
        let params: OrderStatusParams = args.into_params()?;
        let lookup = Self::lookup(&params, store).await?;
        serde_json::to_value(lookup).map_err(|e| ToolError::internal(e.to_string()))
    }
}

// ============================================================================
// Tests
// ============================================================================
