//! Order creation tool.

use std::sync::Arc;

use rmcp::handler::server::tool::cached_schema_for_type;
use rmcp::model::JsonObject;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, instrument};

use super::ResultEnvelope;
use crate::domains::orders::{NewOrder, Order, OrderStore, StoreError};
use crate::domains::tools::ToolError;
use crate::domains::tools::handlers::ToolHandler;
use crate::domains::tools::schema::{FieldKind, FieldSpec, ToolSchema, ValidatedArgs};

// ============================================================================
// Tool Parameters
// ============================================================================

const FIELDS: &[FieldSpec] = &[
    FieldSpec::required("client", "Client name", FieldKind::Text { min_length: 1 }),
    FieldSpec::required(
        "amount",
        "Order amount, strictly positive",
        FieldKind::Number {
            exclusive_minimum: 0.0,
        },
    ),
];

/// Parameters for the create order tool.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderParams {
    pub client: String,
    pub amount: f64,
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Create order tool - inserts a `pending` order and returns it with its id.
#[derive(Debug, Clone, Default)]
pub struct OrdersCreateTool;

impl OrdersCreateTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "orders_create";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Create a new order and return the generated ID.";

    pub const SCHEMA: ToolSchema = ToolSchema::new(Self::NAME, FIELDS);

    /// Insert the order.
    #[instrument(skip_all, fields(client = %params.client, amount = params.amount))]
    pub async fn create(
        params: CreateOrderParams,
        store: &dyn OrderStore,
    ) -> Result<Order, StoreError> {
        let new_order = NewOrder {
            client: params.client,
            amount: params.amount,
        };

        let id = store.insert_order(&new_order).await?;
        info!("Created order {}", id);

        Ok(new_order.into_order(id))
    }
}

#[async_trait::async_trait]
impl ToolHandler for OrdersCreateTool {
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
        Some(cached_schema_for_type::<ResultEnvelope<Order>>())
    }

    async fn execute(
        &self,
        args: ValidatedArgs,
        store: &dyn OrderStore,
    ) -> Result<Value, ToolError> {
        let params: CreateOrderParams = args.into_params()?;
        let order = Self::create(params, store).await?;
        serde_json::to_value(order).map_err(|e| ToolError::internal(e.to_string()))
    }
}

// ============================================================================
// Tests
// ============================================================================
