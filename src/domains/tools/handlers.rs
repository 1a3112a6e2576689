//! Tool handler trait.
//!
//! A handler is bound to exactly one tool. It declares its input schema once
//! and only ever receives arguments that already passed that schema.

use std::sync::Arc;

use rmcp::model::{JsonObject, Tool};
use serde_json::Value;

use super::error::ToolError;
use super::schema::{ToolSchema, ValidatedArgs};
use crate::domains::orders::OrderStore;

/// Trait implemented by every tool exposed by the server.
#[async_trait::async_trait]
pub trait ToolHandler: Send + Sync {
    /// Get the name of this tool.
    fn name(&self) -> &'static str;

    /// Get the description of this tool.
    fn description(&self) -> &'static str;

    /// Input schema, used both for advertising and for validation.
    fn schema(&self) -> &'static ToolSchema;

    /// JSON Schema of `structuredContent`, if the tool publishes one.
    fn output_schema(&self) -> Option<Arc<JsonObject>> {
        None
    }

    /// Execute the tool against the order store.
    async fn execute(&self, args: ValidatedArgs, store: &dyn OrderStore)
    -> Result<Value, ToolError>;

    /// Create a Tool model for this tool (metadata).
    fn to_tool(&self) -> Tool {
        Tool {
            name: self.name().into(),
            description: Some(self.description().into()),
            input_schema: Arc::new(self.schema().to_json_schema()),
            annotations: None,
            output_schema: self.output_schema(),
            icons: None,
            meta: None,
            title: None,
        }
    }
}
