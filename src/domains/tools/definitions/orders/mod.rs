//! Order tools.

pub mod create;
pub mod status;

use schemars::JsonSchema;
use serde::Serialize;

pub use create::{CreateOrderParams, OrdersCreateTool};
pub use status::{
    MissingOrder, NOT_FOUND_MESSAGE, OrderStatusParams, OrdersStatusByIdTool, StatusLookup,
};

/// Shape of `structuredContent` for order tools.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ResultEnvelope<T> {
    pub result: T,
}
