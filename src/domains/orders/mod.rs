//! Orders domain module.
//!
//! Holds the order model and the persistence gateway the tools run against:
//!
//! - `model.rs` - `Order`, `NewOrder`, `OrderStatus`
//! - `store.rs` - the `OrderStore` trait (scoped, per-operation connections)
//! - `postgres.rs` - sqlx/PostgreSQL implementation and the `OrderPool` handle
//! - `memory.rs` - in-process implementation for offline runs and tests

mod error;
mod memory;
mod model;
mod postgres;
mod store;

pub use error::StoreError;
pub use memory::MemoryOrderStore;
pub use model::{NewOrder, Order, OrderStatus};
pub use postgres::{OrderPool, PgOrderStore, SCHEMA_SQL};
pub use store::OrderStore;

#[cfg(test)]
pub(crate) use store::settled_connections;
