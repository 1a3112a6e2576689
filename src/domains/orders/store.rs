//! The persistence seam used by the tool handlers.

use super::error::StoreError;
use super::model::{NewOrder, Order};

/// Scoped access to the order store.
///
/// Every operation holds exactly one pooled connection for its own duration
/// and releases it on every exit path. The release starts when the returned
/// future completes; a pooled backend may hand the connection back in the
/// background, so `connections_in_use()` returns to its previous value once
/// the pool settles rather than at that exact instant.
#[async_trait::async_trait]
pub trait OrderStore: Send + Sync {
    /// Short backend name for logging (`postgres`, `memory`).
    fn backend(&self) -> &'static str;

    /// Look up a single order by primary key.
    async fn find_order(&self, id: i64) -> Result<Option<Order>, StoreError>;

    /// Insert a new `pending` order and return the generated id.
    async fn insert_order(&self, order: &NewOrder) -> Result<i64, StoreError>;

    /// Number of connections currently checked out of the pool.
    fn connections_in_use(&self) -> usize;

    /// Shut the pool down. Later operations fail with [`StoreError::Closed`].
    async fn close(&self);
}

/// Poll `connections_in_use()` until it equals `expected` or a second has
/// passed, and return the last reading.
#[cfg(test)]
pub(crate) async fn settled_connections(store: &dyn OrderStore, expected: usize) -> usize {
    let wait = async {
        while store.connections_in_use() != expected {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
    };
    let _ = tokio::time::timeout(std::time::Duration::from_secs(1), wait).await;
    store.connections_in_use()
}
