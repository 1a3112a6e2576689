//! In-process order store.
//!
//! Mirrors the pooled behaviour of [`PgOrderStore`](super::PgOrderStore):
//! a fixed number of connection slots, one held per operation and released
//! when the operation returns. Used for offline runs and the test-suite.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, warn};

use super::error::StoreError;
use super::model::{NewOrder, Order};
use super::store::OrderStore;

/// Order store kept in memory.
pub struct MemoryOrderStore {
    rows: Mutex<BTreeMap<i64, Order>>,
    next_id: AtomicI64,
    slots: Arc<Semaphore>,
    capacity: usize,
    unavailable: AtomicBool,
    operations: AtomicI64,
}

impl MemoryOrderStore {
    /// Create an empty store with `capacity` connection slots.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            rows: Mutex::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
            slots: Arc::new(Semaphore::new(capacity)),
            capacity,
            unavailable: AtomicBool::new(false),
            operations: AtomicI64::new(0),
        }
    }

    /// Make every subsequent operation fail after checking out its slot.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of stored orders.
    pub fn len(&self) -> usize {
        self.rows.lock().map(|rows| rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of operations that reached the store, failed ones included.
    pub fn operations(&self) -> i64 {
        self.operations.load(Ordering::SeqCst)
    }

    async fn checkout(&self) -> Result<OwnedSemaphorePermit, StoreError> {
        let slot = self
            .slots
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| StoreError::Closed)?;

        self.operations.fetch_add(1, Ordering::SeqCst);

        if self.unavailable.load(Ordering::SeqCst) {
            warn!("memory store is unavailable");
            return Err(StoreError::unavailable("memory store is offline"));
        }
        Ok(slot)
    }
}

impl Default for MemoryOrderStore {
    fn default() -> Self {
        Self::new(5)
    }
}

#[async_trait::async_trait]
impl OrderStore for MemoryOrderStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn find_order(&self, id: i64) -> Result<Option<Order>, StoreError> {
        let _slot = self.checkout().await?;
        let rows = self
            .rows
            .lock()
            .map_err(|_| StoreError::unavailable("order table lock poisoned"))?;
        Ok(rows.get(&id).cloned())
    }

    async fn insert_order(&self, order: &NewOrder) -> Result<i64, StoreError> {
        let _slot = self.checkout().await?;
        let mut rows = self
            .rows
            .lock()
            .map_err(|_| StoreError::unavailable("order table lock poisoned"))?;

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        rows.insert(id, order.clone().into_order(id));
        debug!(id, "order inserted");
        Ok(id)
    }

    fn connections_in_use(&self) -> usize {
        if self.slots.is_closed() {
            return 0;
        }
        self.capacity - self.slots.available_permits()
    }

    async fn close(&self) {
        self.slots.close();
    }
}
