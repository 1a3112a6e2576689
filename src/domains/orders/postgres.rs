//! PostgreSQL-backed order store.
//!
//! [`OrderPool`] is the explicitly constructed pool handle: it is created once
//! at startup, shared by every call, and closed when the transport finishes.
//! [`PgOrderStore`] checks a connection out of it per operation.

use std::time::Duration;

use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use sqlx::Postgres;
use tracing::{debug, info, instrument, warn};

use super::error::StoreError;
use super::model::{NewOrder, Order};
use super::store::OrderStore;
use crate::core::config::DatabaseConfig;

/// DDL for the `orders` table.
pub const SCHEMA_SQL: &str = include_str!("../../../sql/orders.sql");

const FIND_ORDER_SQL: &str =
    "SELECT id::int8, client, amount::float8, status FROM orders WHERE id = $1";

const INSERT_ORDER_SQL: &str = "INSERT INTO orders (client, amount, status) \
     VALUES ($1, $2::numeric, 'pending') RETURNING id::int8";

/// Shared PostgreSQL connection pool.
#[derive(Clone)]
pub struct OrderPool {
    pool: PgPool,
}

impl OrderPool {
    /// Build the pool without opening any connection yet.
    ///
    /// Connectivity problems are reported by the calls that hit them rather
    /// than at startup.
    pub fn connect_lazy(config: &DatabaseConfig) -> Self {
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .database(&config.database)
            .username(&config.user)
            .password(&config.password);

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect_lazy_with(options);

        info!(
            "PG config -> host={} port={} db={} user={} max_connections={}",
            config.host, config.port, config.database, config.user, config.max_connections
        );

        Self { pool }
    }

    /// Create the `orders` table if it does not exist.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        let mut conn = self.acquire().await?;
        sqlx::query(SCHEMA_SQL)
            .execute(&mut *conn)
            .await
            .map_err(StoreError::Query)?;
        info!("orders table is ready");
        Ok(())
    }

    /// Check out one connection. It returns to the pool when dropped.
    pub async fn acquire(&self) -> Result<PoolConnection<Postgres>, StoreError> {
        self.pool.acquire().await.map_err(|e| match e {
            sqlx::Error::PoolClosed => StoreError::Closed,
            e => {
                warn!("PG pool error: {}", e);
                StoreError::Acquire(e)
            }
        })
    }

    /// Connections currently checked out.
    pub fn in_use(&self) -> usize {
        (self.pool.size() as usize).saturating_sub(self.pool.num_idle())
    }

    /// Close every connection and refuse further checkouts.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Order store over an [`OrderPool`].
pub struct PgOrderStore {
    pool: OrderPool,
}

impl PgOrderStore {
    pub fn new(pool: OrderPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &OrderPool {
        &self.pool
    }
}

#[async_trait::async_trait]
impl OrderStore for PgOrderStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    #[instrument(skip(self))]
    async fn find_order(&self, id: i64) -> Result<Option<Order>, StoreError> {
        let mut conn = self.pool.acquire().await?;

        let row: Option<(i64, String, f64, String)> = sqlx::query_as(FIND_ORDER_SQL)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(StoreError::Query)?;

        debug!(found = row.is_some(), "order lookup finished");

        Ok(row.map(|(id, client, amount, status)| Order {
            id,
            client,
            amount,
            status: status.into(),
        }))
    }

    #[instrument(skip(self, order), fields(client = %order.client))]
    async fn insert_order(&self, order: &NewOrder) -> Result<i64, StoreError> {
        let mut conn = self.pool.acquire().await?;

        let id: i64 = sqlx::query_scalar(INSERT_ORDER_SQL)
            .bind(&order.client)
            .bind(order.amount)
            .fetch_one(&mut *conn)
            .await
            .map_err(StoreError::Query)?;

        debug!(id, "order inserted");
        Ok(id)
    }

    fn connections_in_use(&self) -> usize {
        self.pool.in_use()
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("PG pool closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::live_database_config;
    use crate::domains::orders::settled_connections;

    fn live_store() -> PgOrderStore {
        let config = live_database_config().expect("PG_HOST and valid PG_* environment");
        PgOrderStore::new(OrderPool::connect_lazy(&config))
    }

    #[tokio::test]
    async fn test_lazy_pool_starts_without_connections() {
        let store = PgOrderStore::new(OrderPool::connect_lazy(&DatabaseConfig::default()));
        assert_eq!(store.connections_in_use(), 0);
        assert_eq!(store.backend(), "postgres");
    }

    #[tokio::test]
    async fn test_closed_pool_reports_closed() {
        let store = PgOrderStore::new(OrderPool::connect_lazy(&DatabaseConfig::default()));
        store.close().await;

        let result = store.find_order(1).await;
        assert!(matches!(result, Err(StoreError::Closed)));
        assert_eq!(store.connections_in_use(), 0);
    }

    #[tokio::test]
    #[ignore = "requires a running PostgreSQL (PG_HOST and PG_* env)"]
    async fn test_insert_then_find_against_live_database() {
        let store = live_store();
        store.pool().ensure_schema().await.unwrap();
        let baseline = settled_connections(&store, 0).await;
        assert_eq!(baseline, 0);

        let new_order = NewOrder {
            client: "Ana".to_string(),
            amount: 10.5,
        };
        let id = store.insert_order(&new_order).await.unwrap();
        let found = store.find_order(id).await.unwrap().unwrap();

        assert_eq!(found, new_order.into_order(id));
        assert_eq!(settled_connections(&store, baseline).await, baseline);
    }

    #[tokio::test]
    #[ignore = "requires a running PostgreSQL (PG_HOST and PG_* env)"]
    async fn test_missing_row_against_live_database() {
        let store = live_store();
        store.pool().ensure_schema().await.unwrap();
        let baseline = settled_connections(&store, 0).await;

        let found = store.find_order(i64::MAX).await.unwrap();
        assert!(found.is_none());
        assert_eq!(settled_connections(&store, baseline).await, baseline);
    }
}
