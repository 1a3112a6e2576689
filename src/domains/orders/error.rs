//! Order store error types.

use thiserror::Error;

/// Errors surfaced by an [`OrderStore`](super::OrderStore).
///
/// Stores never retry; the error is handed upward as-is.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No connection could be obtained from the pool.
    #[error("Database connection unavailable: {0}")]
    Acquire(#[source] sqlx::Error),

    /// The statement itself failed.
    #[error("Database query failed: {0}")]
    Query(#[source] sqlx::Error),

    /// The backend refused the operation.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The pool has been shut down.
    #[error("Store is closed")]
    Closed,
}

impl StoreError {
    /// Create a new "unavailable" error.
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}
