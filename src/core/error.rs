//! Error types and handling for the MCP server.
//!
//! These are startup and lifecycle errors. Errors raised while serving a
//! single tool call never reach this type; they are answered as error
//! replies by the dispatcher.

use thiserror::Error;

/// A specialized Result type for MCP server operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the MCP server.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The tool registry could not be built.
    #[error("Registry error: {0}")]
    Registry(#[from] crate::domains::tools::RegistryError),

    /// The order store could not be prepared.
    #[error("Store error: {0}")]
    Store(#[from] crate::domains::orders::StoreError),

    /// The transport could not be started or failed while serving.
    #[error("Transport error: {0}")]
    Transport(#[from] super::transport::TransportError),
}

impl Error {
    /// Create a new configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
