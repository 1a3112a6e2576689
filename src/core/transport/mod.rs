//! Transport layer for the orders MCP server.
//!
//! - **STDIO**: standard input/output (default for MCP), feature `stdio`
//! - **TCP**: one MCP session per accepted socket, feature `tcp`
//! - **HTTP**: JSON-RPC over POST, feature `http`
//!
//! Every transport returns once it has stopped serving (end of input or a
//! shutdown signal). Releasing the order store is left to the caller.

mod config;
mod error;
mod service;

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "tcp")]
pub mod tcp;

#[cfg(feature = "stdio")]
pub mod stdio;

pub use config::TransportConfig;
pub use error::{TransportError, TransportResult};
pub use service::TransportService;

#[cfg(any(feature = "tcp", feature = "http"))]
pub use config::BindAddress;

#[cfg(feature = "tcp")]
pub use config::TcpConfig;

#[cfg(feature = "http")]
pub use config::HttpConfig;

/// Resolves when the process receives Ctrl-C.
pub(crate) async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
