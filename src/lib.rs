//! Orders MCP Server Library
//!
//! A Model Context Protocol server exposing two order tools backed by
//! PostgreSQL: `orders_status_by_id` and `orders_create`.
//!
//! # Architecture
//!
//! - **core**: configuration, error handling, logging, the server handler
//!   and the transports
//! - **domains**
//!   - **orders**: the order model and the stores that persist it
//!   - **tools**: registry, request normalizer, argument validation,
//!     dispatcher and response building
//!
//! # Example
//!
//! ```rust,no_run
//! use orders_mcp_server::core::{Config, McpServer, TransportService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let server = McpServer::from_config(config.clone()).await?;
//!     TransportService::new(config.transport).run(server.clone()).await?;
//!     server.shutdown().await;
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

pub use core::{Config, Error, McpServer, Result};
