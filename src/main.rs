//! Orders MCP server entry point.
//!
//! Loads configuration, initializes logging, opens the order store and
//! serves the configured transport. The store is closed once the transport
//! stops.

use anyhow::Result;
use tracing::{error, info};

use orders_mcp_server::core::{Config, McpServer, TransportService, init_logging};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    init_logging(&config.logging);

    info!("Starting {} v{}", config.server.name, config.server.version);

    let server = match McpServer::from_config(config.clone()).await {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to start server: {}", e);
            return Err(e.into());
        }
    };

    info!("Server initialized");

    let served = TransportService::new(config.transport).run(server.clone()).await;

    server.shutdown().await;
    info!("Server shut down");

    served?;
    Ok(())
}
