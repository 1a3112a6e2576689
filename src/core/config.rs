//! Configuration management for the MCP server.
//!
//! This module provides a centralized configuration structure that is
//! resolved once at startup from `.env`, environment variables, and defaults.

use super::error::{Error, Result};
use super::transport::TransportConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{info, warn};

/// Main configuration structure for the MCP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Transport configuration.
    pub transport: TransportConfig,

    /// Order store selection.
    pub store: StoreConfig,

    /// PostgreSQL connection settings.
    pub database: DatabaseConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,

    /// File every log line is appended to, in addition to stderr.
    pub file: Option<PathBuf>,
}

/// Which order store backs the tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            "memory" | "mem" => Ok(Self::Memory),
            other => Err(Error::config(format!("unknown store backend: {}", other))),
        }
    }
}

/// Order store configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
}

/// PostgreSQL connection and pool settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,

    /// Upper bound of pooled connections.
    pub max_connections: u32,

    /// How long a call waits for a free connection.
    pub acquire_timeout_secs: u64,

    /// Create the `orders` table at startup if missing.
    pub init_schema: bool,
}

/// Custom Debug implementation to redact secrets from logs.
impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("max_connections", &self.max_connections)
            .field("acquire_timeout_secs", &self.acquire_timeout_secs)
            .field("init_schema", &self.init_schema)
            .finish()
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            database: "orders".to_string(),
            user: "admin".to_string(),
            password: "admin".to_string(),
            max_connections: 5,
            acquire_timeout_secs: 5,
            init_schema: false,
        }
    }
}

impl DatabaseConfig {
    /// Load database settings from `PG_*` and `MCP_DB_*` variables.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(host) = std::env::var("PG_HOST") {
            config.host = host;
        }
        if let Some(port) = parse_var("PG_PORT")? {
            config.port = port;
        }
        if let Ok(database) = std::env::var("PG_DATABASE") {
            config.database = database;
        }
        if let Ok(user) = std::env::var("PG_USER") {
            config.user = user;
        }
        if let Ok(password) = std::env::var("PG_PASSWORD") {
            config.password = password;
        }
        if let Some(max) = parse_var("MCP_DB_MAX_CONNECTIONS")? {
            config.max_connections = max;
        }
        if let Some(secs) = parse_var("MCP_DB_ACQUIRE_TIMEOUT_SECS")? {
            config.acquire_timeout_secs = secs;
        }
        if let Some(init) = parse_var("MCP_DB_INIT_SCHEMA")? {
            config.init_schema = init;
        }

        if config.max_connections == 0 {
            return Err(Error::config("MCP_DB_MAX_CONNECTIONS must be at least 1"));
        }

        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "mcp-orders".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file: Some(PathBuf::from("mcp_orders.log")),
            },
            transport: TransportConfig::default(),
            store: StoreConfig::default(),
            database: DatabaseConfig::default(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    ///
    /// Server variables are prefixed with `MCP_` (`MCP_SERVER_NAME`,
    /// `MCP_LOG_LEVEL`, ...); database variables use `PG_*`.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(name) = std::env::var("MCP_SERVER_NAME") {
            config.server.name = name;
        }

        if let Ok(level) = std::env::var("MCP_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Ok(file) = std::env::var("MCP_LOG_FILE") {
            config.logging.file = if file.trim().is_empty() {
                None
            } else {
                Some(PathBuf::from(file))
            };
        }

        // Load transport configuration from environment
        config.transport = TransportConfig::from_env();

        if let Ok(backend) = std::env::var("MCP_STORE_BACKEND") {
            config.store.backend = backend.parse()?;
        }

        config.database = DatabaseConfig::from_env()?;

        if config.store.backend == StoreBackend::Memory {
            warn!("Using the in-memory order store; orders are lost on exit");
        } else {
            info!(
                "Order store: PostgreSQL at {}:{}/{}",
                config.database.host, config.database.port, config.database.database
            );
        }

        Ok(config)
    }
}

fn parse_var<T: FromStr>(key: &str) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| Error::config(format!("invalid {}={:?}: {}", key, raw, e))),
        Err(_) => Ok(None),
    }
}

/// Serializes tests that read or write process environment variables.
#[cfg(test)]
pub(crate) static ENV_TEST_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

/// Database settings from the environment, if `PG_HOST` is set.
#[cfg(test)]
pub(crate) fn live_database_config() -> Option<DatabaseConfig> {
    let _lock = ENV_TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    std::env::var("PG_HOST").ok()?;
    DatabaseConfig::from_env().ok()
}
