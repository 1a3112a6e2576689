//! Tool Registry - central registration and lookup for all tools.
//!
//! This module provides:
//! - Ordered registration of tool handlers (registration order is the
//!   order advertised by `tools/list`)
//! - O(1) lookup by name
//! - Rejection of duplicate names at startup

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use rmcp::model::Tool;
use thiserror::Error;
use tracing::debug;

use super::definitions::{OrdersCreateTool, OrdersStatusByIdTool};
use super::handlers::ToolHandler;

/// Errors raised while building the registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Tool registered twice: {0}")]
    DuplicateTool(String),
}

/// A tool descriptor together with its bound handler.
pub struct RegisteredTool {
    descriptor: Tool,
    handler: Arc<dyn ToolHandler>,
}

impl RegisteredTool {
    pub fn descriptor(&self) -> &Tool {
        &self.descriptor
    }

    pub fn handler(&self) -> &dyn ToolHandler {
        self.handler.as_ref()
    }
}

/// Tool registry - manages all available tools.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
    index: HashMap<&'static str, usize>,
    lookups: AtomicUsize,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding every tool the server exposes.
    ///
    /// This is the single place where tools are registered.
    pub fn with_default_tools() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        registry.register(Arc::new(OrdersStatusByIdTool))?;
        registry.register(Arc::new(OrdersCreateTool))?;
        Ok(registry)
    }

    /// Register a handler under its name.
    pub fn register(&mut self, handler: Arc<dyn ToolHandler>) -> Result<(), RegistryError> {
        let name = handler.name();
        if self.index.contains_key(name) {
            return Err(RegistryError::DuplicateTool(name.to_string()));
        }

        debug!("Registering tool {}", name);
        self.index.insert(name, self.tools.len());
        self.tools.push(RegisteredTool {
            descriptor: handler.to_tool(),
            handler,
        });
        Ok(())
    }

    /// All tool descriptors, in registration order.
    pub fn list(&self) -> Vec<Tool> {
        self.tools.iter().map(|t| t.descriptor.clone()).collect()
    }

    /// Find a tool by name.
    pub fn lookup(&self, name: &str) -> Option<&RegisteredTool> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        self.index.get(name).map(|&i| &self.tools[i])
    }

    /// Get all tool names, in registration order.
    pub fn tool_names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|t| t.handler.name()).collect()
    }

    /// Number of lookups served so far.
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_tool_names() {
        let registry = ToolRegistry::with_default_tools().unwrap();
        let names = registry.tool_names();
        assert_eq!(names, vec!["orders_status_by_id", "orders_create"]);
    }

    #[test]
    fn test_list_preserves_registration_order() {
        let registry = ToolRegistry::with_default_tools().unwrap();
        let listed: Vec<_> = registry
            .list()
            .into_iter()
            .map(|t| t.name.to_string())
            .collect();
        assert_eq!(listed, vec!["orders_status_by_id", "orders_create"]);
    }

    #[test]
    fn test_lookup() {
        let registry = ToolRegistry::with_default_tools().unwrap();
        let tool = registry.lookup("orders_create").unwrap();
        assert_eq!(tool.descriptor().name, "orders_create");
        assert_eq!(tool.handler().name(), "orders_create");
        assert!(registry.lookup("unknown").is_none());
        assert_eq!(registry.lookup_count(), 2);
    }

    #[test]
    fn test_duplicate_registration_is_rejected() {
        let mut registry = ToolRegistry::with_default_tools().unwrap();
        let err = registry.register(Arc::new(OrdersCreateTool)).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateTool(name) if name == "orders_create"));
        assert_eq!(registry.len(), 2);
    }
}
