//! Tools domain module.
//!
//! This module handles all tool-related functionality for the MCP server.
//! Tools are executable functions that can be called by MCP clients.
//!
//! ## Architecture
//!
//! - `definitions/` - Individual tool implementations (one file per tool)
//! - `normalize.rs` - Extracts `(name, arguments)` from any accepted request shape
//! - `schema.rs` - Single input declaration per tool: advertised and enforced
//! - `registry.rs` - Ordered tool registry with O(1) lookup
//! - `dispatcher.rs` - normalize → lookup → validate → execute
//! - `response.rs` - Text + structured reply formatting
//! - `error.rs` - Tool-specific error types
//!
//! ## Adding a New Tool
//!
//! 1. Create a new file in `definitions/` with its fields and a `ToolHandler` impl
//! 2. Export it in `definitions/mod.rs`
//! 3. Register it in `ToolRegistry::with_default_tools()`

pub mod definitions;
mod dispatcher;
mod error;
mod handlers;
pub mod normalize;
mod registry;
pub mod response;
pub mod schema;

pub use dispatcher::Dispatcher;
pub use error::ToolError;
pub use handlers::ToolHandler;
pub use normalize::{ToolCall, normalize};
pub use registry::{RegisteredTool, RegistryError, ToolRegistry};
pub use schema::{FieldKind, FieldSpec, ToolSchema, ValidatedArgs, ValidationError};
