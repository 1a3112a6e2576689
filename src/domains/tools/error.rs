//! Tool-specific error types.

use thiserror::Error;

use super::schema::ValidationError;
use crate::domains::orders::StoreError;

/// Errors that can end a tool call.
///
/// Every variant is turned into an error reply; none of them crosses the
/// protocol boundary as a protocol-level failure.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The request did not carry a tool name in any known field.
    #[error("Unsupported tool: no tool name found in request (expected a \"name\" field)")]
    MissingName,

    /// The requested tool was not found.
    #[error("Unsupported tool: {0}")]
    NotFound(String),

    /// Invalid arguments were provided to the tool.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(#[from] ValidationError),

    /// The order store failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    /// An internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ToolError {
    /// Create a new "not found" error.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    /// Create a new "internal" error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Short machine-friendly label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingName => "missing_name",
            Self::NotFound(_) => "unknown_tool",
            Self::InvalidArguments(_) => "validation",
            Self::Storage(_) => "storage",
            Self::Internal(_) => "internal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_tool_message_names_the_tool() {
        let err = ToolError::not_found("orders_delete");
        assert_eq!(err.to_string(), "Unsupported tool: orders_delete");
        assert_eq!(err.kind(), "unknown_tool");
    }

    #[test]
    fn test_validation_error_converts() {
        let err: ToolError = ValidationError::MissingField { field: "id" }.into();
        assert_eq!(err.to_string(), "Invalid arguments: missing required field `id`");
    }
}
