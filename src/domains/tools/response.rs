//! Reply formatting.
//!
//! Every reply carries the result twice: pretty-printed JSON text for humans
//! and the same value under `structuredContent.result` for programs.

use rmcp::model::{CallToolResult, Content};
use serde_json::{Value, json};
use tracing::warn;

/// Key under which structured results are published.
pub const RESULT_KEY: &str = "result";

/// Build a successful reply for `result`.
pub fn success(result: Value) -> CallToolResult {
    let text = match serde_json::to_string_pretty(&result) {
        Ok(text) => text,
        Err(e) => {
            warn!("Failed to render result as text: {}", e);
            result.to_string()
        }
    };

    CallToolResult {
        content: vec![Content::text(text)],
        structured_content: Some(json!({ RESULT_KEY: result })),
        is_error: None,
        meta: None,
    }
}

/// Build an error reply carrying `message`.
pub fn error(message: impl Into<String>) -> CallToolResult {
    CallToolResult::error(vec![Content::text(message.into())])
}

/// Render a reply as the JSON object returned over HTTP.
pub fn to_json(result: &CallToolResult) -> Value {
    match serde_json::to_value(result) {
        Ok(value) => value,
        Err(e) => {
            warn!("Failed to serialize tool result: {}", e);
            json!({
                "content": [{ "type": "text", "text": e.to_string() }],
                "isError": true
            })
        }
    }
}

/// Text of the first content block, if it is text.
pub fn first_text(result: &CallToolResult) -> Option<&str> {
    result.content.first().and_then(|c| match &c.raw {
        rmcp::model::RawContent::Text(text) => Some(text.text.as_str()),
        _ => None,
    })
}
