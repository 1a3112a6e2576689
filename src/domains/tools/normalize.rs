//! Request normalization.
//!
//! Callers do not agree on where a tool call keeps its name and arguments:
//! the MCP SDKs send `{name, arguments}`, some gateways send `toolName` or
//! `args`, others wrap everything in a JSON-RPC `params` envelope. The
//! normalizer turns any of these into a [`ToolCall`].
//!
//! The lookup order is plain data ([`NAME_PATHS`], [`ARGUMENT_PATHS`]) and
//! the first non-empty match wins.

use serde_json::{Map, Value};

/// Location of a field inside a request object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPath {
    /// A top-level field.
    Field(&'static str),
    /// A field of a nested object.
    Nested(&'static str, &'static str),
}

impl FieldPath {
    /// Resolve the path against `value`, tolerating missing structure.
    pub fn resolve<'a>(&self, value: &'a Value) -> Option<&'a Value> {
        match *self {
            Self::Field(key) => value.get(key),
            Self::Nested(outer, inner) => value.get(outer)?.get(inner),
        }
    }
}

/// Where to look for the tool name, in order.
pub const NAME_PATHS: &[FieldPath] = &[
    FieldPath::Field("name"),
    FieldPath::Field("toolName"),
    FieldPath::Nested("tool", "name"),
    FieldPath::Field("method"),
];

/// Where to look for the tool arguments, in order.
pub const ARGUMENT_PATHS: &[FieldPath] = &[
    FieldPath::Field("arguments"),
    FieldPath::Field("args"),
    FieldPath::Field("parameters"),
];

/// Field holding an optional request envelope.
const ENVELOPE_FIELD: &str = "params";

/// A canonical tool call.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub name: String,
    pub arguments: Map<String, Value>,
}

/// Extract a canonical call from an arbitrarily shaped request.
///
/// Returns `None` when no tool name can be found.
pub fn normalize(request: &Value) -> Option<ToolCall> {
    let inner = match request.get(ENVELOPE_FIELD) {
        Some(params @ Value::Object(_)) => params,
        _ => request,
    };

    let name = NAME_PATHS
        .iter()
        .filter_map(|path| path.resolve(inner))
        .filter_map(Value::as_str)
        .find(|name| !name.is_empty())?;

    let arguments = ARGUMENT_PATHS
        .iter()
        .filter_map(|path| path.resolve(inner))
        .filter_map(Value::as_object)
        .find(|args| !args.is_empty())
        .cloned()
        .unwrap_or_default();

    Some(ToolCall {
        name: name.to_string(),
        arguments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_every_name_path_yields_the_same_call() {
        let shapes = [
            json!({ "name": "orders_status_by_id", "arguments": { "id": 3 } }),
            json!({ "toolName": "orders_status_by_id", "args": { "id": 3 } }),
            json!({ "tool": { "name": "orders_status_by_id" }, "parameters": { "id": 3 } }),
            json!({ "method": "orders_status_by_id", "arguments": { "id": 3 } }),
            json!({ "params": { "name": "orders_status_by_id", "arguments": { "id": 3 } } }),
        ];

        for shape in &shapes {
            let call = normalize(shape).unwrap_or_else(|| panic!("no call for {shape}"));
            assert_eq!(call.name, "orders_status_by_id");
            assert_eq!(call.arguments.get("id"), Some(&json!(3)));
        }
    }

    #[test]
    fn test_name_paths_are_tried_in_order() {
        let request = json!({ "toolName": "second", "name": "first", "method": "fourth" });
        assert_eq!(normalize(&request).unwrap().name, "first");

        let request = json!({ "name": "", "tool": { "name": "third" }, "method": "fourth" });
        assert_eq!(normalize(&request).unwrap().name, "third");
    }

    #[test]
    fn test_envelope_wins_over_outer_fields() {
        let request = json!({
            "method": "tools/call",
            "params": { "name": "orders_create", "arguments": { "client": "Ana" } }
        });

        let call = normalize(&request).unwrap();
        assert_eq!(call.name, "orders_create");
        assert_eq!(call.arguments.get("client"), Some(&json!("Ana")));
    }

    #[test]
    fn test_missing_name_is_not_an_error() {
        assert!(normalize(&json!({})).is_none());
        assert!(normalize(&json!(null)).is_none());
        assert!(normalize(&json!("orders_create")).is_none());
        assert!(normalize(&json!({ "params": null, "arguments": { "id": 1 } })).is_none());
        assert!(normalize(&json!({ "tool": null, "name": 42 })).is_none());
    }

    #[test]
    fn test_arguments_default_to_empty_map() {
        let call = normalize(&json!({ "name": "orders_create" })).unwrap();
        assert!(call.arguments.is_empty());

        let call = normalize(&json!({ "name": "orders_create", "arguments": null })).unwrap();
        assert!(call.arguments.is_empty());
    }

    #[test]
    fn test_empty_arguments_fall_through_to_aliases() {
        let request = json!({
            "name": "orders_create",
            "arguments": {},
            "args": "not an object",
            "parameters": { "client": "Ana", "amount": 10.5 }
        });

        let call = normalize(&request).unwrap();
        assert_eq!(call.arguments.len(), 2);
        assert_eq!(call.arguments.get("amount"), Some(&json!(10.5)));
    }
}
