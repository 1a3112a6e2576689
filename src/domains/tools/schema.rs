//! Tool input schemas.
//!
//! Each tool declares its inputs once, as a [`ToolSchema`]. The same
//! declaration renders the JSON Schema advertised in `tools/list` and
//! enforces the arguments of `tools/call`, so the two always agree.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use thiserror::Error;

/// Type and constraint of a single input field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    /// Whole number, `>= minimum`.
    Integer { minimum: i64 },
    /// Finite number, `> exclusive_minimum`.
    Number { exclusive_minimum: f64 },
    /// String of at least `min_length` characters.
    Text { min_length: usize },
}

impl FieldKind {
    fn json_type(&self) -> &'static str {
        match self {
            Self::Integer { .. } => "integer",
            Self::Number { .. } => "number",
            Self::Text { .. } => "string",
        }
    }
}

/// Declaration of one input field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldSpec {
    pub const fn required(name: &'static str, description: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            description,
            kind,
            required: true,
        }
    }
}

/// Argument validation failure, naming the field and the violated constraint.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("missing required field `{field}`")]
    MissingField { field: &'static str },

    #[error("field `{field}` must be {expected}, got {found}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    #[error("field `{field}` must be {constraint}")]
    OutOfRange { field: &'static str, constraint: String },

    #[error("field `{field}` must be at least {min_length} character(s) long")]
    TooShort { field: &'static str, min_length: usize },

    #[error("arguments do not match `{tool}` parameters: {reason}")]
    Malformed { tool: &'static str, reason: String },
}

impl ValidationError {
    /// Name of the offending field, if the error is about a single field.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::MissingField { field }
            | Self::WrongType { field, .. }
            | Self::OutOfRange { field, .. }
            | Self::TooShort { field, .. } => Some(field),
            Self::Malformed { .. } => None,
        }
    }
}

/// Arguments that passed validation: coerced, with undeclared keys removed.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedArgs {
    tool: &'static str,
    values: Map<String, Value>,
}

impl ValidatedArgs {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    /// Deserialize into the tool's typed parameters.
    pub fn into_params<T: DeserializeOwned>(self) -> Result<T, ValidationError> {
        serde_json::from_value(Value::Object(self.values)).map_err(|e| {
            ValidationError::Malformed {
                tool: self.tool,
                reason: e.to_string(),
            }
        })
    }
}

/// Input schema of a tool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolSchema {
    pub tool: &'static str,
    pub fields: &'static [FieldSpec],
}

impl ToolSchema {
    pub const fn new(tool: &'static str, fields: &'static [FieldSpec]) -> Self {
        Self { tool, fields }
    }

    /// Render the advertised JSON Schema object.
    pub fn to_json_schema(&self) -> Map<String, Value> {
        let mut properties = Map::new();
        for field in self.fields {
            let mut property = Map::new();
            property.insert("type".into(), json!(field.kind.json_type()));
            property.insert("description".into(), json!(field.description));
            match field.kind {
                FieldKind::Integer { minimum } => {
                    property.insert("minimum".into(), json!(minimum));
                }
                FieldKind::Number { exclusive_minimum } => {
                    property.insert("exclusiveMinimum".into(), json!(exclusive_minimum));
                }
                FieldKind::Text { min_length } => {
                    property.insert("minLength".into(), json!(min_length));
                }
            }
            properties.insert(field.name.into(), Value::Object(property));
        }

        let required: Vec<&str> = self
            .fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name)
            .collect();

        let mut schema = Map::new();
        schema.insert("type".into(), json!("object"));
        schema.insert("properties".into(), Value::Object(properties));
        schema.insert("required".into(), json!(required));
        schema
    }

    /// Check and coerce `args` against the declared fields.
    ///
    /// `null` counts as absent. Undeclared keys are dropped.
    pub fn validate(&self, args: &Map<String, Value>) -> Result<ValidatedArgs, ValidationError> {
        let mut values = Map::new();

        for field in self.fields {
            let value = match args.get(field.name) {
                None | Some(Value::Null) if field.required => {
                    return Err(ValidationError::MissingField { field: field.name });
                }
                None | Some(Value::Null) => continue,
                Some(value) => value,
            };
            values.insert(field.name.to_string(), check_field(field, value)?);
        }

        Ok(ValidatedArgs {
            tool: self.tool,
            values,
        })
    }
}

fn check_field(field: &FieldSpec, value: &Value) -> Result<Value, ValidationError> {
    let wrong_type = || ValidationError::WrongType {
        field: field.name,
        expected: field.kind.json_type(),
        found: json_type_name(value),
    };

    match field.kind {
        FieldKind::Integer { minimum } => {
            let number = value.as_number().ok_or_else(wrong_type)?;
            let int = if let Some(i) = number.as_i64() {
                i
            } else if number.is_u64() {
                return Err(ValidationError::OutOfRange {
                    field: field.name,
                    constraint: format!("at most {}", i64::MAX),
                });
            } else {
                let f = number.as_f64().ok_or_else(wrong_type)?;
                if f.fract() != 0.0 || !f.is_finite() {
                    return Err(wrong_type());
                }
                // i64::MAX as f64 rounds up to 2^63, which does not fit.
                if f.abs() >= i64::MAX as f64 {
                    return Err(ValidationError::OutOfRange {
                        field: field.name,
                        constraint: format!("at most {}", i64::MAX),
                    });
                }
                f as i64
            };
            if int < minimum {
                return Err(ValidationError::OutOfRange {
                    field: field.name,
                    constraint: format!(">= {}", minimum),
                });
            }
            Ok(json!(int))
        }
        FieldKind::Number { exclusive_minimum } => {
            let f = value.as_f64().ok_or_else(wrong_type)?;
            if !f.is_finite() || f <= exclusive_minimum {
                return Err(ValidationError::OutOfRange {
                    field: field.name,
                    constraint: format!("> {}", exclusive_minimum),
                });
            }
            Ok(value.clone())
        }
        FieldKind::Text { min_length } => {
            let s = value.as_str().ok_or_else(wrong_type)?;
            if s.chars().count() < min_length {
                return Err(ValidationError::TooShort {
                    field: field.name,
                    min_length,
                });
            }
            Ok(value.clone())
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
