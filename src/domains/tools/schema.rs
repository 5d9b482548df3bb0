//! Tool input schemas and argument validation.
//!
//! A [`Schema`] is plain data (field name, type, optionality) interpreted at
//! runtime. Tools usually derive it from their params struct through
//! `schemars`, but it can also be assembled by hand with the builder methods.
//!
//! Validation is structural only: it checks presence and JSON types. Filling
//! in defaults for absent optional fields is left to the tool itself.

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use std::fmt;
use thiserror::Error;

use super::ToolError;

/// Root path used in validation errors.
const ARGUMENTS_PATH: &str = "arguments";

/// JSON type accepted by a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
    /// No type constraint.
    Any,
}

impl FieldType {
    /// Parse a JSON Schema `type` keyword value.
    fn from_json_schema(name: &str) -> Option<Self> {
        match name {
            "string" => Some(Self::String),
            "integer" => Some(Self::Integer),
            "number" => Some(Self::Number),
            "boolean" => Some(Self::Boolean),
            "array" => Some(Self::Array),
            "object" => Some(Self::Object),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
            Self::Any => "any",
        }
    }

    fn matches(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::Array => value.is_array(),
            Self::Object => value.is_object(),
            Self::Any => true,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name of the JSON type of `value`, as used in error messages.
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// One declared argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub field_type: FieldType,
    pub required: bool,
    /// Whether an explicit `null` is accepted.
    pub nullable: bool,
    pub description: Option<String>,
}

/// Argument validation failure.
///
/// Reported to the client as a protocol error (`-32602`), since the call
/// never reached the tool.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is absent.
    #[error("Missing required field '{path}'")]
    MissingField { path: String },

    /// A field has the wrong JSON type.
    #[error("Invalid type for '{path}': expected {expected}, got {actual}")]
    TypeMismatch {
        path: String,
        expected: String,
        actual: String,
    },
}

impl ValidationError {
    pub fn path(&self) -> &str {
        match self {
            Self::MissingField { path } | Self::TypeMismatch { path, .. } => path,
        }
    }

    /// Structured detail for the JSON-RPC `data` member.
    pub fn to_data(&self) -> Value {
        match self {
            Self::MissingField { path } => json!({
                "path": path,
                "reason": "missing",
            }),
            Self::TypeMismatch {
                path,
                expected,
                actual,
            } => json!({
                "path": path,
                "expected": expected,
                "actual": actual,
            }),
        }
    }
}

/// Declarative description of a tool's accepted arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<FieldSpec>,
}

impl Schema {
    /// A schema accepting any object.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Derive a schema from a `schemars` params type.
    pub fn for_type<T: JsonSchema>() -> Self {
        let schema = schemars::schema_for!(T);
        Self::from_json_schema(schema.as_value())
    }

    /// Read the top-level `properties` / `required` of a JSON Schema object.
    ///
    /// Nested schemas are not descended into; a property whose `type` is
    /// missing or unrecognized is accepted as [`FieldType::Any`].
    pub fn from_json_schema(schema: &Value) -> Self {
        let required: Vec<&str> = schema
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        let fields = schema
            .get("properties")
            .and_then(Value::as_object)
            .map(|properties| {
                properties
                    .iter()
                    .map(|(name, property)| {
                        let (field_type, nullable) = parse_type(property.get("type"));
                        FieldSpec {
                            name: name.clone(),
                            field_type,
                            required: required.contains(&name.as_str()),
                            nullable,
                            description: property
                                .get("description")
                                .and_then(Value::as_str)
                                .map(str::to_string),
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self { fields }
    }

    /// Add a required, non-nullable field.
    pub fn required(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.fields.push(FieldSpec {
            name: name.into(),
            field_type,
            required: true,
            nullable: false,
            description: None,
        });
        self
    }

    /// Add an optional, non-nullable field.
    pub fn optional(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.fields.push(FieldSpec {
            name: name.into(),
            field_type,
            required: false,
            nullable: false,
            description: None,
        });
        self
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Check raw arguments against this schema.
    ///
    /// Absent or `null` arguments count as an empty object. Unknown fields
    /// are ignored and passed through untouched.
    pub fn validate(&self, raw: Option<&Value>) -> Result<ValidatedArgs, ValidationError> {
        let args = match raw {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(map)) => map.clone(),
            Some(other) => {
                return Err(ValidationError::TypeMismatch {
                    path: ARGUMENTS_PATH.to_string(),
                    expected: FieldType::Object.to_string(),
                    actual: json_type_name(other).to_string(),
                });
            }
        };

        for field in &self.fields {
            let path = format!("{ARGUMENTS_PATH}.{}", field.name);
            match args.get(&field.name) {
                None if field.required => return Err(ValidationError::MissingField { path }),
                None => {}
                Some(Value::Null) if field.nullable => {}
                Some(value) if field.field_type.matches(value) => {}
                Some(value) => {
                    return Err(ValidationError::TypeMismatch {
                        path,
                        expected: field.field_type.to_string(),
                        actual: json_type_name(value).to_string(),
                    });
                }
            }
        }

        Ok(ValidatedArgs(args))
    }

    /// Render as a JSON Schema object for `tools/list`.
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        for field in &self.fields {
            let mut property = Map::new();
            match (field.field_type, field.nullable) {
                (FieldType::Any, _) => {}
                (ty, true) => {
                    property.insert("type".into(), json!([ty.as_str(), "null"]));
                }
                (ty, false) => {
                    property.insert("type".into(), json!(ty.as_str()));
                }
            }
            if let Some(description) = &field.description {
                property.insert("description".into(), json!(description));
            }
            properties.insert(field.name.clone(), Value::Object(property));
        }

        let required: Vec<&str> = self
            .fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name.as_str())
            .collect();

        let mut schema = json!({
            "type": "object",
            "properties": properties,
        });
        if !required.is_empty() {
            schema["required"] = json!(required);
        }
        schema
    }
}

/// Parse a `type` keyword that is either a name or a list of names.
fn parse_type(keyword: Option<&Value>) -> (FieldType, bool) {
    match keyword {
        Some(Value::String(name)) => (
            FieldType::from_json_schema(name).unwrap_or(FieldType::Any),
            name == "null",
        ),
        Some(Value::Array(names)) => {
            let names: Vec<&str> = names.iter().filter_map(Value::as_str).collect();
            let nullable = names.contains(&"null");
            let non_null: Vec<&str> = names.into_iter().filter(|n| *n != "null").collect();
            let field_type = match non_null.as_slice() {
                [single] => FieldType::from_json_schema(single).unwrap_or(FieldType::Any),
                _ => FieldType::Any,
            };
            (field_type, nullable)
        }
        _ => (FieldType::Any, true),
    }
}

/// Arguments that passed schema validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedArgs(Map<String, Value>);

impl ValidatedArgs {
    /// Deserialize into the tool's params type.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, ToolError> {
        serde_json::from_value(Value::Object(self.0.clone()))
            .map_err(|e| ToolError::invalid_arguments(e.to_string()))
    }
}
