//! Structural input schemas for tools.
//!
//! A [`ToolSchema`] describes the flat parameter object a tool accepts. It is
//! used twice: rendered as JSON Schema for the model, and as a validator that
//! normalizes the parameters the model produced before the tool runs.

use serde_json::{Map, Value, json};

use crate::error::FieldError;

/// Primitive JSON type of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Integer,
    Number,
    Boolean,
    Object,
    Array,
}

impl FieldType {
    fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
        }
    }

    fn matches(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::Object => value.is_object(),
            Self::Array => value.is_array(),
        }
    }
}

fn type_name(value: &Value) -> &'static str {
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

/// One declared parameter.
#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub kind: FieldType,
    pub description: String,
    pub required: bool,
    pub default: Option<Value>,
    pub allowed: Option<Vec<String>>,
}

/// Schema for a tool's parameter object.
#[derive(Debug, Clone, Default)]
pub struct ToolSchema {
    fields: Vec<Field>,
}

impl ToolSchema {
    /// Start an empty object schema.
    pub fn object() -> Self {
        Self::default()
    }

    /// Add a required field.
    pub fn required(self, name: &str, kind: FieldType, description: &str) -> Self {
        self.push(name, kind, description, true)
    }

    /// Add an optional field.
    pub fn optional(self, name: &str, kind: FieldType, description: &str) -> Self {
        self.push(name, kind, description, false)
    }

    /// Give the most recently added field a default value. Implies optional.
    pub fn with_default(mut self, default: Value) -> Self {
        if let Some(field) = self.fields.last_mut() {
            field.required = false;
            field.default = Some(default);
        }
        self
    }

    /// Restrict the most recently added string field to a fixed set of values.
    pub fn one_of(mut self, allowed: &[&str]) -> Self {
        if let Some(field) = self.fields.last_mut() {
            field.allowed = Some(allowed.iter().map(|s| s.to_string()).collect());
        }
        self
    }

    fn push(mut self, name: &str, kind: FieldType, description: &str, required: bool) -> Self {
        self.fields.push(Field {
            name: name.to_string(),
            kind,
            description: description.to_string(),
            required,
            default: None,
            allowed: None,
        });
        self
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Validate `params` and return them with defaults filled in.
    ///
    /// All problems are collected, not just the first one, so the model sees
    /// every field it got wrong in a single round.
    pub fn validate(&self, params: &Value) -> Result<Value, Vec<FieldError>> {
        let empty = Map::new();
        let object = match params {
            Value::Object(map) => map,
            // Models sometimes send `null` for a tool without arguments.
            Value::Null => &empty,
            other => {
                return Err(vec![FieldError::new(
                    "$",
                    format!("expected object, got {}", type_name(other)),
                )]);
            }
        };

        let mut errors = Vec::new();
        let mut normalized = Map::new();

        for field in &self.fields {
            match object.get(&field.name) {
                None | Some(Value::Null) => {
                    if let Some(default) = &field.default {
                        normalized.insert(field.name.clone(), default.clone());
                    } else if field.required {
                        errors.push(FieldError::new(&field.name, "is required"));
                    }
                }
                Some(value) if !field.kind.matches(value) => {
                    errors.push(FieldError::new(
                        &field.name,
                        format!(
                            "expected {}, got {}",
                            field.kind.as_str(),
                            type_name(value)
                        ),
                    ));
                }
                Some(value) => {
                    if let (Some(allowed), Some(s)) = (&field.allowed, value.as_str())
                        && !allowed.iter().any(|a| a == s)
                    {
                        errors.push(FieldError::new(
                            &field.name,
                            format!("must be one of: {}", allowed.join(", ")),
                        ));
                        continue;
                    }
                    normalized.insert(field.name.clone(), value.clone());
                }
            }
        }

        for key in object.keys() {
            if !self.fields.iter().any(|f| &f.name == key) {
                errors.push(FieldError::new(key, "unknown field"));
            }
        }

        if errors.is_empty() {
            Ok(Value::Object(normalized))
        } else {
            Err(errors)
        }
    }

    /// Render as a JSON Schema object for the model.
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for field in &self.fields {
            let mut prop = json!({
                "type": field.kind.as_str(),
                "description": field.description,
            });
            if let Some(default) = &field.default {
                prop["default"] = default.clone();
            }
            if let Some(allowed) = &field.allowed {
                prop["enum"] = json!(allowed);
            }
            properties.insert(field.name.clone(), prop);
            if field.required {
                required.push(field.name.clone());
            }
        }

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false,
        })
    }
}
