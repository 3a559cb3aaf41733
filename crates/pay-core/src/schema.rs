//! # Tool Schemas
//!
//! Parameter schemas for catalog tools and the typed values arguments are
//! coerced into at the dispatch boundary.

use crate::error::{ToolError, ToolResult};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

/// Declared type of a tool parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Integer,
    Boolean,
    Object,
}

impl ParamType {
    /// JSON Schema type name
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Integer => "integer",
            ParamType::Boolean => "boolean",
            ParamType::Object => "object",
        }
    }
}

impl std::fmt::Display for ParamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Schema of a single tool parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    #[serde(rename = "type")]
    pub param_type: ParamType,

    pub description: String,

    #[serde(default)]
    pub required: bool,

    /// Injected when the argument is absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl ParamSpec {
    pub fn new(param_type: ParamType, description: impl Into<String>) -> Self {
        Self {
            param_type,
            description: description.into(),
            required: false,
            default: None,
        }
    }

    pub fn string(description: impl Into<String>) -> Self {
        Self::new(ParamType::String, description)
    }

    pub fn integer(description: impl Into<String>) -> Self {
        Self::new(ParamType::Integer, description)
    }

    pub fn boolean(description: impl Into<String>) -> Self {
        Self::new(ParamType::Boolean, description)
    }

    pub fn object(description: impl Into<String>) -> Self {
        Self::new(ParamType::Object, description)
    }

    /// Builder: mark as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Builder: declare a default value
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Coerce a loosely-typed JSON value into this parameter's type.
    ///
    /// Returns `Ok(None)` for null and falsy-empty values (empty string,
    /// empty object) so that callers treat them as absent.
    pub fn coerce(&self, field: &str, raw: &Value) -> ToolResult<Option<ParamValue>> {
        let mismatch = || {
            ToolError::validation(field, format!("expected {}, got {}", self.param_type, type_name(raw)))
        };

        match (self.param_type, raw) {
            (_, Value::Null) => Ok(None),

            (ParamType::String, Value::String(s)) if s.trim().is_empty() => Ok(None),
            (ParamType::String, Value::String(s)) => Ok(Some(ParamValue::String(s.clone()))),
            (ParamType::String, Value::Number(n)) => Ok(Some(ParamValue::String(n.to_string()))),
            (ParamType::String, Value::Bool(b)) => Ok(Some(ParamValue::String(b.to_string()))),

            (ParamType::Integer, Value::Number(n)) => {
                if let Some(i) = n.as_i64() {
                    return Ok(Some(ParamValue::Integer(i)));
                }
                match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                        Ok(Some(ParamValue::Integer(f as i64)))
                    }
                    _ => Err(mismatch()),
                }
            }
            (ParamType::Integer, Value::String(s)) if s.trim().is_empty() => Ok(None),
            (ParamType::Integer, Value::String(s)) => s
                .trim()
                .parse::<i64>()
                .map(|i| Some(ParamValue::Integer(i)))
                .map_err(|_| mismatch()),

            (ParamType::Boolean, Value::Bool(b)) => Ok(Some(ParamValue::Boolean(*b))),
            (ParamType::Boolean, Value::String(s)) if s.trim().is_empty() => Ok(None),
            (ParamType::Boolean, Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "true" => Ok(Some(ParamValue::Boolean(true))),
                "false" => Ok(Some(ParamValue::Boolean(false))),
                _ => Err(mismatch()),
            },

            (ParamType::Object, Value::Object(m)) if m.is_empty() => Ok(None),
            (ParamType::Object, Value::Object(m)) => Ok(Some(ParamValue::Object(m.clone()))),
            // Agents frequently send objects as JSON-encoded strings
            (ParamType::Object, Value::String(s)) if s.trim().is_empty() => Ok(None),
            (ParamType::Object, Value::String(s)) => match serde_json::from_str::<Value>(s) {
                Ok(Value::Object(m)) if m.is_empty() => Ok(None),
                Ok(Value::Object(m)) => Ok(Some(ParamValue::Object(m))),
                _ => Err(mismatch()),
            },

            _ => Err(mismatch()),
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A validated argument value, tagged with its declared type
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    String(String),
    Integer(i64),
    Boolean(bool),
    Object(Map<String, Value>),
}

impl ParamValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParamValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn into_json(self) -> Value {
        match self {
            ParamValue::String(s) => Value::String(s),
            ParamValue::Integer(i) => Value::from(i),
            ParamValue::Boolean(b) => Value::Bool(b),
            ParamValue::Object(m) => Value::Object(m),
        }
    }
}

/// A named, schema-described operation in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique, stable identifier (e.g., "order_create")
    pub name: String,

    pub description: String,

    #[serde(default)]
    pub parameters: BTreeMap<String, ParamSpec>,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: BTreeMap::new(),
        }
    }

    /// Builder: declare a parameter
    pub fn param(mut self, name: impl Into<String>, spec: ParamSpec) -> Self {
        self.parameters.insert(name.into(), spec);
        self
    }

    /// Names of the required parameters, sorted
    pub fn required_params(&self) -> Vec<&str> {
        self.parameters
            .iter()
            .filter(|(_, spec)| spec.required)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// JSON Schema for the session protocol's `inputSchema`
    pub fn input_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .parameters
            .iter()
            .map(|(name, spec)| {
                let mut prop = json!({
                    "type": spec.param_type.as_str(),
                    "description": spec.description,
                });
                if let Some(default) = &spec.default {
                    prop["default"] = default.clone();
                }
                (name.clone(), prop)
            })
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": self.required_params(),
        })
    }
}
