//! # Argument Normalizer
//!
//! Per-tool transform from a loosely-typed argument bag into the exact
//! `RemoteCall` the capability client expects.
//!
//! Normalization runs in four passes:
//!
//! 1. **Reshape** the raw object: flatten nested sub-objects into prefixed
//!    scalar fields and convert date strings into unix timestamps.
//! 2. **Validate** against the tool's `ParamSpec`s once, producing typed
//!    `Arguments` (defaults injected, falsy-empty optionals dropped).
//! 3. **Check** cross-field rules that a single `ParamSpec` cannot express.
//! 4. **Bind** the arguments to the tool's remote operation.

use crate::capability::{LifecycleAction, Payload, RemoteCall, Resource};
use crate::error::{ToolError, ToolResult};
use crate::schema::{ParamValue, ToolDefinition};
use chrono::{DateTime, NaiveDate};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::debug;

/// Currency injected when a monetary operation omits one
pub const DEFAULT_CURRENCY: &str = "INR";

/// Remote operation a tool is bound to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    /// Fetch one entity; `id_field` names the identifying argument
    Fetch {
        resource: Resource,
        id_field: &'static str,
    },
    /// List entities; every argument becomes a filter
    List { resource: Resource },
    /// Create an entity; every argument becomes payload
    Create { resource: Resource },
    /// Lifecycle action on the entity named by `id_field`
    Act {
        resource: Resource,
        id_field: &'static str,
        action: LifecycleAction,
    },
}

impl Binding {
    pub fn resource(&self) -> Resource {
        match self {
            Binding::Fetch { resource, .. }
            | Binding::List { resource }
            | Binding::Create { resource }
            | Binding::Act { resource, .. } => *resource,
        }
    }
}

/// Tool-specific reshaping and cross-field checks
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// `field: {k: v}` becomes `field_k: v` for each listed key.
    /// Nested values override flat ones supplied alongside.
    Flatten {
        field: &'static str,
        keys: &'static [&'static str],
    },
    /// Accept unix seconds, RFC 3339 or `YYYY-MM-DD` and store unix seconds
    Timestamp { field: &'static str },
    /// Keys that must be present inside an object argument
    NestedRequired {
        field: &'static str,
        keys: &'static [&'static str],
    },
    /// Inject `DEFAULT_CURRENCY` into an object argument lacking `currency`
    NestedCurrency { field: &'static str },
    /// `field` is required unless boolean `unless` is true
    RequiredUnless {
        field: &'static str,
        unless: &'static str,
    },
    /// String argument that ends up as a path segment upstream
    Identifier { field: &'static str },
}

/// Validated, typed arguments for one invocation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    values: BTreeMap<String, ParamValue>,
}

impl Arguments {
    /// Validate a reshaped argument object against a tool definition.
    pub fn validate(definition: &ToolDefinition, raw: &Map<String, Value>) -> ToolResult<Self> {
        let mut values = BTreeMap::new();

        for (name, spec) in &definition.parameters {
            let supplied = match raw.get(name) {
                Some(value) => spec.coerce(name, value)?,
                None => None,
            };

            let value = match supplied {
                Some(value) => Some(value),
                None => match &spec.default {
                    Some(default) => spec.coerce(name, default)?,
                    None if spec.required => return Err(ToolError::missing(name)),
                    None => None,
                },
            };

            if let Some(value) = value {
                values.insert(name.clone(), value);
            }
        }

        for key in raw.keys().filter(|k| !definition.parameters.contains_key(*k)) {
            debug!(tool = %definition.name, argument = %key, "ignoring undeclared argument");
        }

        Ok(Self { values })
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn take(&mut self, name: &str) -> Option<ParamValue> {
        self.values.remove(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_payload(self) -> Payload {
        self.values
            .into_iter()
            .map(|(name, value)| (name, value.into_json()))
            .collect()
    }
}

/// Normalization rule set and remote binding for one tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalizer {
    pub binding: Binding,
    pub rules: Vec<Rule>,
}

impl Normalizer {
    pub fn new(binding: Binding) -> Self {
        Self {
            binding,
            rules: Vec::new(),
        }
    }

    /// Builder: append a rule
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Produce the `RemoteCall` for `raw` arguments, or a `ValidationError`.
    pub fn normalize(&self, definition: &ToolDefinition, raw: &Value) -> ToolResult<RemoteCall> {
        let mut object = match raw {
            Value::Object(map) => map.clone(),
            Value::Null => Map::new(),
            _ => {
                return Err(ToolError::validation(
                    "arguments",
                    "expected a JSON object of named arguments",
                ))
            }
        };

        self.reshape(&mut object)?;
        let mut args = Arguments::validate(definition, &object)?;
        self.check(&mut args)?;
        self.bind(args)
    }

    fn reshape(&self, object: &mut Map<String, Value>) -> ToolResult<()> {
        for rule in &self.rules {
            match rule {
                Rule::Flatten { field, keys } => flatten(object, field, keys)?,
                Rule::Timestamp { field } => {
                    if let Some(value) = object.get(*field) {
                        if let Some(ts) = to_unix_timestamp(field, value)? {
                            object.insert((*field).to_string(), Value::from(ts));
                        }
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn check(&self, args: &mut Arguments) -> ToolResult<()> {
        for rule in &self.rules {
            match rule {
                Rule::NestedRequired { field, keys } => {
                    let Some(ParamValue::Object(inner)) = args.get(field) else {
                        continue;
                    };
                    for key in keys.iter() {
                        if is_blank(inner.get(*key)) {
                            return Err(ToolError::missing(format!("{field}.{key}")));
                        }
                    }
                }
                Rule::NestedCurrency { field } => {
                    if let Some(ParamValue::Object(inner)) = args.values.get_mut(*field) {
                        if is_blank(inner.get("currency")) {
                            inner.insert("currency".to_string(), Value::from(DEFAULT_CURRENCY));
                        }
                    }
                }
                Rule::RequiredUnless { field, unless } => {
                    let waived = args.get(unless).and_then(ParamValue::as_bool).unwrap_or(false);
                    if !waived && !args.contains(field) {
                        return Err(ToolError::validation(
                            *field,
                            format!("required unless '{unless}' is true"),
                        ));
                    }
                }
                Rule::Identifier { field } => {
                    if let Some(ParamValue::String(id)) = args.get(field) {
                        check_identifier(field, id)?;
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn bind(&self, mut args: Arguments) -> ToolResult<RemoteCall> {
        match self.binding {
            Binding::Fetch { resource, id_field } => Ok(RemoteCall::Fetch {
                resource,
                id: take_id(&mut args, id_field)?,
            }),
            Binding::List { resource } => Ok(RemoteCall::List {
                resource,
                filters: args.into_payload(),
            }),
            Binding::Create { resource } => Ok(RemoteCall::Create {
                resource,
                payload: args.into_payload(),
            }),
            Binding::Act {
                resource,
                id_field,
                action,
            } => {
                let id = take_id(&mut args, id_field)?;
                Ok(RemoteCall::Act {
                    resource,
                    id,
                    action,
                    payload: args.into_payload(),
                })
            }
        }
    }
}

fn take_id(args: &mut Arguments, field: &str) -> ToolResult<String> {
    match args.take(field) {
        Some(ParamValue::String(id)) => {
            check_identifier(field, &id)?;
            Ok(id)
        }
        Some(ParamValue::Integer(id)) => Ok(id.to_string()),
        Some(_) => Err(ToolError::validation(field, "expected string identifier")),
        None => Err(ToolError::missing(field)),
    }
}

/// Provider ids are opaque tokens like `pay_29QQoUBi66xm2f`; anything that
/// could alter a request path is refused.
fn check_identifier(field: &str, id: &str) -> ToolResult<()> {
    let reserved = |c: char| {
        matches!(c, '/' | '\\' | '?' | '#' | '%') || c.is_whitespace() || c.is_control()
    };
    if id == "." || id == ".." || id.chars().any(reserved) {
        return Err(ToolError::validation(field, "invalid identifier"));
    }
    Ok(())
}

fn flatten(object: &mut Map<String, Value>, field: &str, keys: &[&str]) -> ToolResult<()> {
    let nested = match object.remove(field) {
        None | Some(Value::Null) => return Ok(()),
        Some(Value::Object(nested)) => nested,
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(()),
        Some(Value::String(s)) => match serde_json::from_str::<Value>(&s) {
            Ok(Value::Object(nested)) => nested,
            _ => return Err(ToolError::validation(field, "expected object")),
        },
        Some(_) => return Err(ToolError::validation(field, "expected object")),
    };

    for key in keys {
        if let Some(value) = nested.get(*key) {
            object.insert(format!("{field}_{key}"), value.clone());
        }
    }
    Ok(())
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

/// Convert a timestamp argument to unix seconds.
///
/// Returns `Ok(None)` for values the schema pass will treat as absent.
fn to_unix_timestamp(field: &str, value: &Value) -> ToolResult<Option<i64>> {
    let invalid = || {
        ToolError::validation(
            field,
            "expected unix timestamp, RFC 3339 datetime or YYYY-MM-DD date",
        )
    };

    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n.as_i64().map(Some).ok_or_else(invalid),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(None);
            }
            if let Ok(ts) = s.parse::<i64>() {
                return Ok(Some(ts));
            }
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Ok(Some(dt.timestamp()));
            }
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| Some(dt.and_utc().timestamp()))
                .ok_or_else(invalid)
        }
        _ => Err(invalid()),
    }
}
