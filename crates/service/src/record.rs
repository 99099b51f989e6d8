//! Configuration records and the key filter used to address them.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

/// Name of the field that identifies a record in the store.
pub const KEY_FIELD: &str = "key";

/// One configuration entry: a JSON object whose `key` field is a string.
/// Every other field is opaque payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ConfigRecord {
    fields: Map<String, Value>,
}

impl ConfigRecord {
    /// Build a record from a JSON object, checking the `key` field.
    pub fn from_map(fields: Map<String, Value>) -> Result<Self, String> {
        match fields.get(KEY_FIELD) {
            Some(Value::String(_)) => Ok(Self { fields }),
            Some(other) => Err(format!("field `key` must be a string, got {}", type_name(other))),
            None => Err("missing string field `key`".to_string()),
        }
    }

    pub fn key(&self) -> &str {
        // from_map guarantees a string key
        self.fields.get(KEY_FIELD).and_then(Value::as_str).unwrap_or_default()
    }

    pub fn filter(&self) -> KeyFilter {
        KeyFilter::new(self.key())
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

impl TryFrom<Value> for ConfigRecord {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(fields) => Self::from_map(fields),
            other => Err(format!("expected an object, got {}", type_name(&other))),
        }
    }
}

/// `{key: value}` filter passed to store operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyFilter {
    pub key: String,
}

impl KeyFilter {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl fmt::Display for KeyFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{key: {:?}}}", self.key)
    }
}

pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
