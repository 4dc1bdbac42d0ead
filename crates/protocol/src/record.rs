//! Record and record type
//!
//! A record is one item exported by the upstream pipeline. The pipeline tags
//! every item with a `type` attribute that names its schema.

use std::borrow::Borrow;
use std::fmt;

use serde_json::{Map, Value};

use crate::error::ProtocolError;
use crate::value::render_value;

/// Name of the attribute carrying the record type
pub const TYPE_FIELD: &str = "type";

/// Record type tag (e.g. "block", "transaction")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordType(String);

impl RecordType {
    /// Create a record type from its name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the type name
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordType {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for RecordType {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl Borrow<str> for RecordType {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for RecordType {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One exported item: a field map tagged with its record type
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    record_type: RecordType,
    fields: Map<String, Value>,
}

impl Record {
    /// Create a record from a type and its fields
    pub fn new(record_type: impl Into<RecordType>, fields: Map<String, Value>) -> Self {
        Self {
            record_type: record_type.into(),
            fields,
        }
    }

    /// Build a record from a decoded JSON object
    ///
    /// The object must carry a string `type` attribute. The attribute stays
    /// in the field map so it can be exported like any other column.
    pub fn from_value(value: Value) -> Result<Self, ProtocolError> {
        Self::from_value_at(value, 0)
    }

    pub(crate) fn from_value_at(value: Value, line: usize) -> Result<Self, ProtocolError> {
        let fields = match value {
            Value::Object(map) => map,
            other => return Err(ProtocolError::not_an_object(line, kind_of(&other))),
        };

        let record_type = match fields.get(TYPE_FIELD) {
            Some(Value::String(name)) if !name.is_empty() => RecordType::new(name.as_str()),
            _ => return Err(ProtocolError::missing_type(line)),
        };

        Ok(Self {
            record_type,
            fields,
        })
    }

    /// Get the record type
    #[inline]
    pub fn record_type(&self) -> &RecordType {
        &self.record_type
    }

    /// Get a field value
    #[inline]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Get all fields
    #[inline]
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Render a field as text; missing fields render like null
    pub fn render_field(&self, field: &str) -> std::borrow::Cow<'_, str> {
        match self.fields.get(field) {
            Some(value) => render_value(value),
            None => std::borrow::Cow::Borrowed(""),
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
