//! Dialect-neutral row and value types.
//!
//! This module contains:
//! - `Value` - A unified value type for anything a catalog query returns
//! - `RawRow` - One catalog record, keyed by lower-cased column name

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A unified value type that can represent any value returned by a catalog
/// query, whichever driver produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    /// NULL value
    #[default]
    Null,
    /// Boolean value
    Bool(bool),
    /// Any signed or unsigned integer that fits in 64 bits
    Int(i64),
    /// Floating point (fractional Oracle NUMBER)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Binary data
    Bytes(Vec<u8>),
    /// Array of values
    Array(Vec<Value>),
    /// Driver-specific type without a standard mapping
    Other {
        /// The database-specific type name
        type_name: String,
        /// String representation
        display: String,
    },
}

impl Value {
    /// Check if this value is NULL
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get the type name for log messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytes",
            Value::Array(_) => "array",
            Value::Other { .. } => "other",
        }
    }

    /// Convert this value to a display string
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(v) => v.to_string(),
            Value::Float(v) => v.to_string(),
            Value::Text(s) => s.clone(),
            Value::Bytes(b) => format!("\\x{}", hex::encode(b)),
            Value::Array(arr) => {
                let items: Vec<String> = arr.iter().map(|v| v.to_display_string()).collect();
                format!("[{}]", items.join(", "))
            }
            Value::Other { display, .. } => display.clone(),
        }
    }

    /// Try to extract as a string reference
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Scalar text form of this value.
    ///
    /// NULL maps to `Some("")`. Bytes are accepted when they are valid UTF-8
    /// (MySQL returns some information_schema columns as binary strings).
    /// Arrays have no scalar form and yield `None`.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Value::Null => Some(String::new()),
            Value::Text(s) => Some(s.clone()),
            Value::Bytes(b) => String::from_utf8(b.clone()).ok(),
            Value::Array(_) => None,
            other => Some(other.to_display_string()),
        }
    }

    /// Integer form of this value, accepting integral floats and numeric text.
    pub fn to_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            Value::Text(s) => s.trim().parse().ok(),
            Value::Other { display, .. } => display.trim().parse().ok(),
            _ => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_display_string())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => Value::Null,
        }
    }
}

/// One record returned by a catalog query.
///
/// Keys are always stored lower-cased, whatever casing the driver reports
/// (Oracle upper-cases unquoted aliases, MySQL keeps `COLUMN_NAME` style
/// names), so lookups behave the same for every dialect.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRow {
    fields: BTreeMap<String, Value>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a row from (column name, value) pairs, lower-casing every name.
    pub fn from_columns<K, I>(columns: I) -> Self
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let mut row = Self::new();
        for (name, value) in columns {
            row.insert(name.as_ref(), value);
        }
        row
    }

    /// Insert a field; the key is lower-cased.
    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.fields.insert(key.to_lowercase(), value.into());
    }

    /// Builder-style `insert`
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Case-insensitive lookup
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(&key.to_lowercase())
    }
}
