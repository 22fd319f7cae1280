//! Value type for relite
//!
//! This module defines how data values are represented in memory. A
//! value carries its own tag (integer, float, text, boolean); the
//! declared column type is checked when a value enters a table.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::catalog::DataType;
use crate::error::{Error, Result};

/// A value in the database
///
/// Serialized untagged, so persisted rows read as plain JSON scalars.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Boolean value
    Boolean(bool),
    /// Integer value (64-bit)
    Integer(i64),
    /// Float value (64-bit)
    Float(f64),
    /// Text value
    Text(String),
}

// Implement PartialEq manually to support Float keys via bitwise comparison
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Text(a), Value::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Boolean(v) => v.hash(state),
            Value::Integer(v) => v.hash(state),
            Value::Float(v) => v.to_bits().hash(state),
            Value::Text(v) => v.hash(state),
        }
    }
}

impl Value {
    /// The tag of this value, as a [`DataType`]
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Boolean(_) => DataType::Boolean,
            Value::Integer(_) => DataType::Integer,
            Value::Float(_) => DataType::Float,
            Value::Text(_) => DataType::Text,
        }
    }

    /// Check this value against a declared column type, coercing where
    /// allowed (integer -> FLOAT column). Fails with a type error naming
    /// the column otherwise.
    pub fn conform_to(self, column: &str, expected: DataType) -> Result<Value> {
        match (expected, self) {
            (DataType::Float, Value::Integer(i)) => Ok(Value::Float(i as f64)),
            (expected, value) if value.data_type() == expected => Ok(value),
            (expected, value) => Err(Error::TypeMismatch {
                column: column.to_string(),
                expected: expected.to_string(),
                found: value.data_type().to_string(),
            }),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(v) => write!(f, "{}", v),
            Value::Integer(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Text(v) => write!(f, "{}", v),
        }
    }
}
