//! Data types for relite
//!
//! This module defines the declared column types. Values are checked
//! against the declared type at insert/update time; the only allowed
//! coercion is integer literal -> FLOAT column.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Declared SQL data types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// 64-bit signed integer
    Integer,
    /// Double-precision floating point
    Float,
    /// UTF-8 text
    Text,
    /// Boolean
    Boolean,
}

impl DataType {
    /// Try to parse a type name from a keyword, accepting common synonyms
    pub fn from_keyword(s: &str) -> Option<DataType> {
        match s.to_uppercase().as_str() {
            "INTEGER" | "INT" | "BIGINT" => Some(DataType::Integer),
            "FLOAT" | "REAL" | "DOUBLE" => Some(DataType::Float),
            "TEXT" | "VARCHAR" | "STRING" => Some(DataType::Text),
            "BOOLEAN" | "BOOL" => Some(DataType::Boolean),
            _ => None,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Integer => write!(f, "INTEGER"),
            DataType::Float => write!(f, "FLOAT"),
            DataType::Text => write!(f, "TEXT"),
            DataType::Boolean => write!(f, "BOOLEAN"),
        }
    }
}

// Persisted in SQL spelling ("INTEGER", not a variant name) so the
// database file matches what CREATE TABLE accepted.
impl Serialize for DataType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for DataType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        DataType::from_keyword(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown data type '{}'", s)))
    }
}
