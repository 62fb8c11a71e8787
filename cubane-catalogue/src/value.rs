//! Literal values for column defaults and fixture rows.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// A literal value as declared in the catalogue.
///
/// Used for column defaults and fixture data. Rendering a value as a SQL
/// literal is the driver's job; this type only carries the data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Boolean literal.
    Bool(bool),
    /// Integer literal.
    Int(i64),
    /// Floating-point literal.
    Float(f64),
    /// Calendar date (ISO `YYYY-MM-DD`).
    Date(NaiveDate),
    /// Time of day (ISO `HH:MM:SS`).
    Time(NaiveTime),
    /// Timestamp with time zone.
    Timestamp(DateTime<Utc>),
    /// Text literal. Last variant so untagged deserialization tries the
    /// date/time forms first.
    Text(String),
}

impl Value {
    /// Shorthand for a text value.
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}
