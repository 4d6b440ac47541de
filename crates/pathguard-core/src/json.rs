//! JSON primitives.
//!
//! Stores hold JSON scalars as leaves. Numbers keep `serde_json`'s
//! representation so integers round-trip exactly.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::fmt;

use crate::error::CoreError;

/// A JSON scalar: null, boolean, number, or string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Primitive {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
}

impl Primitive {
    pub fn is_null(&self) -> bool {
        matches!(self, Primitive::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Primitive::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Primitive::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Primitive::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Primitive::String(s) => Some(s),
            _ => None,
        }
    }

    /// Name of the JSON type, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Primitive::Null => "null",
            Primitive::Bool(_) => "boolean",
            Primitive::Number(_) => "number",
            Primitive::String(_) => "string",
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Primitive::Null => Value::Null,
            Primitive::Bool(b) => Value::Bool(*b),
            Primitive::Number(n) => Value::Number(n.clone()),
            Primitive::String(s) => Value::String(s.clone()),
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Primitive::Null => f.write_str("null"),
            Primitive::Bool(b) => write!(f, "{}", b),
            Primitive::Number(n) => write!(f, "{}", n),
            Primitive::String(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Primitive {
    fn from(b: bool) -> Self {
        Primitive::Bool(b)
    }
}

impl From<i32> for Primitive {
    fn from(n: i32) -> Self {
        Primitive::Number(n.into())
    }
}

impl From<i64> for Primitive {
    fn from(n: i64) -> Self {
        Primitive::Number(n.into())
    }
}

impl From<u64> for Primitive {
    fn from(n: u64) -> Self {
        Primitive::Number(n.into())
    }
}

/// Non-finite floats have no JSON form and become `null`.
impl From<f64> for Primitive {
    fn from(n: f64) -> Self {
        Number::from_f64(n).map_or(Primitive::Null, Primitive::Number)
    }
}

impl From<&str> for Primitive {
    fn from(s: &str) -> Self {
        Primitive::String(s.to_string())
    }
}

impl From<String> for Primitive {
    fn from(s: String) -> Self {
        Primitive::String(s)
    }
}

impl From<Primitive> for Value {
    fn from(p: Primitive) -> Self {
        match p {
            Primitive::Null => Value::Null,
            Primitive::Bool(b) => Value::Bool(b),
            Primitive::Number(n) => Value::Number(n),
            Primitive::String(s) => Value::String(s),
        }
    }
}

impl TryFrom<Value> for Primitive {
    type Error = CoreError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Null => Ok(Primitive::Null),
            Value::Bool(b) => Ok(Primitive::Bool(b)),
            Value::Number(n) => Ok(Primitive::Number(n)),
            Value::String(s) => Ok(Primitive::String(s)),
            other => Err(CoreError::NotPrimitive(other.to_string())),
        }
    }
}

/// Check whether a JSON value is a plain object (not null, not an array).
pub fn is_json_object(value: &Value) -> bool {
    value.is_object()
}
