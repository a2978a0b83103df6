//! Configuration values.
//!
//! A `Value` is the loosely-typed unit carried in every resource attribute.
//! The union is closed: every consumer branches exhaustively on the kind.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A configuration value attached to a resource attribute
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Value {
    /// Text value
    String(String),
    /// Boolean value
    Boolean(bool),
    /// Arbitrary-precision decimal number
    Number(Decimal),
    /// Ordered list of values
    Array(Vec<Value>),
    /// Explicitly absent value
    Undefined,
}

impl Value {
    /// Name of the value's kind, for diagnostics
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Boolean(_) => "boolean",
            Self::Number(_) => "number",
            Self::Array(_) => "array",
            Self::Undefined => "undefined",
        }
    }

    /// Check whether the value is `Undefined`
    #[must_use]
    pub const fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// Borrow the inner string, if this is a `String`
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow the inner number, if this is a `Number`
    #[must_use]
    pub fn as_number(&self) -> Option<Decimal> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Build a string value
    #[must_use]
    pub fn string(s: impl Into<String>) -> Self {
        Self::String(s.into())
    }

    /// Build a number value from an integer
    #[must_use]
    pub fn integer(n: i64) -> Self {
        Self::Number(Decimal::from(n))
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String(s) => write!(f, "{}", s),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Number(n) => write!(f, "{}", n.normalize()),
            Self::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Self::Undefined => write!(f, "undef"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<Decimal> for Value {
    fn from(n: Decimal) -> Self {
        Self::Number(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_value_kind() {
        assert_eq!(Value::string("x").kind(), "string");
        assert_eq!(Value::Boolean(true).kind(), "boolean");
        assert_eq!(Value::integer(1).kind(), "number");
        assert_eq!(Value::Array(vec![]).kind(), "array");
        assert_eq!(Value::Undefined.kind(), "undefined");
    }

    #[test]
    fn test_value_display_boolean() {
        assert_eq!(Value::Boolean(true).to_string(), "true");
        assert_eq!(Value::Boolean(false).to_string(), "false");
    }

    #[test]
    fn test_value_display_number_normalized() {
        let n = Decimal::from_str("12.500").unwrap();
        assert_eq!(Value::Number(n).to_string(), "12.5");

        let i = Decimal::from_str("42.000").unwrap();
        assert_eq!(Value::Number(i).to_string(), "42");
    }

    #[test]
    fn test_value_display_array() {
        let v = Value::Array(vec![Value::string("a"), Value::integer(2)]);
        assert_eq!(v.to_string(), "[a, 2]");
    }

    #[test]
    fn test_value_as_str() {
        assert_eq!(Value::string("x").as_str(), Some("x"));
        assert_eq!(Value::Boolean(true).as_str(), None);
    }

    #[test]
    fn test_value_is_undefined() {
        assert!(Value::Undefined.is_undefined());
        assert!(!Value::string("").is_undefined());
    }
}
