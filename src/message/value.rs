//! Command Payload Values
//!
//! [`Value`] is the currency between argument parsers, handlers and the host:
//! a parser turns raw tokens into a `Value`, and a handler returns one as the
//! result of a dispatch.
//!
//! ## Rendering
//!
//! `Display` renders a value the way it would be shown in chat:
//! - `Null` renders as the empty string
//! - `Text` renders verbatim
//! - `Integer` and `Boolean` use their usual textual form
//! - `List` renders its elements joined by `", "`

use std::fmt;

/// A dynamically typed command payload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Value {
    /// No value. Handlers return this when there is nothing to say.
    #[default]
    Null,

    /// Free-form text.
    Text(String),

    /// 64-bit signed integer.
    Integer(i64),

    /// A yes/no flag.
    Boolean(bool),

    /// An ordered list of values, possibly nested.
    List(Vec<Value>),
}

impl Value {
    /// Creates a new text value.
    ///
    /// # Example
    /// ```
    /// use chatcmd::message::Value;
    /// let pong = Value::text("pong");
    /// ```
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    /// Creates a new integer value.
    pub fn integer(n: i64) -> Self {
        Value::Integer(n)
    }

    /// Creates a null value.
    pub fn null() -> Self {
        Value::Null
    }

    /// Creates a list value.
    pub fn list(values: Vec<Value>) -> Self {
        Value::List(values)
    }

    /// Returns true if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(values) => Some(values),
            _ => None,
        }
    }

    /// Consumes self and returns the inner list if this is a List variant.
    pub fn into_list(self) -> Option<Vec<Value>> {
        match self {
            Value::List(values) => Some(values),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Text(s) => f.write_str(s),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::List(values) => {
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                Ok(())
            }
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<Vec<String>> for Value {
    fn from(tokens: Vec<String>) -> Self {
        Value::List(tokens.into_iter().map(Value::Text).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Value::null().to_string(), "");
        assert_eq!(Value::text("hello").to_string(), "hello");
        assert_eq!(Value::integer(-42).to_string(), "-42");
        assert_eq!(Value::Boolean(true).to_string(), "true");
    }

    #[test]
    fn test_display_nested_list() {
        let value = Value::list(vec![
            Value::integer(1),
            Value::list(vec![Value::text("a"), Value::text("b")]),
        ]);
        assert_eq!(value.to_string(), "1, a, b");
    }

    #[test]
    fn test_accessors() {
        assert_eq!(Value::text("x").as_str(), Some("x"));
        assert_eq!(Value::integer(3).as_integer(), Some(3));
        assert_eq!(Value::text("x").as_integer(), None);
        assert!(Value::default().is_null());
        assert_eq!(
            Value::from(vec!["a".to_string()]).into_list(),
            Some(vec![Value::text("a")])
        );
    }
}
