//! Dynamic value model
//!
//! Auxiliary values, construction arguments and rendered instance fields are
//! all carried by [`Value`]. Plain data mirrors JSON; the two error variants
//! hold family instances and wrapped foreign errors by reference.

use core::fmt::{Display, Formatter};

use indexmap::IndexMap;
use serde_json::Number;

use crate::foreign::ForeignError;
use crate::instance::ErrorInstance;

/// Ordered key/value object
pub type Object = IndexMap<String, Value>;

/// Any value an error instance can carry
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Absent value
    #[default]
    Null,

    /// Boolean value
    Bool(bool),

    /// Finite JSON number
    Number(Number),

    /// UTF-8 text
    String(String),

    /// Ordered sequence, flattened by argument parsing and `push`
    List(Vec<Value>),

    /// Plain data object
    Object(Object),

    /// An instance of some error type family
    Error(ErrorInstance),

    /// An error that belongs to no family
    Foreign(ForeignError),
}

/// Lightweight classification of a [`Value`]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    Number,
    String,
    List,
    Object,
    Error,
    Foreign,
}

impl ValueKind {
    /// Stable lowercase name
    pub const fn name(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Number => "number",
            Self::String => "string",
            Self::List => "list",
            Self::Object => "object",
            Self::Error => "error",
            Self::Foreign => "foreign",
        }
    }

    /// Whether values of this kind are error-shaped
    pub const fn is_error(self) -> bool {
        matches!(self, Self::Error | Self::Foreign)
    }
}

impl Display for ValueKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

impl Value {
    /// Create a text value
    pub fn text(v: impl Into<String>) -> Self {
        Self::String(v.into())
    }

    /// Wrap any standard error as a foreign error value
    pub fn foreign<E>(err: &E) -> Self
    where
        E: std::error::Error + 'static,
    {
        Self::Foreign(ForeignError::from_error(err))
    }

    /// Get the kind of this value
    #[inline]
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Null => ValueKind::Null,
            Self::Bool(_) => ValueKind::Bool,
            Self::Number(_) => ValueKind::Number,
            Self::String(_) => ValueKind::String,
            Self::List(_) => ValueKind::List,
            Self::Object(_) => ValueKind::Object,
            Self::Error(_) => ValueKind::Error,
            Self::Foreign(_) => ValueKind::Foreign,
        }
    }

    /// Check if this value is "truthy"
    ///
    /// Falsy values are `Null`, `false`, numeric zero and the empty string.
    /// Everything else is truthy, including empty lists and objects.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
            Self::String(s) => !s.is_empty(),
            Self::List(_) | Self::Object(_) | Self::Error(_) | Self::Foreign(_) => true,
        }
    }

    /// Check if this value is null
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Borrow as a string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow as a boolean
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Borrow as a number
    pub const fn as_number(&self) -> Option<&Number> {
        match self {
            Self::Number(n) => Some(n),
            _ => None,
        }
    }

    /// Borrow as a list
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Borrow as an object
    pub const fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Borrow as a family error instance
    pub const fn as_instance(&self) -> Option<&ErrorInstance> {
        match self {
            Self::Error(instance) => Some(instance),
            _ => None,
        }
    }

    /// Borrow as a foreign error
    pub const fn as_foreign(&self) -> Option<&ForeignError> {
        match self {
            Self::Foreign(err) => Some(err),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a == b,
            (Self::Error(a), Self::Error(b)) => a.same_instance(b),
            (Self::Foreign(a), Self::Foreign(b)) => a == b,
            _ => false,
        }
    }
}

// ==================== Conversions ====================

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

macro_rules! impl_from_integer {
    ($($t:ty),* $(,)?) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Self::Number(Number::from(v))
                }
            }
        )*
    };
}

impl_from_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl From<f64> for Value {
    /// Non-finite floats have no JSON encoding and become `Null`
    fn from(v: f64) -> Self {
        Number::from_f64(v).map_or(Self::Null, Self::Number)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::from(f64::from(v))
    }
}

impl From<Number> for Value {
    fn from(v: Number) -> Self {
        Self::Number(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(map) => {
                Self::Object(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<&serde_json::Value> for Value {
    fn from(v: &serde_json::Value) -> Self {
        Self::from(v.clone())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl From<Object> for Value {
    fn from(v: Object) -> Self {
        Self::Object(v)
    }
}

impl From<ErrorInstance> for Value {
    fn from(v: ErrorInstance) -> Self {
        Self::Error(v)
    }
}

impl From<&ErrorInstance> for Value {
    fn from(v: &ErrorInstance) -> Self {
        Self::Error(v.clone())
    }
}

impl From<ForeignError> for Value {
    fn from(v: ForeignError) -> Self {
        Self::Foreign(v)
    }
}

impl FromIterator<Value> for Value {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self::List(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(Value::Null, false)]
    #[case(Value::from(false), false)]
    #[case(Value::from(0), false)]
    #[case(Value::from(0.0), false)]
    #[case(Value::from(""), false)]
    #[case(Value::from(true), true)]
    #[case(Value::from(-1), true)]
    #[case(Value::from("x"), true)]
    #[case(Value::List(Vec::new()), true)]
    #[case(Value::Object(Object::new()), true)]
    fn test_truthiness(#[case] value: Value, #[case] truthy: bool) {
        assert_eq!(value.is_truthy(), truthy);
    }

    #[test]
    fn test_non_finite_float_is_null() {
        assert!(Value::from(f64::NAN).is_null());
        assert!(Value::from(f64::INFINITY).is_null());
        assert_eq!(Value::from(1.5).kind(), ValueKind::Number);
    }

    #[test]
    fn test_from_json_preserves_structure() {
        let value = Value::from(json!({"a": [1, "two", null], "b": {"c": true}}));
        let obj = value.as_object().unwrap();
        assert_eq!(obj.keys().collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(
            obj["a"],
            Value::List(vec![Value::from(1), Value::from("two"), Value::Null])
        );
        assert_eq!(obj["b"].as_object().unwrap()["c"], Value::from(true));
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(Value::from("s").kind().name(), "string");
        assert_eq!(Value::from(vec![1, 2]).kind(), ValueKind::List);
        assert!(ValueKind::Foreign.is_error());
        assert!(!ValueKind::Object.is_error());
    }
}
