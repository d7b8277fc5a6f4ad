//! Value tree consumed and produced by the construction engine.
//!
//! Decoded JSON converts into [`Value`] without loss of integer/float-ness or
//! mapping key order. Coerce functions may produce kinds that JSON cannot
//! express directly ([`Value::DateTime`]), and nested schemas produce
//! [`Value::Record`].

use std::fmt;

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use crate::instance::Instance;

/// Ordered key → value mapping.
pub type Map = IndexMap<String, Value>;

/// Primitive kinds a field can declare.
///
/// Matching is exact: an [`Int`](Kind::Int) value is never accepted where
/// [`Float`](Kind::Float) is declared, and a boolean is never an integer.
///
/// # Examples
///
/// ```
/// use record_schema_core::{Kind, Value};
///
/// assert!(Kind::Int.matches(&Value::Int(1)));
/// assert!(!Kind::Float.matches(&Value::Int(1)));
/// assert!(!Kind::Int.matches(&Value::Bool(true)));
/// assert_eq!(Kind::parse("str"), Some(Kind::Str));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Signed integer.
    Int,
    /// Floating-point number.
    Float,
    /// Text.
    Str,
    /// Boolean.
    Bool,
    /// Any mapping, contents unchecked.
    Dict,
    /// Any sequence, contents unchecked.
    List,
    /// Calendar date and time, produced by coerce functions.
    DateTime,
}

impl Kind {
    /// Returns `true` if `value` is exactly of this kind.
    pub fn matches(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (Kind::Int, Value::Int(_) | Value::UInt(_))
                | (Kind::Float, Value::Float(_))
                | (Kind::Str, Value::Str(_))
                | (Kind::Bool, Value::Bool(_))
                | (Kind::Dict, Value::Map(_))
                | (Kind::List, Value::List(_))
                | (Kind::DateTime, Value::DateTime(_))
        )
    }

    /// Name used in type expressions and error messages.
    pub fn name(self) -> &'static str {
        match self {
            Kind::Int => "int",
            Kind::Float => "float",
            Kind::Str => "str",
            Kind::Bool => "bool",
            Kind::Dict => "dict",
            Kind::List => "list",
            Kind::DateTime => "datetime",
        }
    }

    /// Parses a kind from its [`name`](Kind::name).
    pub fn parse(name: &str) -> Option<Self> {
        let kind = match name {
            "int" => Kind::Int,
            "float" => Kind::Float,
            "str" => Kind::Str,
            "bool" => Kind::Bool,
            "dict" => Kind::Dict,
            "list" => Kind::List,
            "datetime" => Kind::DateTime,
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A decoded or constructed value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// JSON `null`.
    Null,
    /// Boolean.
    Bool(bool),
    /// Integer.
    Int(i64),
    /// Integer above `i64::MAX`.
    UInt(u64),
    /// Floating-point number.
    Float(f64),
    /// Text.
    Str(String),
    /// Date and time (coerce output only).
    DateTime(NaiveDateTime),
    /// Ordered sequence.
    List(Vec<Value>),
    /// Ordered mapping with text keys.
    Map(Map),
    /// Constructed instance of a nested schema.
    Record(Instance),
}

impl Value {
    /// Converts a decoded JSON value.
    ///
    /// Integers above `i64::MAX` become [`Value::UInt`] and stay of the
    /// `int` kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use record_schema_core::Value;
    ///
    /// let value = Value::from_json(&serde_json::json!({"age": 25, "ratio": 0.5}));
    /// let map = value.as_map().unwrap();
    /// assert_eq!(map["age"], Value::Int(25));
    /// assert_eq!(map["ratio"], Value::Float(0.5));
    /// ```
    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Value::UInt(u)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::Str(s.clone()),
            serde_json::Value::Array(items) => {
                Value::List(items.iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => Value::Map(Self::map_from_json(map)),
        }
    }

    /// Converts a decoded JSON object into an ordered [`Map`].
    pub fn map_from_json(map: &serde_json::Map<String, serde_json::Value>) -> Map {
        map.iter()
            .map(|(k, v)| (k.clone(), Value::from_json(v)))
            .collect()
    }

    /// Renders this value as JSON.
    ///
    /// Date-times become ISO-8601 text, records become objects in field
    /// declaration order and non-finite floats become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::UInt(u) => serde_json::Value::from(*u),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Str(s) => serde_json::Value::String(s.clone()),
            Value::DateTime(dt) => {
                serde_json::Value::String(dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string())
            }
            Value::List(items) => serde_json::Value::Array(items.iter().map(Value::to_json).collect()),
            Value::Map(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
            Value::Record(instance) => instance.to_json(),
        }
    }

    /// Short name of this value's kind, as used in type errors.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) | Value::UInt(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::DateTime(_) => "datetime",
            Value::List(_) => "list",
            Value::Map(_) => "dict",
            Value::Record(_) => "record",
        }
    }

    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Int(i) => u64::try_from(*i).ok(),
            Value::UInt(u) => Some(*u),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<&NaiveDateTime> {
        match self {
            Value::DateTime(dt) => Some(dt),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Instance> {
        match self {
            Value::Record(instance) => Some(instance),
            _ => None,
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl From<&serde_json::Value> for Value {
    fn from(json: &serde_json::Value) -> Self {
        Value::from_json(json)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        Value::from_json(&json)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Value::DateTime(dt)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Map(map)
    }
}

impl From<Instance> for Value {
    fn from(instance: Instance) -> Self {
        Value::Record(instance)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_from_json_keeps_int_and_float_apart() {
        assert_eq!(Value::from_json(&json!(1)), Value::Int(1));
        assert_eq!(Value::from_json(&json!(1.0)), Value::Float(1.0));
        assert_eq!(Value::from_json(&json!(true)), Value::Bool(true));
    }

    #[test]
    fn test_from_json_keeps_large_unsigned_as_int() {
        let value = Value::from_json(&json!(u64::MAX));
        assert_eq!(value, Value::UInt(u64::MAX));
        assert!(Kind::Int.matches(&value));
        assert!(!Kind::Float.matches(&value));
        assert_eq!(value.kind_name(), "int");
        assert_eq!(value.as_u64(), Some(u64::MAX));
        assert_eq!(value.as_i64(), None);
        assert_eq!(value.to_json(), json!(u64::MAX));
    }

    #[test]
    fn test_from_json_preserves_key_order() {
        let value = Value::from_json(&json!({"b": 1, "a": 2, "c": 3}));
        let keys: Vec<&str> = value
            .as_map()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_map_equality_ignores_order() {
        let a = Value::from_json(&json!({"x": 1, "y": 2}));
        let b = Value::from_json(&json!({"y": 2, "x": 1}));
        assert_eq!(a, b);
    }

    #[test]
    fn test_kind_matches_exactly() {
        assert!(Kind::Dict.matches(&Value::Map(Map::new())));
        assert!(!Kind::Dict.matches(&Value::List(Vec::new())));
        assert!(Kind::List.matches(&Value::List(vec![Value::Int(1), Value::from("1")])));
        assert!(!Kind::Str.matches(&Value::Null));
        assert!(!Kind::Float.matches(&Value::Int(2)));
        assert!(!Kind::Int.matches(&Value::Float(2.0)));
    }

    #[test]
    fn test_datetime_to_json() {
        let dt = chrono::NaiveDate::from_ymd_opt(2011, 1, 3)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(Value::DateTime(dt).to_json(), json!("2011-01-03T00:00:00"));
    }

    #[test]
    fn test_non_finite_float_renders_null() {
        assert_eq!(Value::Float(f64::NAN).to_json(), serde_json::Value::Null);
    }
}
