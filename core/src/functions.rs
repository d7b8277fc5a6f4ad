//! Named validator and coerce functions.
//!
//! Declarative schema definitions cannot carry closures, so they refer to
//! functions by name. [`Functions`] is the lookup table those names resolve
//! against when the definition is declared.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::field::{CoerceFn, ValidatorFn};
use crate::value::Value;

/// Table of named validators and coercers.
///
/// [`Functions::builtin`] ships with:
///
/// | name             | kind      | behavior                                         |
/// |------------------|-----------|--------------------------------------------------|
/// | `parse_int`      | coerce    | text → int (ints pass through)                   |
/// | `parse_float`    | coerce    | text or int → float (floats pass through)        |
/// | `parse_date`     | coerce    | `YYYY-MM-DD` text → datetime at midnight         |
/// | `parse_datetime` | coerce    | RFC 3339 or `YYYY-MM-DDTHH:MM:SS` → datetime     |
/// | `to_string`      | coerce    | int, float or bool → text (text passes through)  |
/// | `positive`       | validator | number > 0                                       |
/// | `non_negative`   | validator | number >= 0                                      |
/// | `non_empty`      | validator | text, list or dict with at least one element     |
///
/// # Examples
///
/// ```
/// use record_schema_core::{Functions, Value};
///
/// let mut functions = Functions::builtin();
/// functions.register_validator("even", |v| v.as_i64().is_some_and(|i| i % 2 == 0));
///
/// let even = functions.validator("even").unwrap();
/// assert!(even(&Value::Int(4)));
///
/// let parse_int = functions.coercer("parse_int").unwrap();
/// assert_eq!(parse_int(&Value::from("25")), Ok(Value::Int(25)));
/// ```
#[derive(Clone, Default)]
pub struct Functions {
    validators: HashMap<String, ValidatorFn>,
    coercers: HashMap<String, CoerceFn>,
}

impl Functions {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table holding the built-in functions.
    pub fn builtin() -> Self {
        let mut functions = Self::new();
        functions.register_coercer("parse_int", parse_int);
        functions.register_coercer("parse_float", parse_float);
        functions.register_coercer("parse_date", parse_date);
        functions.register_coercer("parse_datetime", parse_datetime);
        functions.register_coercer("to_string", to_text);
        functions.register_validator("positive", |v| number(v).is_some_and(|n| n > 0.0));
        functions.register_validator("non_negative", |v| number(v).is_some_and(|n| n >= 0.0));
        functions.register_validator("non_empty", |v| match v {
            Value::Str(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
            Value::Map(map) => !map.is_empty(),
            _ => false,
        });
        functions
    }

    /// Registers (or replaces) a validator.
    pub fn register_validator<F>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.validators.insert(name.into(), Arc::new(f));
        self
    }

    /// Registers (or replaces) a coerce function.
    pub fn register_coercer<F>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(&Value) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.coercers.insert(name.into(), Arc::new(f));
        self
    }

    /// Looks up a validator by name.
    pub fn validator(&self, name: &str) -> Option<ValidatorFn> {
        self.validators.get(name).cloned()
    }

    /// Looks up a coerce function by name.
    pub fn coercer(&self, name: &str) -> Option<CoerceFn> {
        self.coercers.get(name).cloned()
    }
}

impl fmt::Debug for Functions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut validators: Vec<&str> = self.validators.keys().map(String::as_str).collect();
        let mut coercers: Vec<&str> = self.coercers.keys().map(String::as_str).collect();
        validators.sort_unstable();
        coercers.sort_unstable();
        f.debug_struct("Functions")
            .field("validators", &validators)
            .field("coercers", &coercers)
            .finish()
    }
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Int(i) => Some(*i as f64),
        Value::UInt(u) => Some(*u as f64),
        Value::Float(f) => Some(*f),
        _ => None,
    }
}

fn expected_text(value: &Value) -> String {
    format!("expected str, found {}", value.kind_name())
}

fn parse_int(value: &Value) -> Result<Value, String> {
    match value {
        Value::Int(_) | Value::UInt(_) => Ok(value.clone()),
        Value::Str(s) => {
            let text = s.trim();
            text.parse::<i64>()
                .map(Value::Int)
                .or_else(|_| text.parse::<u64>().map(Value::UInt))
                .map_err(|e| format!("invalid integer {s:?}: {e}"))
        }
        other => Err(expected_text(other)),
    }
}

fn parse_float(value: &Value) -> Result<Value, String> {
    match value {
        Value::Float(_) => Ok(value.clone()),
        Value::Int(i) => Ok(Value::Float(*i as f64)),
        Value::UInt(u) => Ok(Value::Float(*u as f64)),
        Value::Str(s) => s
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|e| format!("invalid float {s:?}: {e}")),
        other => Err(expected_text(other)),
    }
}

fn parse_date(value: &Value) -> Result<Value, String> {
    let text = value.as_str().ok_or_else(|| expected_text(value))?;
    let date = NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map_err(|e| format!("invalid date {text:?}: {e}"))?;
    date.and_hms_opt(0, 0, 0)
        .map(Value::DateTime)
        .ok_or_else(|| format!("invalid date {text:?}"))
}

fn parse_datetime(value: &Value) -> Result<Value, String> {
    let text = value.as_str().ok_or_else(|| expected_text(value))?;
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(Value::DateTime(dt.naive_utc()));
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .map(Value::DateTime)
        .map_err(|e| format!("invalid datetime {text:?}: {e}"))
}

fn to_text(value: &Value) -> Result<Value, String> {
    match value {
        Value::Str(_) => Ok(value.clone()),
        Value::Int(i) => Ok(Value::Str(i.to_string())),
        Value::UInt(u) => Ok(Value::Str(u.to_string())),
        Value::Float(f) => Ok(Value::Str(f.to_string())),
        Value::Bool(b) => Ok(Value::Str(b.to_string())),
        other => Err(format!("cannot render {} as text", other.kind_name())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn midnight(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int(&Value::from(" 42 ")), Ok(Value::Int(42)));
        assert_eq!(parse_int(&Value::Int(7)), Ok(Value::Int(7)));
        assert_eq!(
            parse_int(&Value::from("18446744073709551615")),
            Ok(Value::UInt(u64::MAX))
        );
        assert!(parse_int(&Value::from("4.2")).is_err());
        assert!(parse_int(&Value::Null).is_err());
    }

    #[test]
    fn test_parse_float_widens_ints_explicitly() {
        assert_eq!(parse_float(&Value::Int(2)), Ok(Value::Float(2.0)));
        assert_eq!(parse_float(&Value::from("2.5")), Ok(Value::Float(2.5)));
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date(&Value::from("2011-01-03")),
            Ok(Value::DateTime(midnight(2011, 1, 3)))
        );
        assert!(parse_date(&Value::from("January 20, 1974")).is_err());
    }

    #[test]
    fn test_parse_datetime_accepts_offsets() {
        let parsed = parse_datetime(&Value::from("2011-01-03T02:00:00+02:00")).unwrap();
        assert_eq!(parsed, Value::DateTime(midnight(2011, 1, 3)));
        let naive = parse_datetime(&Value::from("2011-01-03T00:00:00")).unwrap();
        assert_eq!(naive, Value::DateTime(midnight(2011, 1, 3)));
    }

    #[test]
    fn test_builtin_validators() {
        let functions = Functions::builtin();
        let positive = functions.validator("positive").unwrap();
        assert!(positive(&Value::Int(1)));
        assert!(!positive(&Value::Int(0)));
        assert!(!positive(&Value::from("1")));

        let non_empty = functions.validator("non_empty").unwrap();
        assert!(non_empty(&Value::from("a")));
        assert!(!non_empty(&Value::List(Vec::new())));
    }

    #[test]
    fn test_unknown_names_resolve_to_none() {
        let functions = Functions::builtin();
        assert!(functions.validator("parse_int").is_none());
        assert!(functions.coercer("positive").is_none());
    }
}
