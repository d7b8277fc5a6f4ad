//! Type descriptors and the recursive matcher.
//!
//! A [`TypeDescriptor`] is the declared shape of one field. Matching walks the
//! descriptor tree and the value tree in lockstep; the descriptor alone
//! decides which check applies at each node, so there is never more than one
//! candidate path through the value.
//!
//! # Examples
//!
//! ```
//! use record_schema_core::{FieldPath, TypeDescriptor, Value};
//!
//! let matrix = TypeDescriptor::optional(TypeDescriptor::list_of(
//!     TypeDescriptor::list_of(TypeDescriptor::optional(TypeDescriptor::int())),
//! ));
//! assert_eq!(matrix.to_string(), "Optional[List[List[Optional[int]]]]");
//!
//! let ok = Value::from_json(&serde_json::json!([[1, null], []]));
//! assert!(matrix.check(ok, &FieldPath::root()).is_ok());
//!
//! let bad = Value::from_json(&serde_json::json!([[1.0]]));
//! assert!(matrix.check(bad, &FieldPath::root()).is_err());
//! ```

use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::construct::construct;
use crate::error::{Result, SchemaError};
use crate::path::FieldPath;
use crate::schema::Schema;
use crate::value::{Kind, Map, Value};

/// Declared shape of a field value.
#[derive(Debug, Clone)]
pub enum TypeDescriptor {
    /// Exactly one primitive kind.
    Primitive(Kind),
    /// `null`, or a value matching the inner descriptor.
    Optional(Box<TypeDescriptor>),
    /// A sequence; every element matches the element descriptor when one is
    /// declared.
    Sequence(Option<Box<TypeDescriptor>>),
    /// A mapping; keys and values match their descriptors when declared.
    Mapping {
        /// Descriptor for keys, matched against the key text.
        key: Option<Box<TypeDescriptor>>,
        /// Descriptor for values.
        value: Option<Box<TypeDescriptor>>,
    },
    /// A mapping constructed into an instance of another schema.
    Nested(Arc<Schema>),
}

impl TypeDescriptor {
    pub fn int() -> Self {
        Self::Primitive(Kind::Int)
    }

    pub fn float() -> Self {
        Self::Primitive(Kind::Float)
    }

    pub fn str() -> Self {
        Self::Primitive(Kind::Str)
    }

    pub fn bool() -> Self {
        Self::Primitive(Kind::Bool)
    }

    /// Any mapping, contents unchecked.
    pub fn dict() -> Self {
        Self::Primitive(Kind::Dict)
    }

    /// Any sequence, contents unchecked.
    pub fn list() -> Self {
        Self::Primitive(Kind::List)
    }

    pub fn datetime() -> Self {
        Self::Primitive(Kind::DateTime)
    }

    /// Wraps `inner` so that `null` is also accepted.
    pub fn optional(inner: TypeDescriptor) -> Self {
        Self::Optional(Box::new(inner))
    }

    /// A sequence whose elements all match `elem`.
    pub fn list_of(elem: TypeDescriptor) -> Self {
        Self::Sequence(Some(Box::new(elem)))
    }

    /// A mapping whose keys match `key` and values match `value`.
    pub fn dict_of(key: TypeDescriptor, value: TypeDescriptor) -> Self {
        Self::Mapping {
            key: Some(Box::new(key)),
            value: Some(Box::new(value)),
        }
    }

    /// A nested record of `schema`.
    pub fn nested(schema: &Arc<Schema>) -> Self {
        Self::Nested(Arc::clone(schema))
    }

    /// Returns `true` if the outermost descriptor is [`Optional`](Self::Optional).
    pub fn is_optional(&self) -> bool {
        matches!(self, Self::Optional(_))
    }

    /// Matches `value` against this descriptor and returns the matched value.
    ///
    /// Mappings matched by [`Nested`](Self::Nested) descriptors come back as
    /// [`Value::Record`]; everything else is returned as given.
    ///
    /// # Errors
    ///
    /// [`SchemaError::Type`] on the first mismatching node (a nested key-set
    /// mismatch included), or whatever other error a nested construction
    /// raised.
    pub fn check(&self, value: Value, path: &FieldPath) -> Result<Value> {
        trace!(%path, descriptor = %self, found = value.kind_name(), "matching value");
        match self {
            Self::Optional(inner) => {
                if value.is_null() {
                    Ok(Value::Null)
                } else {
                    inner.check(value, path)
                }
            }
            Self::Primitive(kind) => {
                if kind.matches(&value) {
                    Ok(value)
                } else {
                    Err(self.mismatch(&value, path))
                }
            }
            Self::Sequence(elem) => match value {
                Value::List(items) => match elem {
                    None => Ok(Value::List(items)),
                    Some(elem) => items
                        .into_iter()
                        .enumerate()
                        .map(|(i, item)| elem.check(item, &path.index(i)))
                        .collect::<Result<Vec<_>>>()
                        .map(Value::List),
                },
                other => Err(self.mismatch(&other, path)),
            },
            Self::Mapping { key, value: elem } => match value {
                Value::Map(map) => {
                    let mut matched = Map::with_capacity(map.len());
                    for (k, v) in map {
                        let entry = path.key(&k);
                        if let Some(key) = key {
                            key.check(Value::Str(k.clone()), &entry)?;
                        }
                        let v = match elem {
                            Some(elem) => elem.check(v, &entry)?,
                            None => v,
                        };
                        matched.insert(k, v);
                    }
                    Ok(Value::Map(matched))
                }
                other => Err(self.mismatch(&other, path)),
            },
            Self::Nested(schema) => match value {
                Value::Map(map) => construct(schema, map, path)
                    .map(Value::Record)
                    .map_err(|err| match err {
                        // a nested key-set mismatch is this node failing to match
                        SchemaError::Shape { path, message } => SchemaError::Type {
                            path,
                            expected: schema.name().to_string(),
                            found: format!("dict with {message}"),
                        },
                        other => other,
                    }),
                Value::Record(instance) if instance.schema().id() == schema.id() => {
                    Ok(Value::Record(instance))
                }
                other => Err(self.mismatch(&other, path)),
            },
        }
    }

    /// Structural check without coercion, validation or construction.
    ///
    /// Used when assigning to a mutable field: nested schemas only accept an
    /// already-built record of the same schema.
    ///
    /// # Errors
    ///
    /// [`SchemaError::Type`] naming the first mismatching node.
    pub fn conforms(&self, value: &Value, path: &FieldPath) -> Result<()> {
        match (self, value) {
            (Self::Optional(_), Value::Null) => Ok(()),
            (Self::Optional(inner), _) => inner.conforms(value, path),
            (Self::Primitive(kind), _) if kind.matches(value) => Ok(()),
            (Self::Sequence(elem), Value::List(items)) => {
                if let Some(elem) = elem {
                    for (i, item) in items.iter().enumerate() {
                        elem.conforms(item, &path.index(i))?;
                    }
                }
                Ok(())
            }
            (Self::Mapping { key, value: elem }, Value::Map(map)) => {
                for (k, v) in map {
                    let entry = path.key(k);
                    if let Some(key) = key {
                        key.conforms(&Value::Str(k.clone()), &entry)?;
                    }
                    if let Some(elem) = elem {
                        elem.conforms(v, &entry)?;
                    }
                }
                Ok(())
            }
            (Self::Nested(schema), Value::Record(instance))
                if instance.schema().id() == schema.id() =>
            {
                Ok(())
            }
            _ => Err(self.mismatch(value, path)),
        }
    }

    fn mismatch(&self, value: &Value, path: &FieldPath) -> SchemaError {
        let found = match value {
            Value::Record(instance) => instance.schema().name().to_string(),
            other => other.kind_name().to_string(),
        };
        SchemaError::type_mismatch(path, self.to_string(), found)
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(kind) => write!(f, "{kind}"),
            Self::Optional(inner) => write!(f, "Optional[{inner}]"),
            Self::Sequence(None) => f.write_str("List"),
            Self::Sequence(Some(elem)) => write!(f, "List[{elem}]"),
            Self::Mapping { key, value } => {
                if key.is_none() && value.is_none() {
                    return f.write_str("Dict");
                }
                f.write_str("Dict[")?;
                match key {
                    Some(key) => write!(f, "{key}")?,
                    None => f.write_str("Any")?,
                }
                f.write_str(", ")?;
                match value {
                    Some(value) => write!(f, "{value}")?,
                    None => f.write_str("Any")?,
                }
                f.write_str("]")
            }
            Self::Nested(schema) => f.write_str(schema.name()),
        }
    }
}

impl From<Kind> for TypeDescriptor {
    fn from(kind: Kind) -> Self {
        Self::Primitive(kind)
    }
}

impl From<&Arc<Schema>> for TypeDescriptor {
    fn from(schema: &Arc<Schema>) -> Self {
        Self::nested(schema)
    }
}
