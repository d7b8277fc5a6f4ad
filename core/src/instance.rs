//! Constructed records.
//!
//! An [`Instance`] binds every declared field of its schema to a validated
//! value. Fields are read by name; only fields declared mutable can be
//! reassigned, and a reassignment must still conform to the field's type
//! descriptor.
//!
//! `set` takes `&mut self`. Sharing one instance across threads and mutating
//! it requires the caller's own synchronization (for example a `Mutex`).

use std::fmt;
use std::sync::Arc;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::error::{Result, SchemaError};
use crate::path::FieldPath;
use crate::schema::Schema;
use crate::value::Value;

/// A validated record of some [`Schema`].
///
/// Equality requires the same schema declaration and equal field values;
/// instances of two separately declared schemas are never equal.
///
/// # Examples
///
/// ```
/// use record_schema_core::{ErrorKind, FieldOptions, Schema, TypeDescriptor, Value};
///
/// let schema = Schema::builder("Simple")
///     .field_with("attribute", TypeDescriptor::float(), FieldOptions::new().mutable())
///     .field("label", TypeDescriptor::str())
///     .build()
///     .unwrap();
///
/// let mut dto = schema.from_json(r#"{"attribute": 1.0, "label": "a"}"#).unwrap();
///
/// dto.set("attribute", 2.0).unwrap();
/// assert_eq!(dto.get("attribute"), Some(&Value::Float(2.0)));
///
/// // wrong kind: rejected, prior value kept
/// assert_eq!(dto.set("attribute", 3).unwrap_err().kind(), ErrorKind::Type);
/// assert_eq!(dto.get("attribute"), Some(&Value::Float(2.0)));
///
/// // immutable field
/// assert_eq!(dto.set("label", "b").unwrap_err().kind(), ErrorKind::Access);
/// ```
#[derive(Clone)]
pub struct Instance {
    schema: Arc<Schema>,
    values: Vec<Value>,
}

impl Instance {
    pub(crate) fn new(schema: Arc<Schema>, values: Vec<Value>) -> Self {
        debug_assert_eq!(schema.fields().len(), values.len());
        Self { schema, values }
    }

    /// The schema this instance was constructed from.
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Reads a field, or `None` if the schema declares no such field.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.schema.position(name).map(|i| &self.values[i])
    }

    /// Reads a field.
    ///
    /// # Errors
    ///
    /// [`SchemaError::Access`] if the schema declares no such field.
    pub fn field(&self, name: &str) -> Result<&Value> {
        self.get(name).ok_or_else(|| {
            SchemaError::access(
                &FieldPath::root().field(name),
                format!("schema {} has no field '{name}'", self.schema.name()),
            )
        })
    }

    /// Returns `true` if `name` is declared and mutable.
    pub fn is_mutable(&self, name: &str) -> bool {
        self.schema
            .field(name)
            .is_some_and(|field| !field.is_immutable())
    }

    /// Reassigns a mutable field.
    ///
    /// The new value is checked structurally against the field's descriptor;
    /// coerce and validator functions are not run.
    ///
    /// # Errors
    ///
    /// [`SchemaError::Access`] for an unknown or immutable field,
    /// [`SchemaError::Type`] if the value does not conform. The stored value
    /// is unchanged on error.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let path = FieldPath::root().field(name);
        let index = self.schema.position(name).ok_or_else(|| {
            SchemaError::access(
                &path,
                format!("schema {} has no field '{name}'", self.schema.name()),
            )
        })?;

        let field = &self.schema.fields()[index];
        if field.is_immutable() {
            return Err(SchemaError::access(&path, "field is immutable"));
        }

        let value = value.into();
        field.descriptor().conforms(&value, &path)?;
        self.values[index] = value;
        Ok(())
    }

    /// Iterates `(field name, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.schema
            .fields()
            .iter()
            .map(|field| field.name())
            .zip(self.values.iter())
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` for a schema with no fields.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Renders the instance as a JSON object in declaration order.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.iter()
                .map(|(name, value)| (name.to_string(), value.to_json()))
                .collect(),
        )
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        self.schema.id() == other.schema.id() && self.values == other.values
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct(self.schema.name());
        for (name, value) in self.iter() {
            out.field(name, value);
        }
        out.finish()
    }
}

impl Serialize for Instance {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::descriptor::TypeDescriptor;
    use crate::error::ErrorKind;
    use crate::field::FieldOptions;

    fn simple() -> Arc<Schema> {
        Schema::builder("Simple")
            .field("attribute1", TypeDescriptor::float())
            .field("attribute2", TypeDescriptor::int())
            .build()
            .unwrap()
    }

    #[test]
    fn test_equal_instances_of_same_schema() {
        let schema = simple();
        let doc = json!({"attribute1": 1.0, "attribute2": 2});
        let a = schema.from_value(&doc).unwrap();
        let b = schema.from_value(&doc).unwrap();
        assert_eq!(a, b);

        let c = schema
            .from_value(&json!({"attribute1": 1.1, "attribute2": 2}))
            .unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_different_schemas_never_equal() {
        let doc = json!({"attribute1": 1.0, "attribute2": 2});
        let a = simple().from_value(&doc).unwrap();
        let b = simple().from_value(&doc).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_unknown_field_access() {
        let dto = simple()
            .from_value(&json!({"attribute1": 1.0, "attribute2": 2}))
            .unwrap();
        assert!(dto.get("missing").is_none());
        assert_eq!(dto.field("missing").unwrap_err().kind(), ErrorKind::Access);
        let mut dto = dto;
        assert_eq!(dto.set("missing", 1).unwrap_err().kind(), ErrorKind::Access);
    }

    #[test]
    fn test_immutable_by_default() {
        let mut dto = simple()
            .from_value(&json!({"attribute1": 1.0, "attribute2": 2}))
            .unwrap();
        assert!(!dto.is_mutable("attribute2"));
        let err = dto.set("attribute2", 3).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Access);
        assert_eq!(dto.get("attribute2"), Some(&Value::Int(2)));
    }

    #[test]
    fn test_mutable_nested_field_requires_record_of_same_schema() {
        let address = Schema::builder("Address")
            .field("city", TypeDescriptor::str())
            .build()
            .unwrap();
        let user = Schema::builder("User")
            .field_with("address", &address, FieldOptions::new().mutable())
            .build()
            .unwrap();
        let mut dto = user
            .from_value(&json!({"address": {"city": "scranton"}}))
            .unwrap();

        let stamford = address.from_value(&json!({"city": "stamford"})).unwrap();
        dto.set("address", stamford.clone()).unwrap();
        assert_eq!(dto.get("address"), Some(&Value::Record(stamford)));

        let raw = Value::from_json(&json!({"city": "nashua"}));
        assert_eq!(dto.set("address", raw).unwrap_err().kind(), ErrorKind::Type);
    }

    #[test]
    fn test_to_json_and_serialize_agree() {
        let dto = simple()
            .from_value(&json!({"attribute2": 2, "attribute1": 1.5}))
            .unwrap();
        let expected = json!({"attribute1": 1.5, "attribute2": 2});
        assert_eq!(dto.to_json(), expected);
        assert_eq!(serde_json::to_value(&dto).unwrap(), expected);
        assert_eq!(
            serde_json::to_string(&dto).unwrap(),
            r#"{"attribute1":1.5,"attribute2":2}"#
        );
    }

    #[test]
    fn test_debug_uses_schema_name() {
        let dto = simple()
            .from_value(&json!({"attribute1": 1.0, "attribute2": 2}))
            .unwrap();
        let rendered = format!("{dto:?}");
        assert!(rendered.starts_with("Simple {"));
        assert!(rendered.contains("attribute2: Int(2)"));
    }
}
