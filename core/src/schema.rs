//! Schema declaration.
//!
//! A [`Schema`] is declared once through [`SchemaBuilder`] and shared as
//! `Arc<Schema>` afterwards. Identity is nominal: every
//! [`build`](SchemaBuilder::build) mints a fresh identity, so two schemas with
//! identical fields are still different record types.

use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::construct::construct;
use crate::descriptor::TypeDescriptor;
use crate::error::{Result, SchemaError};
use crate::field::{FieldOptions, FieldSpec};
use crate::instance::Instance;
use crate::json;
use crate::path::FieldPath;
use crate::value::Map;

static NEXT_SCHEMA_ID: AtomicU64 = AtomicU64::new(1);

/// A declared record type.
///
/// # Examples
///
/// ```
/// use record_schema_core::{Schema, TypeDescriptor, Value};
///
/// let person = Schema::builder("Person")
///     .field("age", TypeDescriptor::int())
///     .field("name", TypeDescriptor::str())
///     .build()
///     .unwrap();
///
/// let pam = person.from_json(r#"{"age": 25, "name": "Pam"}"#).unwrap();
/// assert_eq!(pam.get("age"), Some(&Value::Int(25)));
/// assert_eq!(pam.get("name"), Some(&Value::from("Pam")));
///
/// assert!(person.from_json(r#"{"age": 25}"#).is_err());
/// assert!(person.from_json(r#"{"age": "25", "name": "Pam"}"#).is_err());
/// ```
pub struct Schema {
    id: u64,
    name: String,
    fields: Vec<FieldSpec>,
    index: HashMap<String, usize>,
    partial: bool,
}

impl Schema {
    /// Starts declaring a schema called `name`.
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder::new(name)
    }

    /// Process-unique identity of this declaration.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` if unknown input keys are ignored instead of rejected.
    pub fn is_partial(&self) -> bool {
        self.partial
    }

    /// Declared fields, in declaration order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Looks up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.position(name).map(|i| &self.fields[i])
    }

    pub(crate) fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Returns `true` if `name` is a declared field.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Constructs an instance from an already-converted mapping.
    ///
    /// # Errors
    ///
    /// Shape, type, coercion or validation errors; see [`SchemaError`].
    pub fn construct(self: &Arc<Self>, input: Map) -> Result<Instance> {
        construct(self, input, &FieldPath::root())
    }

    /// Constructs an instance from a decoded JSON object.
    pub fn construct_json(
        self: &Arc<Self>,
        input: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<Instance> {
        self.construct(crate::value::Value::map_from_json(input))
    }

    /// Constructs an instance from a decoded JSON document.
    ///
    /// # Errors
    ///
    /// A shape error if the document is not an object, otherwise as
    /// [`construct`](Self::construct).
    pub fn from_value(self: &Arc<Self>, document: &serde_json::Value) -> Result<Instance> {
        json::from_value(self, document)
    }

    /// Decodes JSON text and constructs an instance from it.
    ///
    /// # Errors
    ///
    /// [`SchemaError::Decode`] if the text is not valid JSON, otherwise as
    /// [`from_value`](Self::from_value).
    pub fn from_json(self: &Arc<Self>, text: &str) -> Result<Instance> {
        json::from_str(self, text)
    }

    /// Decodes JSON from a reader and constructs an instance from it.
    pub fn from_reader<R: Read>(self: &Arc<Self>, reader: R) -> Result<Instance> {
        json::from_reader(self, reader)
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<String> = self
            .fields
            .iter()
            .map(|field| format!("{}: {}", field.name(), field.descriptor()))
            .collect();
        f.debug_struct("Schema")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("partial", &self.partial)
            .field("fields", &fields)
            .finish()
    }
}

/// Builder for [`Schema`].
///
/// # Examples
///
/// ```
/// use record_schema_core::{FieldOptions, Schema, TypeDescriptor};
///
/// let car = Schema::builder("Car")
///     .partial(true)
///     .field_with(
///         "year",
///         TypeDescriptor::int(),
///         FieldOptions::new().validator(|v| v.as_i64().is_some_and(|y| y > 1980)),
///     )
///     .field("license", TypeDescriptor::str())
///     .build()
///     .unwrap();
///
/// assert!(car.is_partial());
/// assert_eq!(car.fields().len(), 2);
/// ```
#[derive(Debug)]
pub struct SchemaBuilder {
    name: String,
    fields: Vec<FieldSpec>,
    partial: bool,
}

impl SchemaBuilder {
    /// Creates a strict builder with no fields.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            partial: false,
        }
    }

    /// Declares a field with default options.
    pub fn field(self, name: impl Into<String>, descriptor: impl Into<TypeDescriptor>) -> Self {
        self.field_with(name, descriptor, FieldOptions::default())
    }

    /// Declares a field with explicit options.
    pub fn field_with(
        mut self,
        name: impl Into<String>,
        descriptor: impl Into<TypeDescriptor>,
        options: FieldOptions,
    ) -> Self {
        self.fields
            .push(FieldSpec::new(name, descriptor.into(), options));
        self
    }

    /// Declares an already assembled field.
    pub fn with_field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// Selects partial (superset) key matching instead of strict equality.
    pub fn partial(mut self, partial: bool) -> Self {
        self.partial = partial;
        self
    }

    /// Finishes the declaration.
    ///
    /// # Errors
    ///
    /// [`SchemaError::Definition`] for an empty schema name, an empty field
    /// name or a field declared twice.
    pub fn build(self) -> Result<Arc<Schema>> {
        if self.name.trim().is_empty() {
            return Err(SchemaError::Definition(
                "schema name cannot be empty".to_string(),
            ));
        }

        let mut index = HashMap::with_capacity(self.fields.len());
        for (i, field) in self.fields.iter().enumerate() {
            if field.name().trim().is_empty() {
                return Err(SchemaError::Definition(format!(
                    "field name cannot be empty in schema {}",
                    self.name
                )));
            }
            if index.insert(field.name().to_string(), i).is_some() {
                return Err(SchemaError::Definition(format!(
                    "duplicate field '{}' in schema {}",
                    field.name(),
                    self.name
                )));
            }
        }

        Ok(Arc::new(Schema {
            id: NEXT_SCHEMA_ID.fetch_add(1, Ordering::Relaxed),
            name: self.name,
            fields: self.fields,
            index,
            partial: self.partial,
        }))
    }
}
