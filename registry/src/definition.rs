//! Declarative schema definitions.
//!
//! A definition document lists schemas with their fields. A field is either a
//! bare type expression or a mapping with a `type` key plus field options.
//!
//! # Example YAML
//!
//! ```yaml
//! schemas:
//!   - name: Car
//!     partial: true
//!     fields:
//!       year: { type: int, validator: positive }
//!       license: str
//!   - name: User
//!     fields:
//!       first_name: str
//!       car: Car
//!       email: { type: str, immutable: false }
//!       birth_date: { type: datetime, coerce: parse_date }
//!       salary: Optional[float]
//! ```

use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use record_schema_core::{FieldOptions, Functions, Schema};
use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};
use crate::type_expr::TypeExpr;

/// A file's worth of schema definitions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefinitionDocument {
    /// Schemas in declaration order.
    #[serde(default)]
    pub schemas: Vec<SchemaDefinition>,
}

impl DefinitionDocument {
    /// Parses a YAML document.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Parses a JSON document.
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Loads a document, choosing the format from the file extension.
    ///
    /// # Errors
    ///
    /// [`RegistryError::UnsupportedFormat`] for extensions other than
    /// `json`, `yml` and `yaml`, otherwise I/O or parse errors.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = DefinitionFormat::from_path(path)
            .ok_or_else(|| RegistryError::UnsupportedFormat(path.to_path_buf()))?;
        let text = std::fs::read_to_string(path)?;
        match format {
            DefinitionFormat::Json => Self::from_json_str(&text),
            DefinitionFormat::Yaml => Self::from_yaml_str(&text),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DefinitionFormat {
    Json,
    Yaml,
}

impl DefinitionFormat {
    pub(crate) fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Some(Self::Json),
            Some("yml" | "yaml") => Some(Self::Yaml),
            _ => None,
        }
    }
}

/// One declared schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaDefinition {
    /// Schema name, unique within a registry.
    pub name: String,
    /// Ignore unknown input keys instead of rejecting them.
    #[serde(default)]
    pub partial: bool,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Fields in declaration order.
    pub fields: IndexMap<String, FieldDefinition>,
}

/// One declared field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldDefinition {
    /// Bare type expression, default options.
    Type(String),
    /// Type expression plus options (`validator`, `coerce`, `immutable`).
    Detailed {
        /// Type expression.
        #[serde(rename = "type")]
        type_expr: String,
        /// Remaining keys, checked when the schema is built.
        #[serde(flatten)]
        options: serde_json::Map<String, serde_json::Value>,
    },
}

impl FieldDefinition {
    /// The field's type expression text.
    pub fn type_expr(&self) -> &str {
        match self {
            Self::Type(expr) => expr,
            Self::Detailed { type_expr, .. } => type_expr,
        }
    }

    fn options(&self, functions: &Functions) -> record_schema_core::Result<FieldOptions> {
        match self {
            Self::Type(_) => Ok(FieldOptions::default()),
            Self::Detailed { options, .. } => {
                FieldOptions::from_json(&serde_json::Value::Object(options.clone()), functions)
            }
        }
    }
}

impl SchemaDefinition {
    /// Names of the schemas this definition's fields refer to.
    ///
    /// # Errors
    ///
    /// [`RegistryError::InvalidTypeExpr`] if a field type does not parse.
    pub fn references(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for field in self.fields.values() {
            let expr = TypeExpr::parse(field.type_expr())?;
            for name in expr.references() {
                if !names.iter().any(|n| n == name) {
                    names.push(name.to_string());
                }
            }
        }
        Ok(names)
    }

    /// Declares the schema, resolving named types through `lookup` and
    /// function names through `functions`.
    ///
    /// # Errors
    ///
    /// [`RegistryError::InvalidField`] for bad field options,
    /// [`RegistryError::InvalidTypeExpr`] or [`RegistryError::UnknownSchema`]
    /// for bad field types, and [`RegistryError::Schema`] if the core
    /// builder rejects the declaration.
    pub fn build<F>(&self, functions: &Functions, lookup: &F) -> Result<Arc<Schema>>
    where
        F: Fn(&str) -> Option<Arc<Schema>>,
    {
        let mut builder = Schema::builder(&self.name).partial(self.partial);
        for (name, field) in &self.fields {
            let descriptor = TypeExpr::parse(field.type_expr())?.resolve(lookup)?;
            let options = field
                .options(functions)
                .map_err(|source| RegistryError::InvalidField {
                    schema: self.name.clone(),
                    field: name.clone(),
                    source,
                })?;
            builder = builder.field_with(name, descriptor, options);
        }
        Ok(builder.build()?)
    }
}
