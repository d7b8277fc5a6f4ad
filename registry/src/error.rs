//! Error types for registry operations.
//!
//! Provides a unified error type covering all failure modes: I/O,
//! serialization, definition parsing, name resolution and the construction
//! errors surfaced by the core engine.

use std::path::PathBuf;

use record_schema_core::SchemaError;
use thiserror::Error;

/// Errors that can occur while loading definitions or using the registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Declaration or construction failure from the core engine.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// A field of a definition could not be declared.
    #[error("invalid field {schema}.{field}: {source}")]
    InvalidField {
        /// Schema being declared.
        schema: String,
        /// Offending field.
        field: String,
        /// Underlying declaration error.
        #[source]
        source: SchemaError,
    },

    /// A type expression failed to parse.
    #[error("invalid type expression {expr:?} at offset {offset}: {message}")]
    InvalidTypeExpr {
        /// The full expression.
        expr: String,
        /// Byte offset of the problem.
        offset: usize,
        /// What went wrong.
        message: String,
    },

    /// A schema name is neither registered nor defined alongside.
    #[error("unknown schema: {0}")]
    UnknownSchema(String),

    /// A schema name was registered twice.
    #[error("duplicate schema: {0}")]
    DuplicateSchema(String),

    /// Definitions reference each other in a cycle.
    #[error("schema reference cycle: {0}")]
    ReferenceCycle(String),

    /// A definition file has an extension other than json, yml or yaml.
    #[error("unsupported definition format: {}", .0.display())]
    UnsupportedFormat(PathBuf),
}

/// Convenience alias for results with [`RegistryError`].
pub type Result<T> = std::result::Result<T, RegistryError>;
