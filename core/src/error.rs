//! Error types for schema declaration, construction and mutation.
//!
//! Every failure is fatal to the single call that raised it. Variants that
//! concern a value carry the [`FieldPath`] of the offending value so nested
//! failures can be traced back to their origin.

use thiserror::Error;

use crate::path::FieldPath;

/// Errors raised while declaring schemas or building and mutating instances.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Invalid schema declaration (bad option, unknown function, duplicate
    /// field). Raised when the schema is declared, never during construction.
    #[error("invalid schema definition: {0}")]
    Definition(String),

    /// Input key set does not match the schema's field set.
    #[error("shape mismatch at {path}: {message}")]
    Shape {
        /// Location of the mismatched mapping.
        path: FieldPath,
        /// Description of the missing or unexpected keys.
        message: String,
    },

    /// A value's kind does not match its type descriptor.
    #[error("type mismatch at {path}: expected {expected}, found {found}")]
    Type {
        /// Location of the rejected value.
        path: FieldPath,
        /// Rendered descriptor that was expected.
        expected: String,
        /// Kind of the value that was found.
        found: String,
    },

    /// A field's coerce function failed on the raw value.
    #[error("coercion failed at {path}: {message}")]
    Coercion {
        /// Field whose coercion failed.
        path: FieldPath,
        /// Message returned by the coerce function.
        message: String,
    },

    /// A field's validator rejected an otherwise well-typed value.
    #[error("validation failed at {path}")]
    Validation {
        /// Field whose validator returned `false`.
        path: FieldPath,
    },

    /// Write to an immutable or undeclared field.
    #[error("access denied at {path}: {message}")]
    Access {
        /// Field that was accessed.
        path: FieldPath,
        /// Reason the access was refused.
        message: String,
    },

    /// JSON decoding failure, surfaced unchanged.
    #[error("JSON error: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Fieldless discriminant of [`SchemaError`], handy for matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`SchemaError::Definition`].
    Definition,
    /// See [`SchemaError::Shape`].
    Shape,
    /// See [`SchemaError::Type`].
    Type,
    /// See [`SchemaError::Coercion`].
    Coercion,
    /// See [`SchemaError::Validation`].
    Validation,
    /// See [`SchemaError::Access`].
    Access,
    /// See [`SchemaError::Decode`].
    Decode,
}

impl SchemaError {
    /// Returns the error category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Definition(_) => ErrorKind::Definition,
            Self::Shape { .. } => ErrorKind::Shape,
            Self::Type { .. } => ErrorKind::Type,
            Self::Coercion { .. } => ErrorKind::Coercion,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Access { .. } => ErrorKind::Access,
            Self::Decode(_) => ErrorKind::Decode,
        }
    }

    /// Returns the path of the offending value, when the error has one.
    pub fn path(&self) -> Option<&FieldPath> {
        match self {
            Self::Shape { path, .. }
            | Self::Type { path, .. }
            | Self::Coercion { path, .. }
            | Self::Validation { path }
            | Self::Access { path, .. } => Some(path),
            Self::Definition(_) | Self::Decode(_) => None,
        }
    }

    pub(crate) fn shape(path: &FieldPath, message: impl Into<String>) -> Self {
        Self::Shape {
            path: path.clone(),
            message: message.into(),
        }
    }

    pub(crate) fn type_mismatch(
        path: &FieldPath,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::Type {
            path: path.clone(),
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub(crate) fn access(path: &FieldPath, message: impl Into<String>) -> Self {
        Self::Access {
            path: path.clone(),
            message: message.into(),
        }
    }
}

/// Convenience alias for results with [`SchemaError`].
pub type Result<T> = std::result::Result<T, SchemaError>;
