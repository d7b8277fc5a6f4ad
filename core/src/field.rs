//! Field specifications and their options.
//!
//! A field couples a [`TypeDescriptor`] with [`FieldOptions`]: an optional
//! coerce function (applied to the raw value before matching), an optional
//! validator (applied to the matched value) and a mutability flag.

use std::fmt;
use std::sync::Arc;

use crate::descriptor::TypeDescriptor;
use crate::error::{Result, SchemaError};
use crate::functions::Functions;
use crate::path::FieldPath;
use crate::value::Value;

/// Predicate over a field's final value.
pub type ValidatorFn = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Transform from a raw decoded value into the value that gets matched and
/// stored. An `Err` message becomes a [`SchemaError::Coercion`].
pub type CoerceFn = Arc<dyn Fn(&Value) -> std::result::Result<Value, String> + Send + Sync>;

const OPTION_VALIDATOR: &str = "validator";
const OPTION_COERCE: &str = "coerce";
const OPTION_IMMUTABLE: &str = "immutable";

/// Per-field configuration.
///
/// Fields are immutable unless [`mutable`](FieldOptions::mutable) is called.
///
/// # Examples
///
/// ```
/// use record_schema_core::{FieldOptions, Value};
///
/// let options = FieldOptions::new()
///     .validator(|v| v.as_i64().is_some_and(|year| year > 1980))
///     .mutable();
/// assert!(!options.is_immutable());
/// ```
#[derive(Clone)]
pub struct FieldOptions {
    validator: Option<ValidatorFn>,
    coerce: Option<CoerceFn>,
    immutable: bool,
}

impl Default for FieldOptions {
    fn default() -> Self {
        Self {
            validator: None,
            coerce: None,
            immutable: true,
        }
    }
}

impl FieldOptions {
    /// Default options: no validator, no coerce, immutable.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the validator.
    pub fn validator<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(f));
        self
    }

    /// Sets the coerce function.
    pub fn coerce<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> std::result::Result<Value, String> + Send + Sync + 'static,
    {
        self.coerce = Some(Arc::new(f));
        self
    }

    /// Sets an already shared validator.
    pub fn validator_fn(mut self, f: ValidatorFn) -> Self {
        self.validator = Some(f);
        self
    }

    /// Sets an already shared coerce function.
    pub fn coerce_fn(mut self, f: CoerceFn) -> Self {
        self.coerce = Some(f);
        self
    }

    /// Allows the field to be reassigned after construction.
    pub fn mutable(self) -> Self {
        self.immutable(false)
    }

    /// Sets the immutability flag explicitly.
    pub fn immutable(mut self, immutable: bool) -> Self {
        self.immutable = immutable;
        self
    }

    /// Returns the immutability flag.
    pub fn is_immutable(&self) -> bool {
        self.immutable
    }

    /// Parses declarative options.
    ///
    /// Only `validator`, `coerce` and `immutable` are recognized.
    /// `validator` and `coerce` must name functions registered in
    /// `functions`; `immutable` must be a boolean.
    ///
    /// # Errors
    ///
    /// [`SchemaError::Definition`] for a non-mapping, an unrecognized key, an
    /// unknown function name or a value of the wrong type.
    ///
    /// # Examples
    ///
    /// ```
    /// use record_schema_core::{ErrorKind, FieldOptions, Functions};
    ///
    /// let functions = Functions::builtin();
    /// let options = FieldOptions::from_json(
    ///     &serde_json::json!({"coerce": "parse_int", "immutable": false}),
    ///     &functions,
    /// )
    /// .unwrap();
    /// assert!(!options.is_immutable());
    ///
    /// let err = FieldOptions::from_json(&serde_json::json!({"validator": 1}), &functions)
    ///     .unwrap_err();
    /// assert_eq!(err.kind(), ErrorKind::Definition);
    /// ```
    pub fn from_json(options: &serde_json::Value, functions: &Functions) -> Result<Self> {
        let map = options.as_object().ok_or_else(|| {
            SchemaError::Definition(format!("field options must be a mapping, got {options}"))
        })?;

        let mut parsed = Self::default();
        for (key, value) in map {
            match key.as_str() {
                OPTION_VALIDATOR => {
                    let f = value
                        .as_str()
                        .and_then(|name| functions.validator(name))
                        .ok_or_else(|| {
                            SchemaError::Definition(format!(
                                "validator must name a registered single-argument predicate, got {value}"
                            ))
                        })?;
                    parsed.validator = Some(f);
                }
                OPTION_COERCE => {
                    let f = value
                        .as_str()
                        .and_then(|name| functions.coercer(name))
                        .ok_or_else(|| {
                            SchemaError::Definition(format!(
                                "coerce must name a registered single-argument function, got {value}"
                            ))
                        })?;
                    parsed.coerce = Some(f);
                }
                OPTION_IMMUTABLE => {
                    parsed.immutable = value.as_bool().ok_or_else(|| {
                        SchemaError::Definition(format!(
                            "immutable must be a boolean, got {value}"
                        ))
                    })?;
                }
                other => {
                    return Err(SchemaError::Definition(format!(
                        "unrecognized field option '{other}'"
                    )));
                }
            }
        }
        Ok(parsed)
    }
}

impl fmt::Debug for FieldOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldOptions")
            .field("validator", &self.validator.as_ref().map(|_| "<fn>"))
            .field("coerce", &self.coerce.as_ref().map(|_| "<fn>"))
            .field("immutable", &self.immutable)
            .finish()
    }
}

/// One declared field of a schema.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    name: String,
    descriptor: TypeDescriptor,
    options: FieldOptions,
}

impl FieldSpec {
    /// Creates a field spec.
    pub fn new(name: impl Into<String>, descriptor: TypeDescriptor, options: FieldOptions) -> Self {
        Self {
            name: name.into(),
            descriptor,
            options,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    pub fn is_immutable(&self) -> bool {
        self.options.immutable
    }

    pub fn has_validator(&self) -> bool {
        self.options.validator.is_some()
    }

    pub fn has_coerce(&self) -> bool {
        self.options.coerce.is_some()
    }

    /// Runs coerce, match and validator against a raw value.
    pub(crate) fn resolve(&self, raw: Value, path: &FieldPath) -> Result<Value> {
        let raw = match &self.options.coerce {
            Some(coerce) => coerce(&raw).map_err(|message| SchemaError::Coercion {
                path: path.clone(),
                message,
            })?,
            None => raw,
        };

        let value = self.descriptor.check(raw, path)?;

        if let Some(validator) = &self.options.validator {
            if !validator(&value) {
                return Err(SchemaError::Validation { path: path.clone() });
            }
        }

        Ok(value)
    }
}
