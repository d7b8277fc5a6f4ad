//! Declarative record schemas with validated, immutable-by-default instances.
//!
//! This crate defines the schema model and the construction engine:
//!
//! - [`TypeDescriptor`]: recursive description of a field's expected shape
//!   (primitive kinds, `Optional`, sequences, mappings, nested schemas).
//! - [`FieldOptions`] / [`FieldSpec`]: per-field coerce function, validator
//!   and mutability flag.
//! - [`Schema`]: a named, ordered set of fields with strict or partial key
//!   matching, declared once through [`SchemaBuilder`].
//! - [`Instance`]: a constructed record with field access, guarded
//!   mutation and nominal equality.
//! - [`Functions`]: named validators and coercers for declarative
//!   definitions.
//!
//! Construction ([`Schema::construct`], [`Schema::from_json`]) checks the
//! input key set, coerces, matches and validates every field, and either
//! returns a complete instance or a [`SchemaError`] naming the offending
//! [`FieldPath`].
//!
//! # Example
//!
//! ```
//! use record_schema_core::*;
//!
//! let car = Schema::builder("Car")
//!     .partial(true)
//!     .field_with(
//!         "year",
//!         TypeDescriptor::int(),
//!         FieldOptions::new().validator(|v| v.as_i64().is_some_and(|y| y > 1980)),
//!     )
//!     .field("license", TypeDescriptor::str())
//!     .build()
//!     .unwrap();
//!
//! let user = Schema::builder("User")
//!     .field("name", TypeDescriptor::str())
//!     .field("cars", TypeDescriptor::list_of(TypeDescriptor::nested(&car)))
//!     .field_with("email", TypeDescriptor::str(), FieldOptions::new().mutable())
//!     .field("salary", TypeDescriptor::optional(TypeDescriptor::float()))
//!     .build()
//!     .unwrap();
//!
//! let mut dwight = user
//!     .from_json(
//!         r#"{"name": "dwight", "salary": null, "email": "d@schrutefarms.com",
//!             "cars": [{"year": 1987, "license": "4018 JXT", "color": "red"}]}"#,
//!     )
//!     .unwrap();
//!
//! dwight.set("email", "dwight@dundermifflin.com").unwrap();
//! assert!(dwight.set("name", "mose").is_err());
//!
//! let err = user
//!     .from_json(r#"{"name": "jim", "salary": 1.0, "email": "j", "cars": [{"year": 1970, "license": "x"}]}"#)
//!     .unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::Validation);
//! assert_eq!(err.path().unwrap().to_string(), "cars[0].year");
//! ```

mod construct;
mod descriptor;
mod error;
mod field;
mod functions;
mod instance;
mod json;
mod path;
mod schema;
mod value;

pub use descriptor::TypeDescriptor;
pub use error::{ErrorKind, Result, SchemaError};
pub use field::{CoerceFn, FieldOptions, FieldSpec, ValidatorFn};
pub use functions::Functions;
pub use instance::Instance;
pub use path::{FieldPath, PathSegment};
pub use schema::{Schema, SchemaBuilder};
pub use value::{Kind, Map, Value};
