//! Named schema registry and declarative record definitions.
//!
//! This crate layers name-based lookup on top of `record-schema-core`:
//! schemas are written as YAML or JSON definition documents, field types are
//! spelled as type expressions (`Optional[List[Car]]`), and validators or
//! coerce functions are referred to by name through a
//! [`Functions`](record_schema_core::Functions) table.
//!
//! # Quick start
//!
//! ```no_run
//! use record_schema_registry::{RegistryConfig, SchemaRegistry};
//! use record_schema_core::Functions;
//!
//! // Load definitions from a directory
//! let registry = SchemaRegistry::from_dir("schemas/").unwrap();
//! let user = registry
//!     .from_json("User", r#"{"first_name": "Dwight", "car": {"year": 1987, "license": "4018 JXT"}}"#)
//!     .unwrap();
//!
//! // Or from a configuration file naming several sources
//! let config = RegistryConfig::load("records.yml").unwrap();
//! let registry = SchemaRegistry::from_config(&config, Functions::builtin()).unwrap();
//! ```

mod config;
mod definition;
mod error;
mod loader;
mod type_expr;

pub use config::RegistryConfig;
pub use definition::{DefinitionDocument, FieldDefinition, SchemaDefinition};
pub use error::{RegistryError, Result};
pub use loader::{DefinitionSource, RegistryBuilder, SchemaRegistry};
pub use type_expr::TypeExpr;
