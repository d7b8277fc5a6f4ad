//! Schema registry with declarative loading.
//!
//! Provides [`SchemaRegistry`] for name-based schema lookup and construction,
//! and [`RegistryBuilder`] for assembling a registry from definition files,
//! directories and programmatically declared schemas.
//!
//! # Loading patterns
//!
//! ```no_run
//! use record_schema_registry::SchemaRegistry;
//!
//! // Load every *.yml / *.yaml / *.json definition file in a directory
//! let registry = SchemaRegistry::from_dir("schemas/").unwrap();
//! assert!(registry.get("User").is_some());
//!
//! // Combine several sources
//! let registry = SchemaRegistry::builder()
//!     .from_dir("schemas/common/")
//!     .from_file("schemas/users.yml")
//!     .build()
//!     .unwrap();
//! ```
//!
//! Unlike a fallback chain, every source contributes: definitions from all
//! sources are resolved together, so a schema in one file may refer to a
//! schema declared in another.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use record_schema_core::{Functions, Instance, Map, Schema};
use tracing::{debug, info, warn};

use crate::config::RegistryConfig;
use crate::definition::{DefinitionDocument, DefinitionFormat, SchemaDefinition};
use crate::error::{RegistryError, Result};

/// Describes where a registry's definitions came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefinitionSource {
    /// A single definition file.
    File(PathBuf),
    /// A directory of definition files.
    Directory(PathBuf),
    /// YAML or JSON text supplied directly.
    Inline,
    /// A schema declared in code and registered as-is.
    Programmatic(String),
}

/// Named collection of schemas.
///
/// Schemas are immutable once registered and shared as `Arc<Schema>`, so a
/// registry (or clones of its schemas) can be used from any number of
/// threads.
///
/// # Examples
///
/// ```
/// use record_schema_registry::SchemaRegistry;
///
/// let mut registry = SchemaRegistry::new();
/// registry
///     .define_yaml(
///         r#"
/// schemas:
///   - name: Person
///     fields:
///       age: { type: int, validator: non_negative }
///       name: str
/// "#,
///     )
///     .unwrap();
///
/// let pam = registry.from_json("Person", r#"{"age": 25, "name": "Pam"}"#).unwrap();
/// assert_eq!(pam.get("age").and_then(|v| v.as_i64()), Some(25));
/// ```
#[derive(Debug)]
pub struct SchemaRegistry {
    schemas: HashMap<String, Arc<Schema>>,
    functions: Functions,
    sources: Vec<DefinitionSource>,
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaRegistry {
    /// Creates an empty registry using the built-in functions.
    pub fn new() -> Self {
        Self::with_functions(Functions::builtin())
    }

    /// Creates an empty registry resolving function names through `functions`.
    pub fn with_functions(functions: Functions) -> Self {
        Self {
            schemas: HashMap::new(),
            functions,
            sources: Vec::new(),
        }
    }

    /// Returns a new [`RegistryBuilder`].
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Loads definitions from one file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::builder().from_file(path.as_ref()).build()
    }

    /// Loads definitions from every definition file in a directory.
    pub fn from_dir(path: impl AsRef<Path>) -> Result<Self> {
        Self::builder().from_dir(path.as_ref()).build()
    }

    /// Loads the definition files and exclusions named by `config`.
    ///
    /// Each configured path is loaded as a directory if it is one, otherwise
    /// as a file.
    pub fn from_config(config: &RegistryConfig, functions: Functions) -> Result<Self> {
        let mut builder = Self::builder().functions(functions);
        for path in &config.definitions {
            builder = if path.is_dir() {
                builder.from_dir(path)
            } else {
                builder.from_file(path)
            };
        }
        for name in &config.exclude {
            builder = builder.exclude(name);
        }
        builder.build()
    }

    /// Registers a programmatically declared schema under its own name.
    ///
    /// # Errors
    ///
    /// [`RegistryError::DuplicateSchema`] if the name is taken.
    pub fn register(&mut self, schema: Arc<Schema>) -> Result<()> {
        let name = schema.name().to_string();
        if self.schemas.contains_key(&name) {
            return Err(RegistryError::DuplicateSchema(name));
        }
        debug!(schema = %name, "registered schema");
        self.sources.push(DefinitionSource::Programmatic(name.clone()));
        self.schemas.insert(name, schema);
        Ok(())
    }

    /// Declares and registers a batch of definitions.
    ///
    /// Definitions may refer to each other in any order and to schemas
    /// already in the registry. The batch is all-or-nothing: on error
    /// nothing from it is registered.
    ///
    /// # Errors
    ///
    /// [`RegistryError::DuplicateSchema`], [`RegistryError::UnknownSchema`],
    /// [`RegistryError::ReferenceCycle`], or any error from
    /// [`SchemaDefinition::build`].
    pub fn define(
        &mut self,
        definitions: impl IntoIterator<Item = SchemaDefinition>,
    ) -> Result<Vec<Arc<Schema>>> {
        let mut pending: HashMap<String, SchemaDefinition> = HashMap::new();
        let mut order = Vec::new();
        for definition in definitions {
            let name = definition.name.clone();
            if self.schemas.contains_key(&name) || pending.contains_key(&name) {
                return Err(RegistryError::DuplicateSchema(name));
            }
            order.push(name.clone());
            pending.insert(name, definition);
        }

        let mut resolver = Resolver {
            registry: self,
            pending: &pending,
            built: HashMap::new(),
            stack: Vec::new(),
        };
        for name in &order {
            resolver.resolve(name)?;
        }
        let mut built = resolver.built;

        let mut declared = Vec::with_capacity(order.len());
        for name in order {
            if let Some(schema) = built.remove(&name) {
                debug!(schema = %name, fields = schema.fields().len(), "registered schema");
                declared.push(Arc::clone(&schema));
                self.schemas.insert(name, schema);
            }
        }
        Ok(declared)
    }

    /// Parses a YAML definition document and [`define`](Self::define)s it.
    pub fn define_yaml(&mut self, text: &str) -> Result<Vec<Arc<Schema>>> {
        let document = DefinitionDocument::from_yaml_str(text)?;
        let declared = self.define(document.schemas)?;
        self.sources.push(DefinitionSource::Inline);
        Ok(declared)
    }

    /// Parses a JSON definition document and [`define`](Self::define)s it.
    pub fn define_json(&mut self, text: &str) -> Result<Vec<Arc<Schema>>> {
        let document = DefinitionDocument::from_json_str(text)?;
        let declared = self.define(document.schemas)?;
        self.sources.push(DefinitionSource::Inline);
        Ok(declared)
    }

    /// Looks up a schema by name.
    pub fn get(&self, name: &str) -> Option<&Arc<Schema>> {
        self.schemas.get(name)
    }

    /// Looks up a schema by name.
    ///
    /// # Errors
    ///
    /// [`RegistryError::UnknownSchema`] if no schema has that name.
    pub fn schema(&self, name: &str) -> Result<&Arc<Schema>> {
        self.get(name)
            .ok_or_else(|| RegistryError::UnknownSchema(name.to_string()))
    }

    /// Returns `true` if a schema called `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// Returns the number of registered schemas.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Returns `true` if no schemas are registered.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Returns an iterator over schema names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(|s| s.as_str())
    }

    /// The function table definitions are resolved against.
    pub fn functions(&self) -> &Functions {
        &self.functions
    }

    /// Where the registered schemas came from.
    pub fn sources(&self) -> &[DefinitionSource] {
        &self.sources
    }

    /// Constructs an instance of the named schema.
    pub fn construct(&self, name: &str, input: Map) -> Result<Instance> {
        Ok(self.schema(name)?.construct(input)?)
    }

    /// Constructs an instance of the named schema from a decoded document.
    pub fn from_value(&self, name: &str, document: &serde_json::Value) -> Result<Instance> {
        Ok(self.schema(name)?.from_value(document)?)
    }

    /// Constructs an instance of the named schema from JSON text.
    pub fn from_json(&self, name: &str, text: &str) -> Result<Instance> {
        Ok(self.schema(name)?.from_json(text)?)
    }
}

/// Depth-first resolution of pending definitions, dependencies first.
struct Resolver<'a> {
    registry: &'a SchemaRegistry,
    pending: &'a HashMap<String, SchemaDefinition>,
    built: HashMap<String, Arc<Schema>>,
    stack: Vec<String>,
}

impl Resolver<'_> {
    fn resolve(&mut self, name: &str) -> Result<()> {
        if self.built.contains_key(name) {
            return Ok(());
        }
        if self.stack.iter().any(|segment| segment == name) {
            let cycle = self
                .stack
                .iter()
                .map(String::as_str)
                .chain(std::iter::once(name))
                .collect::<Vec<_>>()
                .join(" -> ");
            return Err(RegistryError::ReferenceCycle(cycle));
        }
        let pending = self.pending;
        let Some(definition) = pending.get(name) else {
            // already registered, or unknown; `build` reports the latter
            return Ok(());
        };

        self.stack.push(name.to_string());
        for reference in definition.references()? {
            self.resolve(&reference)?;
        }
        self.stack.pop();

        let registry = self.registry;
        let built = &self.built;
        let lookup = |name: &str| {
            built
                .get(name)
                .or_else(|| registry.get(name))
                .cloned()
        };
        let schema = definition.build(&registry.functions, &lookup)?;
        self.built.insert(name.to_string(), schema);
        Ok(())
    }
}

/// Builder for a [`SchemaRegistry`] drawing on several sources.
///
/// # Example
///
/// ```no_run
/// use record_schema_core::Functions;
/// use record_schema_registry::SchemaRegistry;
///
/// let mut functions = Functions::builtin();
/// functions.register_validator("is_plate", |v| v.as_str().is_some_and(|s| s.len() <= 8));
///
/// let registry = SchemaRegistry::builder()
///     .functions(functions)
///     .from_dir("/etc/records/")
///     .exclude("Legacy")
///     .build()
///     .unwrap();
/// ```
pub struct RegistryBuilder {
    functions: Functions,
    sources: Vec<PendingSource>,
    exclude: Vec<String>,
}

enum PendingSource {
    File(PathBuf),
    Directory(PathBuf),
    Yaml(String),
    Json(String),
    Schema(Arc<Schema>),
}

impl RegistryBuilder {
    /// Creates a builder with the built-in functions and no sources.
    pub fn new() -> Self {
        Self {
            functions: Functions::builtin(),
            sources: Vec::new(),
            exclude: Vec::new(),
        }
    }

    /// Replaces the function table.
    pub fn functions(mut self, functions: Functions) -> Self {
        self.functions = functions;
        self
    }

    /// Adds a definition file.
    pub fn from_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(PendingSource::File(path.into()));
        self
    }

    /// Adds every `*.json`, `*.yml` and `*.yaml` file in a directory.
    pub fn from_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(PendingSource::Directory(path.into()));
        self
    }

    /// Adds inline YAML definitions.
    pub fn from_yaml_str(mut self, text: impl Into<String>) -> Self {
        self.sources.push(PendingSource::Yaml(text.into()));
        self
    }

    /// Adds inline JSON definitions.
    pub fn from_json_str(mut self, text: impl Into<String>) -> Self {
        self.sources.push(PendingSource::Json(text.into()));
        self
    }

    /// Adds a programmatically declared schema.
    pub fn with_schema(mut self, schema: Arc<Schema>) -> Self {
        self.sources.push(PendingSource::Schema(schema));
        self
    }

    /// Skips definitions with this name.
    pub fn exclude(mut self, name: impl Into<String>) -> Self {
        self.exclude.push(name.into());
        self
    }

    /// Loads every source and resolves all definitions together.
    ///
    /// # Errors
    ///
    /// The first I/O, parse or resolution error encountered.
    pub fn build(self) -> Result<SchemaRegistry> {
        let mut registry = SchemaRegistry::with_functions(self.functions);
        let mut definitions = Vec::new();

        for source in self.sources {
            match source {
                PendingSource::File(path) => {
                    definitions.extend(DefinitionDocument::load(&path)?.schemas);
                    info!(path = %path.display(), "loaded schema definitions");
                    registry.sources.push(DefinitionSource::File(path));
                }
                PendingSource::Directory(path) => {
                    for file in definition_files(&path)? {
                        definitions.extend(DefinitionDocument::load(&file)?.schemas);
                    }
                    info!(path = %path.display(), "loaded schema definition directory");
                    registry.sources.push(DefinitionSource::Directory(path));
                }
                PendingSource::Yaml(text) => {
                    definitions.extend(DefinitionDocument::from_yaml_str(&text)?.schemas);
                    registry.sources.push(DefinitionSource::Inline);
                }
                PendingSource::Json(text) => {
                    definitions.extend(DefinitionDocument::from_json_str(&text)?.schemas);
                    registry.sources.push(DefinitionSource::Inline);
                }
                PendingSource::Schema(schema) => registry.register(schema)?,
            }
        }

        let exclude = self.exclude;
        let definitions = definitions.into_iter().filter(|definition| {
            let skip = exclude.iter().any(|name| *name == definition.name);
            if skip {
                warn!(schema = %definition.name, "skipping excluded schema definition");
            }
            !skip
        });
        registry.define(definitions)?;
        info!(schemas = registry.len(), "schema registry ready");
        Ok(registry)
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Definition files of a directory, sorted by path.
fn definition_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && DefinitionFormat::from_path(&path).is_some() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use record_schema_core::{ErrorKind, TypeDescriptor, Value};

    use super::*;

    fn garage_yaml() -> &'static str {
        r#"
schemas:
  - name: Garage
    fields:
      cars: List[Car]
  - name: Car
    fields:
      year: int
      license: str
"#
    }

    #[test]
    fn test_forward_references_resolve() {
        let mut registry = SchemaRegistry::new();
        let declared = registry.define_yaml(garage_yaml()).unwrap();
        let names: Vec<&str> = declared.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["Garage", "Car"]);

        let garage = registry
            .from_json("Garage", r#"{"cars": [{"year": 1987, "license": "4018 JXT"}]}"#)
            .unwrap();
        let cars = garage.get("cars").and_then(Value::as_list).unwrap();
        let car = cars[0].as_record().unwrap();
        assert!(Arc::ptr_eq(car.schema(), registry.get("Car").unwrap()));
    }

    #[test]
    fn test_reference_cycle_detected() {
        let mut registry = SchemaRegistry::new();
        let err = registry
            .define_yaml(
                r#"
schemas:
  - name: A
    fields: { b: B }
  - name: B
    fields: { a: "Optional[A]" }
"#,
            )
            .unwrap_err();
        match err {
            RegistryError::ReferenceCycle(path) => assert_eq!(path, "A -> B -> A"),
            other => panic!("unexpected error {other:?}"),
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn test_self_reference_is_a_cycle() {
        let mut registry = SchemaRegistry::new();
        let err = registry
            .define_yaml("schemas: [{name: Node, fields: {next: 'Optional[Node]'}}]")
            .unwrap_err();
        assert!(matches!(err, RegistryError::ReferenceCycle(path) if path == "Node -> Node"));
    }

    #[test]
    fn test_define_is_all_or_nothing() {
        let mut registry = SchemaRegistry::new();
        let err = registry
            .define_yaml(
                r#"
schemas:
  - name: Fine
    fields: { x: int }
  - name: Broken
    fields: { y: Ghost }
"#,
            )
            .unwrap_err();
        assert!(matches!(err, RegistryError::UnknownSchema(name) if name == "Ghost"));
        assert!(!registry.contains("Fine"));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut registry = SchemaRegistry::new();
        registry
            .define_yaml("schemas: [{name: Car, fields: {year: int}}]")
            .unwrap();
        let err = registry
            .define_yaml("schemas: [{name: Car, fields: {plate: str}}]")
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateSchema(name) if name == "Car"));

        let programmatic = Schema::builder("Car")
            .field("year", TypeDescriptor::int())
            .build()
            .unwrap();
        assert!(registry.register(programmatic).is_err());
    }

    #[test]
    fn test_definitions_can_reference_programmatic_schemas() {
        let address = Schema::builder("Address")
            .field("city", TypeDescriptor::str())
            .build()
            .unwrap();
        let registry = SchemaRegistry::builder()
            .with_schema(address)
            .from_yaml_str("schemas: [{name: User, fields: {address: Address}}]")
            .build()
            .unwrap();

        assert_eq!(registry.len(), 2);
        let user = registry
            .from_json("User", r#"{"address": {"city": "scranton"}}"#)
            .unwrap();
        assert!(user.get("address").and_then(Value::as_record).is_some());
        assert!(
            registry
                .sources()
                .contains(&DefinitionSource::Programmatic("Address".into()))
        );
    }

    #[test]
    fn test_excluded_definition_skipped() {
        let registry = SchemaRegistry::builder()
            .from_yaml_str(
                "schemas: [{name: Keep, fields: {x: int}}, {name: Drop, fields: {y: int}}]",
            )
            .exclude("Drop")
            .build()
            .unwrap();
        assert!(registry.contains("Keep"));
        assert!(!registry.contains("Drop"));
    }

    #[test]
    fn test_unknown_schema_lookup() {
        let registry = SchemaRegistry::new();
        assert!(matches!(
            registry.from_json("Nope", "{}"),
            Err(RegistryError::UnknownSchema(_))
        ));
    }

    #[test]
    fn test_construction_errors_pass_through() {
        let mut registry = SchemaRegistry::new();
        registry
            .define_json(r#"{"schemas": [{"name": "Tagged", "fields": {"tags": "List[int]"}}]}"#)
            .unwrap();
        match registry.from_json("Tagged", r#"{"tags": [1, "x"]}"#) {
            Err(RegistryError::Schema(err)) => {
                assert_eq!(err.kind(), ErrorKind::Type);
                assert_eq!(err.path().unwrap().to_string(), "tags[1]");
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn test_custom_functions_resolve() {
        let mut functions = Functions::builtin();
        functions.register_coercer("upper", |v| {
            v.as_str()
                .map(|s| Value::Str(s.to_uppercase()))
                .ok_or_else(|| "expected text".to_string())
        });
        let mut registry = SchemaRegistry::with_functions(functions);
        registry
            .define_yaml("schemas: [{name: Plate, fields: {code: {type: str, coerce: upper}}}]")
            .unwrap();
        let plate = registry.from_json("Plate", r#"{"code": "jxt"}"#).unwrap();
        assert_eq!(plate.get("code"), Some(&Value::from("JXT")));
    }
}
