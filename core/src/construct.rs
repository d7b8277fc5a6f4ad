//! Instance construction.
//!
//! Construction is all-or-nothing: the key set is checked first, then every
//! declared field is resolved in declaration order, and the first failure
//! aborts the call without producing an instance.

use std::sync::Arc;

use tracing::debug;

use crate::error::{Result, SchemaError};
use crate::instance::Instance;
use crate::path::FieldPath;
use crate::schema::Schema;
use crate::value::{Map, Value};

pub(crate) fn construct(schema: &Arc<Schema>, mut input: Map, path: &FieldPath) -> Result<Instance> {
    debug!(
        schema = schema.name(),
        %path,
        partial = schema.is_partial(),
        keys = input.len(),
        "constructing instance"
    );

    check_keys(schema, &input, path)?;

    let mut values = Vec::with_capacity(schema.fields().len());
    for field in schema.fields() {
        let field_path = path.field(field.name());
        let value = match input.swap_remove(field.name()) {
            Some(raw) => field.resolve(raw, &field_path).inspect_err(|err| {
                debug!(schema = schema.name(), path = %field_path, error = %err, "field rejected");
            })?,
            // only reachable for Optional-rooted fields of partial schemas
            None => Value::Null,
        };
        values.push(value);
    }

    Ok(Instance::new(Arc::clone(schema), values))
}

/// Strict schemas need the input key set to equal the field set. Partial
/// schemas ignore unknown keys and tolerate missing `Optional` fields.
fn check_keys(schema: &Schema, input: &Map, path: &FieldPath) -> Result<()> {
    let missing: Vec<&str> = schema
        .fields()
        .iter()
        .filter(|field| !input.contains_key(field.name()))
        .filter(|field| !(schema.is_partial() && field.descriptor().is_optional()))
        .map(|field| field.name())
        .collect();

    let unexpected: Vec<&str> = if schema.is_partial() {
        Vec::new()
    } else {
        input
            .keys()
            .map(String::as_str)
            .filter(|key| !schema.contains(key))
            .collect()
    };

    if missing.is_empty() && unexpected.is_empty() {
        return Ok(());
    }

    let mut problems = Vec::new();
    if !missing.is_empty() {
        problems.push(format!("missing keys [{}]", missing.join(", ")));
    }
    if !unexpected.is_empty() {
        problems.push(format!("unexpected keys [{}]", unexpected.join(", ")));
    }
    Err(SchemaError::shape(
        path,
        format!("{} for schema {}", problems.join("; "), schema.name()),
    ))
}
