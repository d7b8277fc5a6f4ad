//! JSON ingestion.
//!
//! Decoding is delegated to `serde_json`; its errors surface unchanged as
//! [`SchemaError::Decode`]. The decoded document must be an object.

use std::io::Read;
use std::sync::Arc;

use crate::construct::construct;
use crate::error::{Result, SchemaError};
use crate::instance::Instance;
use crate::path::FieldPath;
use crate::schema::Schema;
use crate::value::Value;

pub(crate) fn from_str(schema: &Arc<Schema>, text: &str) -> Result<Instance> {
    let document: serde_json::Value = serde_json::from_str(text)?;
    from_value(schema, &document)
}

pub(crate) fn from_reader<R: Read>(schema: &Arc<Schema>, reader: R) -> Result<Instance> {
    let document: serde_json::Value = serde_json::from_reader(reader)?;
    from_value(schema, &document)
}

pub(crate) fn from_value(schema: &Arc<Schema>, document: &serde_json::Value) -> Result<Instance> {
    let root = FieldPath::root();
    match document {
        serde_json::Value::Object(map) => construct(schema, Value::map_from_json(map), &root),
        other => Err(SchemaError::shape(
            &root,
            format!(
                "expected a JSON object for schema {}, found {}",
                schema.name(),
                Value::from_json(other).kind_name()
            ),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::TypeDescriptor;
    use crate::error::ErrorKind;

    fn schema() -> Arc<Schema> {
        Schema::builder("Simple")
            .field("attribute", TypeDescriptor::int())
            .build()
            .unwrap()
    }

    #[test]
    fn test_decode_error_surfaces_unchanged() {
        let err = from_str(&schema(), r#"{"attribute": 1"#).unwrap_err();
        match err {
            SchemaError::Decode(inner) => assert!(inner.is_eof()),
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[test]
    fn test_top_level_must_be_object() {
        for text in ["[1, 2]", "1", "null", r#""attribute""#] {
            let err = from_str(&schema(), text).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Shape, "input {text}");
        }
    }

    #[test]
    fn test_from_reader() {
        let input = br#"{"attribute": 7}"#;
        let dto = from_reader(&schema(), &input[..]).unwrap();
        assert_eq!(dto.get("attribute"), Some(&Value::Int(7)));
    }
}
