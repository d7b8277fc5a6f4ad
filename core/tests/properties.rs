use std::sync::Arc;

use proptest::prelude::*;
use record_schema_core::{ErrorKind, FieldOptions, Kind, Schema, TypeDescriptor, Value};
use serde_json::json;

const KINDS: [Kind; 6] = [
    Kind::Int,
    Kind::Float,
    Kind::Str,
    Kind::Bool,
    Kind::Dict,
    Kind::List,
];

fn kind_of(json: &serde_json::Value) -> Option<Kind> {
    match json {
        serde_json::Value::Null => None,
        serde_json::Value::Bool(_) => Some(Kind::Bool),
        serde_json::Value::Number(n) if n.is_i64() || n.is_u64() => Some(Kind::Int),
        serde_json::Value::Number(_) => Some(Kind::Float),
        serde_json::Value::String(_) => Some(Kind::Str),
        serde_json::Value::Array(_) => Some(Kind::List),
        serde_json::Value::Object(_) => Some(Kind::Dict),
    }
}

fn scalar() -> impl Strategy<Value = serde_json::Value> {
    prop_oneof![
        Just(serde_json::Value::Null),
        any::<bool>().prop_map(serde_json::Value::from),
        any::<i64>().prop_map(serde_json::Value::from),
        (-1.0e6f64..1.0e6).prop_map(|f| json!(f + 0.5)),
        "[a-z0-9]{0,8}".prop_map(serde_json::Value::from),
        Just(json!([1, "a"])),
        Just(json!({"k": 1})),
    ]
}

fn single(descriptor: TypeDescriptor, partial: bool) -> Arc<Schema> {
    Schema::builder("Probe")
        .partial(partial)
        .field("value", descriptor)
        .build()
        .unwrap()
}

proptest! {
    #[test]
    fn primitive_accepts_exactly_its_kind(value in scalar(), idx in 0usize..KINDS.len()) {
        let kind = KINDS[idx];
        let schema = single(TypeDescriptor::Primitive(kind), false);
        let result = schema.from_value(&json!({"value": value.clone()}));
        if kind_of(&value) == Some(kind) {
            prop_assert!(result.is_ok());
        } else {
            prop_assert_eq!(result.unwrap_err().kind(), ErrorKind::Type);
        }
    }

    #[test]
    fn optional_accepts_null_and_delegates(value in scalar(), idx in 0usize..KINDS.len()) {
        let kind = KINDS[idx];
        let schema = single(TypeDescriptor::optional(TypeDescriptor::Primitive(kind)), false);
        let result = schema.from_value(&json!({"value": value.clone()}));
        match kind_of(&value) {
            None => {
                let dto = result.unwrap();
                prop_assert_eq!(dto.get("value"), Some(&Value::Null));
            }
            Some(found) if found == kind => prop_assert!(result.is_ok()),
            Some(_) => prop_assert_eq!(result.unwrap_err().kind(), ErrorKind::Type),
        }
    }

    #[test]
    fn strict_rejects_any_extra_key(extra in "[a-z]{1,6}") {
        prop_assume!(extra != "value");
        let schema = single(TypeDescriptor::int(), false);
        let mut input = serde_json::Map::new();
        input.insert("value".to_string(), json!(1));
        input.insert(extra, json!(2));
        let err = schema.construct_json(&input).unwrap_err();
        prop_assert_eq!(err.kind(), ErrorKind::Shape);
    }

    #[test]
    fn partial_ignores_any_extra_key(extra in "[a-z]{1,6}", n in any::<i64>()) {
        prop_assume!(extra != "value");
        let schema = single(TypeDescriptor::int(), true);
        let mut input = serde_json::Map::new();
        input.insert("value".to_string(), json!(n));
        input.insert(extra, json!("ignored"));
        let dto = schema.construct_json(&input).unwrap();
        prop_assert_eq!(dto.len(), 1);
        prop_assert_eq!(dto.get("value"), Some(&Value::Int(n)));
    }

    #[test]
    fn int_list_accepts_only_int_elements(items in prop::collection::vec(scalar(), 0..6)) {
        let schema = single(TypeDescriptor::list_of(TypeDescriptor::int()), false);
        let all_ints = items.iter().all(|item| kind_of(item) == Some(Kind::Int));
        let result = schema.from_value(&json!({"value": items}));
        prop_assert_eq!(result.is_ok(), all_ints);
    }

    #[test]
    fn mutation_keeps_prior_value_on_type_error(start in any::<i64>(), value in scalar()) {
        let schema = Schema::builder("Probe")
            .field_with("value", TypeDescriptor::int(), FieldOptions::new().mutable())
            .build()
            .unwrap();
        let mut dto = schema.from_value(&json!({"value": start})).unwrap();
        let candidate = Value::from_json(&value);
        match dto.set("value", candidate.clone()) {
            Ok(()) => prop_assert_eq!(dto.get("value"), Some(&candidate)),
            Err(err) => {
                prop_assert_eq!(err.kind(), ErrorKind::Type);
                prop_assert_eq!(dto.get("value"), Some(&Value::Int(start)));
            }
        }
    }
}
