//! Property tests for merging, depth limits, argument parsing and transport

use indexmap::IndexMap;
use lineage::prelude::*;
use lineage::{schedule, transport};
use proptest::prelude::*;

fn quiet_root() -> ErrorType {
    ErrorType::root()
        .extend(ErrorSpec::new().omit_stack(true))
        .unwrap()
}

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "[a-z ]{0,8}".prop_map(Value::from),
    ]
}

fn data() -> impl Strategy<Value = Value> {
    leaf().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::List),
            prop::collection::btree_map("[a-z]{1,4}", inner, 0..4)
                .prop_map(|map| Value::Object(map.into_iter().collect::<IndexMap<_, _>>())),
        ]
    })
}

/// Nested lists of non-empty strings, plus their flattened form
fn nested_words() -> impl Strategy<Value = (Value, Vec<Value>)> {
    let word = "[a-z]{1,5}".prop_map(|w: String| (Value::from(w.clone()), vec![Value::from(w)]));
    word.prop_recursive(3, 20, 4, |inner| {
        prop::collection::vec(inner, 0..4).prop_map(|parts| {
            let (items, flat): (Vec<_>, Vec<_>) = parts.into_iter().unzip();
            (Value::List(items), flat.into_iter().flatten().collect())
        })
    })
}

proptest! {
    #[test]
    fn test_extend_keeps_every_key(
        parent in prop::collection::btree_map("[a-z]{1,6}", any::<i32>(), 0..6),
        child in prop::collection::btree_map("[a-z]{1,6}", any::<i32>(), 0..6),
    ) {
        let mut spec = ErrorSpec::new();
        for (key, value) in &parent {
            spec = spec.field(key.clone(), *value);
        }
        let base = ErrorType::root().extend(spec).unwrap();

        let mut spec = ErrorSpec::new();
        for (key, value) in &child {
            spec = spec.field(key.clone(), *value);
        }
        let derived = base.extend(spec).unwrap();

        for key in base.spec().keys().chain(child.keys()) {
            prop_assert!(derived.spec().contains_key(key));
        }
        for (key, value) in &child {
            prop_assert_eq!(&derived.spec()[key], &serde_json::json!(value));
        }
    }

    #[test]
    fn test_depth_limit(max in 1usize..8, extends in 0usize..10) {
        let mut ty = ErrorType::root_with(&LineageConfig::default().with_max_depth(max));
        let mut failed_at = None;
        for step in 1..=extends {
            match ty.extend(ErrorSpec::new()) {
                Ok(next) => ty = next,
                Err(err) => {
                    let is_limit = matches!(err, LineageError::InheritanceLimit { .. });
                    prop_assert!(is_limit, "unexpected error: {:?}", err);
                    failed_at = Some(step);
                    break;
                }
            }
        }
        if extends >= max {
            prop_assert_eq!(failed_at, Some(max));
        } else {
            prop_assert_eq!(failed_at, None);
            prop_assert_eq!(ty.depth(), extends);
        }
    }

    #[test]
    fn test_push_flattens_in_order((nested, flat) in nested_words()) {
        let err = quiet_root().message("m");
        err.push(nested);
        prop_assert_eq!(err.values(), flat);
        schedule::run_pending();
    }

    #[test]
    fn test_transport_round_trips_through_json(items in prop::collection::vec(data(), 0..5)) {
        let err = quiet_root().create(std::iter::once(Value::from("m")).chain(items));
        let once = err.transport();

        let text = serde_json::to_string(&once).unwrap();
        let decoded: serde_json::Value = serde_json::from_str(&text).unwrap();
        prop_assert_eq!(&decoded, &once);
        prop_assert_eq!(transport(&Value::from(once.clone())), once);
        schedule::run_pending();
    }
}
