//! Property tests for change tracking.

use proptest::prelude::*;
use session_items::{SessionItems, SessionValue, ValueCodec};
use std::collections::BTreeMap;

const KEYS: [&str; 4] = ["alpha", "Beta", "GAMMA", "delta"];

#[derive(Clone, Debug)]
enum Op {
    Set { key: usize, upper: bool, value: i64 },
    SetBuffer { key: usize },
    Get { key: usize, upper: bool },
    Remove { key: usize },
    RemoveAt { index: usize },
    Clear,
    Reset,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..KEYS.len(), any::<bool>(), any::<i64>())
            .prop_map(|(key, upper, value)| Op::Set { key, upper, value }),
        (0..KEYS.len()).prop_map(|key| Op::SetBuffer { key }),
        (0..KEYS.len(), any::<bool>()).prop_map(|(key, upper)| Op::Get { key, upper }),
        (0..KEYS.len()).prop_map(|key| Op::Remove { key }),
        (0..6usize).prop_map(|index| Op::RemoveAt { index }),
        Just(Op::Clear),
        Just(Op::Reset),
    ]
}

fn cased(key: usize, upper: bool) -> String {
    if upper {
        KEYS[key].to_uppercase()
    } else {
        KEYS[key].to_string()
    }
}

fn apply(items: &mut SessionItems, op: &Op) {
    match op {
        Op::Set { key, upper, value } => items.set(&cased(*key, *upper), *value),
        Op::SetBuffer { key } => items.set(KEYS[*key], SessionValue::TextBuffer("b".into())),
        Op::Get { key, upper } => {
            items.get(&cased(*key, *upper)).unwrap();
        }
        Op::Remove { key } => {
            items.remove(KEYS[*key]);
        }
        Op::RemoveAt { index } => {
            let _ = items.remove_at(*index);
        }
        Op::Clear => items.clear(),
        Op::Reset => items.set_dirty(false),
    }
}

proptest! {
    #[test]
    fn tracking_sets_stay_disjoint(
        loaded in proptest::collection::btree_set(0..KEYS.len(), 0..=KEYS.len()),
        ops in proptest::collection::vec(op_strategy(), 0..40),
    ) {
        let mut items = SessionItems::new();
        let codec = ValueCodec::default();
        for key in &loaded {
            let bytes = codec.encode(&SessionValue::from("raw")).unwrap();
            items.load_snapshot(KEYS[*key], Some(bytes));
        }
        prop_assert!(!items.is_dirty());

        for op in &ops {
            apply(&mut items, op);

            let modified = items.modified_keys();
            let deleted = items.deleted_keys();
            let present: Vec<String> = items.keys().map(str::to_lowercase).collect();

            for key in &modified {
                prop_assert!(present.contains(&key.to_lowercase()), "modified key {} not present", key);
            }
            for key in &deleted {
                prop_assert!(!present.contains(&key.to_lowercase()), "deleted key {} still present", key);
                prop_assert!(!modified.contains(key));
            }
            prop_assert_eq!(items.is_dirty(), !modified.is_empty() || !deleted.is_empty());
        }
    }

    #[test]
    fn set_values_read_back_case_insensitively(
        writes in proptest::collection::vec((0..KEYS.len(), any::<bool>(), any::<i64>()), 1..20)
    ) {
        let mut items = SessionItems::new();
        let mut model: BTreeMap<usize, i64> = BTreeMap::new();
        let mut first_casing: BTreeMap<usize, String> = BTreeMap::new();

        for (key, upper, value) in &writes {
            items.set(&cased(*key, *upper), *value);
            model.insert(*key, *value);
            first_casing.entry(*key).or_insert_with(|| cased(*key, *upper));
        }

        prop_assert_eq!(items.len(), model.len());
        for (key, value) in &model {
            for upper in [false, true] {
                prop_assert_eq!(items.get(&cased(*key, upper)).unwrap(), Some(&SessionValue::I64(*value)));
            }
        }

        let mut canonical: Vec<String> = items.keys().map(String::from).collect();
        canonical.sort();
        let mut expected: Vec<String> = first_casing.into_values().collect();
        expected.sort();
        prop_assert_eq!(canonical, expected);
    }

    #[test]
    fn codec_roundtrips_text_and_integers(text in ".*", number in any::<i64>(), flag in any::<bool>()) {
        let codec = ValueCodec::default();
        let value = SessionValue::List(vec![text.into(), number.into(), flag.into()]);
        let bytes = codec.encode(&value).unwrap();
        prop_assert_eq!(codec.decode(Some(&bytes)).unwrap(), value);
    }
}
