//! End-to-end behaviour of the store's public surface.

use std::cell::Cell;
use std::rc::Rc;

use pathguard::{Permission, Store, StoreConfig, StoreError, StoreValue};
use proptest::prelude::*;
use serde_json::json;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

fn exported(store: &Store) -> serde_json::Value {
    serde_json::Value::Object(store.entries())
}

#[test]
fn unwritten_paths_read_as_undefined() {
    init_tracing();
    let store = Store::new();

    for path in ["a", "a:b", "a:b:c", "", ":", "x::y"] {
        assert!(store.read(path).unwrap().is_undefined(), "path {path:?}");
    }
}

#[test]
fn none_annotation_denies_regardless_of_policy() {
    init_tracing();
    for policy in Permission::ALL {
        let store = Store::builder()
            .restricted_field("secret", Permission::NoAccess, 1)
            .default_policy(policy)
            .build()
            .unwrap();

        assert!(store.read("secret").unwrap_err().is_access_denied());
        assert!(store.write("secret", 2).unwrap_err().is_access_denied());
    }
}

#[test]
fn write_then_read_nested_path() {
    init_tracing();
    let store = Store::new();
    let written = store.write("a:b:c", 5).unwrap();
    assert_eq!(written, StoreValue::from(5));

    assert_eq!(store.read("a:b:c").unwrap().as_i64(), Some(5));

    // Intermediates are plain objects, read back as JSON text.
    assert_eq!(store.read("a").unwrap().parse_json(), Some(json!({"b": {"c": 5}})));
    assert_eq!(store.read("a:b").unwrap().parse_json(), Some(json!({"c": 5})));
    assert!(store.read("a").unwrap().as_store().is_none());
}

#[test]
fn entries_never_include_read_denied_keys() {
    init_tracing();
    let store = Store::builder()
        .restricted_field("hidden", Permission::NoAccess, "x")
        .restricted_field("inbox", Permission::WriteOnly, "y")
        .restricted_field("shown", Permission::ReadOnly, "z")
        .build()
        .unwrap();

    assert_eq!(exported(&store), json!({"shown": "z"}));
}

#[test]
fn entries_skip_null_and_undefined() {
    let store = Store::new();
    store.write("null", json!(null)).unwrap();
    store.write("undefined", StoreValue::Undefined).unwrap();
    store.write("zero", 0).unwrap();
    store.write("empty", "").unwrap();

    assert_eq!(exported(&store), json!({"zero": 0, "empty": ""}));
}

#[test]
fn entries_expand_nested_stores() {
    let store = Store::new();
    store
        .write(
            "user",
            json!({"store": {"name": "John", "address": {"store": {"city": "Oslo"}}}}),
        )
        .unwrap();
    store.write("plain", json!({"k": [1, 2]})).unwrap();

    assert_eq!(
        exported(&store),
        json!({
            "user": {"name": "John", "address": {"city": "Oslo"}},
            "plain": "{\"k\":[1,2]}"
        })
    );
}

#[test]
fn marker_key_promotes_to_store() {
    init_tracing();
    let store = Store::new();
    store.write("x", json!({"store": {"y": 1}})).unwrap();

    assert_eq!(store.read("x:y").unwrap().as_i64(), Some(1));
    assert!(store.read("x").unwrap().as_store().is_some());

    // The marker itself is not a field of the promoted store.
    assert!(store.read("x:store").unwrap().is_undefined());
}

#[test]
fn read_returns_the_nested_store_itself() {
    let store = Store::new();
    store.write("x", json!({"store": {}})).unwrap();

    let child = store.read("x").unwrap().as_store().cloned().unwrap();
    child.write("added", true).unwrap();

    assert_eq!(store.read("x:added").unwrap().as_bool(), Some(true));
}

#[test]
fn read_only_policy_blocks_write_without_side_effect() {
    init_tracing();
    let store = Store::with_config(StoreConfig::default().with_default_policy(Permission::ReadOnly));

    let err = store.write("k", 1).unwrap_err();
    assert!(matches!(
        err,
        StoreError::AccessDenied { action: pathguard::Action::Write, ref path } if path == "k"
    ));
    assert!(store.field_names().is_empty());
    assert!(store.read("k").unwrap().is_undefined());
}

#[test]
fn lazy_value_is_invoked_mid_path() {
    init_tracing();
    let calls = Rc::new(Cell::new(0));
    let counter = calls.clone();

    let store = Store::new();
    store
        .write(
            "f",
            StoreValue::lazy(move || {
                counter.set(counter.get() + 1);
                json!({"y": 10})
            }),
        )
        .unwrap();

    assert_eq!(store.read("f:y").unwrap().as_i64(), Some(10));
    assert!(calls.get() >= 1);
}

#[test]
fn lazy_value_at_final_segment_is_computed_each_read() {
    let calls = Rc::new(Cell::new(0));
    let counter = calls.clone();

    let store = Store::new();
    store
        .write(
            "tick",
            StoreValue::lazy(move || {
                counter.set(counter.get() + 1);
                counter.get()
            }),
        )
        .unwrap();

    let first = store.read("tick").unwrap().as_i64().unwrap();
    let second = store.read("tick").unwrap().as_i64().unwrap();
    assert!(second > first);
}

#[test]
fn write_entries_is_not_transactional() {
    init_tracing();
    let store = Store::new();
    store.restrict("b", Permission::NoAccess).unwrap();

    let err = store
        .write_entries([("a", json!(1)), ("b", json!(2)), ("c", json!(3))])
        .unwrap_err();

    assert!(err.is_access_denied());
    assert_eq!(store.read("a").unwrap().as_i64(), Some(1));
    assert_eq!(store.field_names(), vec!["a"]);
}

#[test]
fn write_entries_accepts_json_objects_and_paths() {
    let store = Store::new();
    let entries = json!({"a:b": 1, "c": {"store": {"d": 2}}});
    store
        .write_entries(entries.as_object().cloned().unwrap())
        .unwrap();

    assert_eq!(store.read("a:b").unwrap().as_i64(), Some(1));
    assert_eq!(store.read("c:d").unwrap().as_i64(), Some(2));
}

/// A nested store is asked about *read* access while a write is being
/// evaluated. The nested store's own guard still stops the write itself.
#[test]
fn nested_store_write_check_uses_read_permission() {
    init_tracing();
    let parent = Store::new();

    let read_only = Store::builder()
        .default_policy(Permission::ReadOnly)
        .build()
        .unwrap();
    parent.write("ro", read_only.clone()).unwrap();

    assert!(parent.allowed_to_write("ro:x").unwrap());
    assert!(parent.write("ro:x", 1).unwrap_err().is_access_denied());
    assert!(read_only.field_names().is_empty());

    let write_only = Store::builder()
        .default_policy(Permission::WriteOnly)
        .build()
        .unwrap();
    parent.write("wo", write_only.clone()).unwrap();

    assert!(!parent.allowed_to_write("wo:x").unwrap());
    assert!(parent.write("wo:x", 1).unwrap_err().is_access_denied());
    // Written directly, the same store accepts it.
    write_only.write("x", 1).unwrap();
}

/// Only the final segment's permission is consulted inside plain containers.
#[test]
fn intermediate_plain_field_annotation_is_not_consulted() {
    let store = Store::new();
    store.write("a", json!({"b": 1})).unwrap();
    store.restrict("a", Permission::NoAccess).unwrap();

    assert!(store.read("a").unwrap_err().is_access_denied());
    assert_eq!(store.read("a:b").unwrap().as_i64(), Some(1));
}

#[test]
fn reading_through_a_primitive_is_a_type_error() {
    let store = Store::new();
    store.write("n", 42).unwrap();

    assert!(store.read("n:x").unwrap_err().is_type_error());
    assert!(store.write("n:x", 1).unwrap_err().is_type_error());
}

#[test]
fn empty_segments_name_empty_fields() {
    let store = Store::new();
    store.write("", 1).unwrap();
    store.write("a:", 2).unwrap();

    assert_eq!(store.read("").unwrap().as_i64(), Some(1));
    assert_eq!(store.read("a:").unwrap().as_i64(), Some(2));
    assert_eq!(store.read("a").unwrap().parse_json(), Some(json!({"": 2})));
}

#[test]
fn self_containing_store_exports_without_looping() {
    init_tracing();
    let store = Store::new();
    store.write("name", "root").unwrap();
    store.write("me", store.clone()).unwrap();

    assert_eq!(exported(&store), json!({"name": "root"}));
    assert_eq!(store.read("me:me:name").unwrap().as_str(), Some("root"));

    // The write is handed to the nested store after the parent is released.
    store.write("me:other", 1).unwrap();
    assert_eq!(store.read("other").unwrap().as_i64(), Some(1));
}

#[test]
fn lazy_writing_back_into_a_store_being_read() {
    let store = Store::new();
    let handle = store.clone();
    store
        .write(
            "f",
            StoreValue::lazy(move || match handle.write("side", 1) {
                Err(StoreError::Reentrant(_)) => "busy",
                _ => "wrote",
            }),
        )
        .unwrap();

    assert_eq!(store.read("f").unwrap().as_str(), Some("busy"));
}

#[test]
fn lazy_changing_policy_of_a_store_being_read() {
    init_tracing();
    let store = Store::new();
    let handle = store.clone();
    store
        .write(
            "f",
            StoreValue::lazy(move || match handle.set_default_policy(Permission::ReadOnly) {
                Err(StoreError::Reentrant(_)) => "busy",
                _ => "changed",
            }),
        )
        .unwrap();

    assert_eq!(store.read("f").unwrap().as_str(), Some("busy"));
    assert_eq!(store.default_policy(), Permission::ReadWrite);

    store.set_default_policy(Permission::ReadOnly).unwrap();
    assert_eq!(store.default_policy(), Permission::ReadOnly);
}

#[test]
fn array_write_at_huge_index_is_an_error() {
    init_tracing();
    let store = Store::new();
    store.write("list", json!([1])).unwrap();

    for index in ["18446744073709551615", "4000000000"] {
        let err = store.write(&format!("list:{index}"), 1).unwrap_err();
        assert!(matches!(err, StoreError::InvalidIndex(ref key) if key == index));
        assert!(err.is_type_error());
    }
    assert_eq!(store.read("list").unwrap().parse_json(), Some(json!([1])));

    store.write("list:3", 4).unwrap();
    assert_eq!(
        store.read("list").unwrap().parse_json(),
        Some(json!([1, null, null, 4]))
    );
}

fn segment() -> impl Strategy<Value = String> {
    "[a-z]{1,5}".prop_filter("not the marker key", |s| s != "store")
}

proptest! {
    #[test]
    fn prop_never_written_reads_undefined(parts in prop::collection::vec(segment(), 1..5)) {
        let store = Store::new();
        let path = pathguard::core::join(&parts);
        prop_assert!(store.read(&path).unwrap().is_undefined());
    }

    #[test]
    fn prop_write_read_roundtrip(parts in prop::collection::vec(segment(), 1..5), n in any::<i64>()) {
        let store = Store::new();
        let path = pathguard::core::join(&parts);
        store.write(&path, n).unwrap();
        prop_assert_eq!(store.read(&path).unwrap().as_i64(), Some(n));
    }

    #[test]
    fn prop_entries_respect_permissions(
        fields in prop::collection::btree_map(segment(), (0usize..4, any::<i32>()), 0..8)
    ) {
        let mut builder = Store::builder();
        for (name, (p, value)) in &fields {
            builder = builder.restricted_field(name.clone(), Permission::ALL[*p], *value);
        }
        let store = builder.build().unwrap();
        let entries = store.entries();

        for (name, (p, _)) in &fields {
            prop_assert_eq!(entries.contains_key(name), Permission::ALL[*p].can_read());
        }
    }
}
