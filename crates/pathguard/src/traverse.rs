//! Path traversal: the actual get and set once access has been granted.
//!
//! Nothing here checks permissions, except where a path crosses into a nested
//! store: that store's own guarded `read`/`write` takes over.

use pathguard_core::{next_segment, Primitive};

use crate::error::{Result, StoreError};
use crate::store::Store;
use crate::value::{FieldMap, Lazy, StoreResult, StoreValue};

// ─────────────────────────────────────────────────────────────────────────────
// Read
// ─────────────────────────────────────────────────────────────────────────────

/// Read a path from a store's own fields.
pub(crate) fn read_store(store: &Store, path: &str) -> Result<StoreResult> {
    let state = store.state()?;
    read_in(&state.fields, path)
}

fn read_in<M: FieldMap + ?Sized>(map: &M, path: &str) -> Result<StoreResult> {
    let segment = next_segment(path);
    let Some(value) = map.field(segment.head) else {
        return Ok(StoreResult::Undefined);
    };

    if segment.is_final {
        return snapshot(value);
    }

    match value {
        StoreValue::Store(child) => child.read(segment.rest),
        StoreValue::Lazy(lazy) => read_value(&lazy.call(), segment.rest),
        other => read_value(other, segment.rest),
    }
}

fn read_value(value: &StoreValue, path: &str) -> Result<StoreResult> {
    match value {
        StoreValue::Store(store) => read_store(store, path),
        StoreValue::Container(container) => read_in(container, path),
        _ => Ok(StoreResult::Undefined),
    }
}

/// Turn a stored value into a read result.
///
/// Lazy values are invoked. Plain containers become their JSON text, so a
/// caller never holds a reference into the store's data.
pub(crate) fn snapshot(value: &StoreValue) -> Result<StoreResult> {
    match value {
        StoreValue::Undefined => Ok(StoreResult::Undefined),
        StoreValue::Primitive(p) => Ok(StoreResult::Primitive(p.clone())),
        StoreValue::Store(store) => Ok(StoreResult::Store(store.clone())),
        StoreValue::Container(container) => {
            let text = serde_json::to_string(&container.to_json())?;
            Ok(StoreResult::Primitive(Primitive::String(text)))
        }
        StoreValue::Lazy(lazy) => match lazy.call() {
            StoreValue::Lazy(_) => Ok(StoreResult::Undefined),
            produced => snapshot(&produced),
        },
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Write
// ─────────────────────────────────────────────────────────────────────────────

/// What is left to do once the borrow on the current store is released.
enum WriteStep {
    /// The value was stored.
    Done(StoreValue),

    /// The path continues into a nested store.
    Delegate {
        store: Store,
        path: String,
        value: StoreValue,
    },

    /// The path continues into whatever a lazy value produces.
    Produce {
        lazy: Lazy,
        segment: String,
        path: String,
        value: StoreValue,
    },
}

/// Write a value at a path below a store's own fields.
///
/// Nested stores and lazy values are handled after the store's borrow is
/// dropped, so neither ever runs while this store is locked for writing.
pub(crate) fn write_store(store: &Store, path: &str, value: StoreValue) -> Result<StoreValue> {
    let step = {
        let mut state = store.state_mut()?;
        write_in(&mut state.fields, path, value)?
    };

    match step {
        WriteStep::Done(written) => Ok(written),
        WriteStep::Delegate { store, path, value } => store.write(&path, value),
        WriteStep::Produce {
            lazy,
            segment,
            path,
            value,
        } => match lazy.call() {
            StoreValue::Store(store) => store.write(&path, value),
            other => Err(StoreError::NotTraversable {
                segment,
                kind: other.kind(),
            }),
        },
    }
}

fn write_in<M: FieldMap + ?Sized>(map: &mut M, path: &str, value: StoreValue) -> Result<WriteStep> {
    let segment = next_segment(path);

    if segment.is_final {
        map.set_field(segment.head, value.clone())?;
        return Ok(WriteStep::Done(value));
    }

    let slot = map.slot_or_insert(segment.head, StoreValue::object)?;
    if slot.is_nullish() {
        *slot = StoreValue::object();
    }

    match slot {
        StoreValue::Store(child) => Ok(WriteStep::Delegate {
            store: child.clone(),
            path: segment.rest.to_string(),
            value,
        }),
        StoreValue::Lazy(lazy) => Ok(WriteStep::Produce {
            lazy: lazy.clone(),
            segment: segment.head.to_string(),
            path: segment.rest.to_string(),
            value,
        }),
        StoreValue::Container(container) => write_in(container, segment.rest, value),
        other => Err(StoreError::NotTraversable {
            segment: segment.head.to_string(),
            kind: other.kind(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pathguard_core::Permission;
    use serde_json::json;

    #[test]
    fn test_read_missing_is_undefined() {
        let store = Store::new();
        assert!(read_store(&store, "nope").unwrap().is_undefined());
        assert!(read_store(&store, "a:b:c").unwrap().is_undefined());
    }

    #[test]
    fn test_write_vivifies_plain_objects() {
        let store = Store::new();
        let written = write_store(&store, "a:b:c", StoreValue::from(5)).unwrap();
        assert_eq!(written, StoreValue::from(5));

        assert_eq!(read_store(&store, "a:b:c").unwrap().as_i64(), Some(5));
        assert_eq!(
            read_store(&store, "a").unwrap().parse_json(),
            Some(json!({"b": {"c": 5}}))
        );
    }

    #[test]
    fn test_write_replaces_nullish_intermediates() {
        let store = Store::new();
        write_store(&store, "n", StoreValue::Primitive(Primitive::Null)).unwrap();
        write_store(&store, "u", StoreValue::Undefined).unwrap();

        write_store(&store, "n:x", StoreValue::from(1)).unwrap();
        write_store(&store, "u:y", StoreValue::from(2)).unwrap();

        assert_eq!(read_store(&store, "n:x").unwrap().as_i64(), Some(1));
        assert_eq!(read_store(&store, "u:y").unwrap().as_i64(), Some(2));
    }

    #[test]
    fn test_write_through_primitive_fails() {
        let store = Store::new();
        write_store(&store, "s", StoreValue::from("text")).unwrap();

        let err = write_store(&store, "s:x", StoreValue::from(1)).unwrap_err();
        assert!(err.is_type_error());
        assert_eq!(read_store(&store, "s").unwrap().as_str(), Some("text"));
    }

    #[test]
    fn test_arrays_are_indexed() {
        let store = Store::new();
        write_store(&store, "list", StoreValue::from(json!([1, 2]))).unwrap();

        assert_eq!(read_store(&store, "list:1").unwrap().as_i64(), Some(2));
        assert!(read_store(&store, "list:5").unwrap().is_undefined());

        write_store(&store, "list:2:name", StoreValue::from("x")).unwrap();
        assert_eq!(
            read_store(&store, "list").unwrap().parse_json(),
            Some(json!([1, 2, {"name": "x"}]))
        );

        let err = write_store(&store, "list:name", StoreValue::from(1)).unwrap_err();
        assert!(matches!(err, StoreError::InvalidIndex(_)));
    }

    #[test]
    fn test_snapshot_of_lazy_container_is_text() {
        let value = StoreValue::lazy(|| json!({"k": [true]}));
        let result = snapshot(&value).unwrap();
        assert_eq!(result.as_str(), Some(r#"{"k":[true]}"#));
    }

    #[test]
    fn test_write_into_nested_store_is_guarded() {
        let parent = Store::new();
        let child = Store::builder()
            .default_policy(Permission::ReadOnly)
            .build()
            .unwrap();
        write_store(&parent, "child", StoreValue::Store(child.clone())).unwrap();

        let err = write_store(&parent, "child:x", StoreValue::from(1)).unwrap_err();
        assert!(err.is_access_denied());
        assert!(child.field_names().is_empty());
    }

    #[test]
    fn test_write_through_lazy_store() {
        let target = Store::new();
        let handle = target.clone();
        let store = Store::new();
        write_store(&store, "f", StoreValue::lazy(move || handle.clone())).unwrap();

        write_store(&store, "f:x", StoreValue::from(7)).unwrap();
        assert_eq!(target.read("x").unwrap().as_i64(), Some(7));
    }

    #[test]
    fn test_write_through_lazy_plain_value_fails() {
        let store = Store::new();
        write_store(&store, "f", StoreValue::lazy(|| json!({"y": 1}))).unwrap();

        let err = write_store(&store, "f:y", StoreValue::from(2)).unwrap_err();
        assert!(matches!(err, StoreError::NotTraversable { kind: "object", .. }));
    }
}
