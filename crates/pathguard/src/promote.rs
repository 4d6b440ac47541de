//! Promotion of marked sub-objects into nested stores.
//!
//! Raw input is plain JSON-like data. An object that carries the configured
//! marker key (`"store"` by default) is turned into a fresh [`Store`]:
//!
//! ```text
//! {"profile": {"store": {"name": "John"}}}
//!     => profile is a Store holding name = "John"
//! ```
//!
//! Sibling keys next to the marker are written into the same store.

use pathguard_core::Permission;

use crate::config::StoreConfig;
use crate::error::Result;
use crate::store::Store;
use crate::value::{Container, Fields, StoreValue};

/// Walk plain objects and replace every marked object with a populated store.
///
/// Arrays, primitives, stores, and lazy values pass through unchanged.
pub fn promote_reserved_stores(value: StoreValue, config: &StoreConfig) -> Result<StoreValue> {
    let mut fields = match value {
        StoreValue::Container(Container::Object(fields)) => fields,
        other => return Ok(other),
    };

    let Some(marked) = fields.remove(&config.marker_key) else {
        let promoted = fields
            .into_iter()
            .map(|(key, value)| Ok((key, promote_reserved_stores(value, config)?)))
            .collect::<Result<Fields>>()?;
        return Ok(StoreValue::Container(Container::Object(promoted)));
    };

    tracing::trace!(marker = %config.marker_key, "promoting object to nested store");

    // Populate under rw so the configured policy cannot block its own initial data.
    let store = Store::with_config(config.clone());
    store.set_default_policy(Permission::ReadWrite)?;
    if let StoreValue::Container(Container::Object(entries)) = marked {
        store.write_entries(entries)?;
    }
    store.write_entries(fields)?;
    store.set_default_policy(config.default_policy)?;

    Ok(StoreValue::Store(store))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn promote(value: serde_json::Value) -> StoreValue {
        promote_reserved_stores(value.into(), &StoreConfig::default()).unwrap()
    }

    #[test]
    fn test_unmarked_values_pass_through() {
        assert_eq!(promote(json!(5)), StoreValue::from(5));
        assert_eq!(promote(json!({"a": {"b": 1}})), StoreValue::from(json!({"a": {"b": 1}})));
        assert_eq!(
            promote(json!([{"store": {"y": 1}}])),
            StoreValue::from(json!([{"store": {"y": 1}}]))
        );
    }

    #[test]
    fn test_marked_object_becomes_store() {
        let value = promote(json!({"store": {"y": 1}}));
        let store = value.as_store().expect("promoted to store");

        assert_eq!(store.read("y").unwrap().as_i64(), Some(1));
        assert!(store.read("store").unwrap().is_undefined());
    }

    #[test]
    fn test_nested_markers_are_promoted() {
        let value = promote(json!({
            "profile": {"store": {"name": "John", "address": {"store": {"city": "Oslo"}}}},
            "plain": {"n": 1}
        }));

        let StoreValue::Container(Container::Object(fields)) = &value else {
            panic!("expected object, got {}", value.kind());
        };
        let profile = fields["profile"].as_store().expect("profile store");
        assert!(profile.read("address").unwrap().as_store().is_some());
        assert_eq!(profile.read("address:city").unwrap().as_str(), Some("Oslo"));
        assert_eq!(fields["plain"], StoreValue::from(json!({"n": 1})));
    }

    #[test]
    fn test_siblings_join_the_store() {
        let value = promote(json!({"store": {"a": 1}, "b": 2}));
        let store = value.as_store().expect("promoted to store");

        let mut names = store.field_names();
        names.sort();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_non_object_marker_gives_empty_store() {
        let value = promote(json!({"store": 5}));
        let store = value.as_store().expect("promoted to store");
        assert!(store.field_names().is_empty());
    }

    #[test]
    fn test_promoted_store_takes_config() {
        let config = StoreConfig::default()
            .with_default_policy(Permission::ReadOnly)
            .with_marker_key("$s");
        let value =
            promote_reserved_stores(json!({"$s": {"y": 1}}).into(), &config).unwrap();
        let store = value.as_store().expect("promoted to store");

        assert_eq!(store.default_policy(), Permission::ReadOnly);
        assert_eq!(store.config().marker_key, "$s");
        assert_eq!(store.read("y").unwrap().as_i64(), Some(1));
        assert!(store.write("y", 2).unwrap_err().is_access_denied());
    }
}
