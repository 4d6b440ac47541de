//! # Pathguard
//!
//! A hierarchical, permission-gated key-value store.
//!
//! ## Overview
//!
//! Callers read and write values at `:` separated paths. Every field of a
//! store carries a permission (`r`, `w`, `rw`, or `none`), either declared
//! explicitly or inherited from the store's default policy. Each access is
//! checked before the path is traversed.
//!
//! Paths compose through:
//!
//! - **Nested stores**: each one enforces its own permissions
//! - **Plain objects and arrays**: inherit the enclosing store's policy
//! - **Lazy values**: zero-argument functions evaluated on access
//!
//! ## Key Types
//!
//! - [`Store`] - The permission-gated container
//! - [`StoreBuilder`] - Declares fields and their permissions up front
//! - [`StoreValue`] - Anything a field can hold
//! - [`StoreResult`] - What a read returns
//! - [`StoreConfig`] - Construction-time configuration
//!
//! ## Usage
//!
//! ```rust
//! use pathguard::{Permission, Store, StoreValue};
//! use serde_json::json;
//!
//! let store = Store::builder()
//!     .restricted_field("name", Permission::ReadOnly, "John")
//!     .restrict("password", Permission::NoAccess)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(store.read("name").unwrap().as_str(), Some("John"));
//! assert!(store.write("name", "Jane").unwrap_err().is_access_denied());
//! assert!(store.write("password", "secret").unwrap_err().is_access_denied());
//!
//! // Missing intermediate objects are created on write.
//! store.write("settings:theme:color", "blue").unwrap();
//! assert_eq!(store.read("settings:theme:color").unwrap().as_str(), Some("blue"));
//!
//! // A "store" key turns a sub-object into a nested store.
//! store.write("profile", json!({"store": {"age": 42}})).unwrap();
//! assert!(store.read("profile").unwrap().as_store().is_some());
//! assert_eq!(store.read("profile:age").unwrap().as_i64(), Some(42));
//!
//! // Lazy values are computed on every read.
//! store.write("now", StoreValue::lazy(|| 1_700_000_000)).unwrap();
//! assert_eq!(store.read("now").unwrap().as_i64(), Some(1_700_000_000));
//!
//! let exported = store.entries();
//! assert!(exported.contains_key("profile"));
//! assert!(!exported.contains_key("password"));
//! ```
//!
//! ## Design Notes
//!
//! - **Check once, then traverse**: permissions are evaluated before the walk;
//!   the walk re-checks only when it enters a nested store
//! - **Snapshots, not references**: reading a plain object returns its JSON text
//! - **No transactions**: `write_entries` keeps writes made before a failure
//! - **Single-threaded**: stores are `Rc` handles and are not `Send`

mod access;
pub mod config;
pub mod error;
pub mod promote;
pub mod store;
mod traverse;
pub mod value;

// Re-export component crates
pub use pathguard_core as core;
pub use pathguard_perms as perms;

pub use config::{StoreConfig, DEFAULT_MARKER_KEY};
pub use error::{Result, StoreError};
pub use promote::promote_reserved_stores;
pub use store::{Store, StoreBuilder};
pub use value::{Container, FieldMap, Fields, Lazy, StoreResult, StoreValue, MAX_INDEX_GAP};

// Re-export commonly used core types
pub use pathguard_core::{Action, Permission, Primitive};
