//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use pathguard::{Permission, Result, Store, StoreConfig, StoreResult, StoreValue};

/// Install a test-friendly tracing subscriber. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing_subscriber::filter::LevelFilter::TRACE)
        .with_test_writer()
        .try_init();
}

/// A test fixture wrapping a prepared store.
pub struct TestFixture {
    pub store: Store,
}

impl TestFixture {
    /// An empty store with the default `rw` policy.
    pub fn new() -> Self {
        Self {
            store: Store::new(),
        }
    }

    /// An empty store with the given default policy.
    pub fn with_policy(policy: Permission) -> Self {
        Self {
            store: Store::with_config(StoreConfig::default().with_default_policy(policy)),
        }
    }

    /// A user profile with one field of each permission and a nested address.
    ///
    /// | field      | permission | value       |
    /// |------------|------------|-------------|
    /// | `name`     | `r`        | `"John"`    |
    /// | `email`    | `rw`       | `"j@x.org"` |
    /// | `password` | `none`     | `"hunter2"` |
    /// | `inbox`    | `w`        | (absent)    |
    /// | `address`  | `rw`       | nested store, `zip` is `none` |
    pub fn profile() -> Self {
        let address = Store::builder()
            .field("city", "Oslo")
            .restricted_field("zip", Permission::NoAccess, "0150")
            .build()
            .expect("address fixture has no reserved fields");

        let store = Store::builder()
            .restricted_field("name", Permission::ReadOnly, "John")
            .field("email", "j@x.org")
            .restricted_field("password", Permission::NoAccess, "hunter2")
            .restrict("inbox", Permission::WriteOnly)
            .field("address", address)
            .build()
            .expect("profile fixture has no reserved fields");

        Self { store }
    }

    /// Write a JSON value at a path.
    pub fn write_json(&self, path: &str, value: serde_json::Value) -> Result<StoreValue> {
        self.store.write(path, value)
    }

    /// Read a path, returning `None` for any error.
    pub fn try_read(&self, path: &str) -> Option<StoreResult> {
        self.store.read(path).ok()
    }

    /// Whether reading `path` is refused with an access error.
    pub fn is_denied_read(&self, path: &str) -> bool {
        matches!(self.store.read(path), Err(e) if e.is_access_denied())
    }

    /// Whether writing `value` at `path` is refused with an access error.
    pub fn is_denied_write(&self, path: &str, value: impl Into<StoreValue>) -> bool {
        matches!(self.store.write(path, value), Err(e) if e.is_access_denied())
    }

    /// The exported snapshot as a JSON value.
    pub fn exported(&self) -> serde_json::Value {
        serde_json::Value::Object(self.store.entries())
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// A chain of stores, each nested in the previous one under `child`.
///
/// Level `i` holds `level = i`. The first fixture is the root.
pub fn nested_fixtures(count: usize) -> Vec<TestFixture> {
    let fixtures: Vec<TestFixture> = (0..count)
        .map(|i| {
            let store = Store::builder()
                .field("level", i as i64)
                .build()
                .expect("level fixture has no reserved fields");
            TestFixture { store }
        })
        .collect();

    for pair in fixtures.windows(2) {
        pair[0]
            .store
            .write("child", pair[1].store.clone())
            .expect("rw store accepts a child");
    }

    fixtures
}
