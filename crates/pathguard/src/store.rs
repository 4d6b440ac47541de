//! The store: a permission-gated, dynamically keyed nested container.
//!
//! A [`Store`] is a handle. Cloning it yields another reference to the same
//! instance, so a store read out of a parent and then written through is the
//! parent's child, not a copy.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use pathguard_core::{Action, Permission, Primitive};
use pathguard_perms::PermissionTable;
use serde_json::{Map, Value};

use crate::access::allowed_in_store;
use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::promote::promote_reserved_stores;
use crate::traverse::{read_store, write_store};
use crate::value::{Fields, StoreResult, StoreValue};

/// Mutable state behind a store handle.
pub(crate) struct StoreState {
    /// The store's data. The default policy is never an entry here.
    pub(crate) fields: Fields,

    /// Explicit per-field permissions for this instance.
    pub(crate) annotations: PermissionTable,

    /// Fallback permission for unannotated fields.
    pub(crate) default_policy: Permission,

    /// Construction config, handed on to promoted child stores.
    pub(crate) config: StoreConfig,
}

/// A permission-gated key-value container addressed by `:` separated paths.
///
/// Single-threaded: the handle is neither `Send` nor `Sync`.
#[derive(Clone)]
pub struct Store {
    inner: Rc<RefCell<StoreState>>,
}

thread_local! {
    /// Stores whose `entries()` is running on this thread, innermost last.
    static EXPORTING: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
}

/// Marks a store as being exported until dropped.
struct ExportGuard(usize);

impl ExportGuard {
    fn enter(store: &Store) -> Option<Self> {
        let id = store.id();
        EXPORTING.with(|chain| {
            let mut chain = chain.borrow_mut();
            if chain.contains(&id) {
                None
            } else {
                chain.push(id);
                Some(ExportGuard(id))
            }
        })
    }
}

impl Drop for ExportGuard {
    fn drop(&mut self) {
        EXPORTING.with(|chain| {
            let mut chain = chain.borrow_mut();
            if let Some(pos) = chain.iter().rposition(|id| *id == self.0) {
                chain.remove(pos);
            }
        });
    }
}

impl Store {
    /// Create an empty store with default policy `rw`.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Create an empty store from a configuration.
    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            inner: Rc::new(RefCell::new(StoreState {
                fields: Fields::new(),
                annotations: PermissionTable::new(),
                default_policy: config.default_policy,
                config,
            })),
        }
    }

    /// Start declaring a store with annotated fields.
    pub fn builder() -> StoreBuilder {
        StoreBuilder::new()
    }

    pub(crate) fn state(&self) -> Result<Ref<'_, StoreState>> {
        self.inner
            .try_borrow()
            .map_err(|_| StoreError::Reentrant("store is being written".into()))
    }

    pub(crate) fn state_mut(&self) -> Result<RefMut<'_, StoreState>> {
        self.inner
            .try_borrow_mut()
            .map_err(|_| StoreError::Reentrant("store is being accessed".into()))
    }

    fn id(&self) -> usize {
        Rc::as_ptr(&self.inner) as *const () as usize
    }

    /// Whether both handles refer to the same store instance.
    pub fn ptr_eq(&self, other: &Store) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Whether this store's `entries()` is currently running on this thread.
    pub(crate) fn is_exporting(&self) -> bool {
        let id = self.id();
        EXPORTING.with(|chain| chain.borrow().contains(&id))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Policy and annotations
    //
    // The getters borrow shared. A store is only borrowed exclusively by its
    // own setters and by `write`, and neither runs caller code meanwhile.
    // ─────────────────────────────────────────────────────────────────────────

    /// The fallback permission for unannotated fields.
    pub fn default_policy(&self) -> Permission {
        self.inner.borrow().default_policy
    }

    /// Change the fallback permission for every unannotated field.
    ///
    /// Fails with [`StoreError::Reentrant`] while the store is being read,
    /// for example from a lazy value it is evaluating.
    pub fn set_default_policy(&self, policy: Permission) -> Result<()> {
        self.state_mut()?.default_policy = policy;
        Ok(())
    }

    /// The configuration this store was constructed with.
    pub fn config(&self) -> StoreConfig {
        self.inner.borrow().config.clone()
    }

    /// Annotate a field of this instance with an explicit permission.
    ///
    /// The field need not exist yet. Fails for the reserved `defaultPolicy`.
    pub fn restrict(&self, field: impl Into<String>, permission: Permission) -> Result<()> {
        self.state_mut()?.annotations.annotate(field, permission)?;
        Ok(())
    }

    /// Drop a field's annotation so it inherits the default policy again.
    pub fn clear_restriction(&self, field: &str) -> Result<Option<Permission>> {
        Ok(self.state_mut()?.annotations.clear(field)?)
    }

    /// The explicit annotation on a field, if any.
    pub fn permission_of(&self, field: &str) -> Option<Permission> {
        self.inner.borrow().annotations.get(field)
    }

    /// Names of the store's own fields.
    pub fn field_names(&self) -> Vec<String> {
        self.inner.borrow().fields.keys().cloned().collect()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Guarded access
    // ─────────────────────────────────────────────────────────────────────────

    /// Whether `action` at `path` would be permitted. Nothing is written.
    pub fn allowed(&self, action: Action, path: &str) -> Result<bool> {
        let policy = self.state()?.default_policy;
        allowed_in_store(action, self, path, policy)
    }

    /// Whether `read(path)` would be permitted.
    pub fn allowed_to_read(&self, path: &str) -> Result<bool> {
        self.allowed(Action::Read, path)
    }

    /// Whether `write(path, ..)` would be permitted.
    pub fn allowed_to_write(&self, path: &str) -> Result<bool> {
        self.allowed(Action::Write, path)
    }

    fn ensure(&self, action: Action, path: &str) -> Result<()> {
        if self.allowed(action, path)? {
            Ok(())
        } else {
            tracing::debug!(%action, path, "access denied");
            Err(StoreError::AccessDenied {
                action,
                path: path.to_string(),
            })
        }
    }

    /// Read the value at a path.
    ///
    /// Paths that were never written read as [`StoreResult::Undefined`]. Plain
    /// objects and arrays come back as their JSON text.
    pub fn read(&self, path: &str) -> Result<StoreResult> {
        self.ensure(Action::Read, path)?;
        read_store(self, path)
    }

    /// Write a value at a path, creating missing intermediate objects.
    ///
    /// Sub-objects carrying the configured marker key are promoted into
    /// nested stores before the write. Returns the value written.
    pub fn write(&self, path: &str, value: impl Into<StoreValue>) -> Result<StoreValue> {
        self.ensure(Action::Write, path)?;
        let config = self.state()?.config.clone();
        let value = promote_reserved_stores(value.into(), &config)?;
        tracing::trace!(path, kind = value.kind(), "write");
        write_store(self, path, value)
    }

    /// Write each entry in order.
    ///
    /// Each write is checked on its own. The first failure is returned and
    /// the remaining entries are skipped; earlier writes stay applied.
    pub fn write_entries<I, K, V>(&self, entries: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<StoreValue>,
    {
        for (key, value) in entries {
            self.write(key.as_ref(), value)?;
        }
        Ok(())
    }

    /// Snapshot every readable field as JSON.
    ///
    /// Nested stores are exported recursively under their own permissions.
    /// Unreadable fields, fields that read as null or undefined, and fields
    /// whose read fails are left out. Never fails.
    pub fn entries(&self) -> Map<String, Value> {
        let mut out = Map::new();
        let Some(_guard) = ExportGuard::enter(self) else {
            return out;
        };

        for field in self.field_names() {
            match self.allowed_to_read(&field) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    tracing::debug!(field = %field, error = %e, "omitting field from export");
                    continue;
                }
            }

            match self.read(&field) {
                Ok(StoreResult::Store(child)) if child.is_exporting() => {
                    tracing::debug!(field = %field, "omitting cyclic store from export");
                }
                Ok(StoreResult::Store(child)) => {
                    out.insert(field, Value::Object(child.entries()));
                }
                Ok(StoreResult::Undefined) | Ok(StoreResult::Primitive(Primitive::Null)) => {}
                Ok(StoreResult::Primitive(p)) => {
                    out.insert(field, p.into());
                }
                Err(e) => {
                    tracing::debug!(field = %field, error = %e, "omitting field from export");
                }
            }
        }

        out
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Store {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_borrow() {
            Ok(state) => f
                .debug_struct("Store")
                .field("default_policy", &state.default_policy)
                .field("fields", &state.fields.keys().collect::<Vec<_>>())
                .finish(),
            Err(_) => f.write_str("Store(<borrowed>)"),
        }
    }
}

/// Declares a store's fields and their permissions up front.
///
/// Fields given here are set directly: no permission check, no promotion.
#[derive(Debug, Default)]
pub struct StoreBuilder {
    config: StoreConfig,
    default_policy: Option<Permission>,
    annotations: Vec<(String, Permission)>,
    fields: Fields,
}

impl StoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a configuration. An explicit `default_policy` still wins.
    pub fn config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    pub fn default_policy(mut self, policy: Permission) -> Self {
        self.default_policy = Some(policy);
        self
    }

    /// Annotate a field, whether or not it is given a value.
    pub fn restrict(mut self, field: impl Into<String>, permission: Permission) -> Self {
        self.annotations.push((field.into(), permission));
        self
    }

    /// Set an initial field value.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<StoreValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Set an initial field value and annotate it.
    pub fn restricted_field(
        self,
        name: impl Into<String>,
        permission: Permission,
        value: impl Into<StoreValue>,
    ) -> Self {
        let name = name.into();
        self.restrict(name.clone(), permission).field(name, value)
    }

    /// Build the store. Fails if the reserved `defaultPolicy` field is
    /// annotated or given a value.
    pub fn build(self) -> Result<Store> {
        let store = Store::with_config(self.config);
        {
            let mut state = store.state_mut()?;
            if let Some(policy) = self.default_policy {
                state.default_policy = policy;
            }
            for (field, permission) in self.annotations {
                state.annotations.annotate(field, permission)?;
            }
            if let Some(reserved) = self
                .fields
                .keys()
                .find(|name| PermissionTable::is_reserved(name))
            {
                return Err(pathguard_perms::PermsError::ReservedField(reserved.clone()).into());
            }
            state.fields = self.fields;
        }
        Ok(store)
    }
}
