//! Per-instance permission annotations.
//!
//! The table is owned by a single store instance. Entries may exist for fields
//! that hold no value yet: the annotation still governs the first write.

use std::collections::HashMap;

use pathguard_core::Permission;
use serde::{Deserialize, Serialize};

use crate::error::{PermsError, Result};
use crate::policy::resolve;

/// Reserved field name under which a store keeps its default policy.
pub const DEFAULT_POLICY_FIELD: &str = "defaultPolicy";

/// Side table mapping field names to explicit permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredTable")]
pub struct PermissionTable {
    entries: HashMap<String, Permission>,
}

/// Serialized form of a table, before the reserved entry is restored.
#[derive(Deserialize)]
struct StoredTable {
    entries: HashMap<String, Permission>,
}

impl From<StoredTable> for PermissionTable {
    fn from(stored: StoredTable) -> Self {
        let mut entries = stored.entries;
        entries.insert(DEFAULT_POLICY_FIELD.to_string(), Permission::NoAccess);
        Self { entries }
    }
}

impl PermissionTable {
    /// Create a table holding only the fixed `defaultPolicy` annotation.
    pub fn new() -> Self {
        let mut entries = HashMap::new();
        entries.insert(DEFAULT_POLICY_FIELD.to_string(), Permission::NoAccess);
        Self { entries }
    }

    /// Check whether a field name is reserved.
    pub fn is_reserved(field: &str) -> bool {
        field == DEFAULT_POLICY_FIELD
    }

    /// Annotate a field, replacing any previous annotation.
    pub fn annotate(&mut self, field: impl Into<String>, permission: Permission) -> Result<()> {
        let field = field.into();
        if Self::is_reserved(&field) {
            return Err(PermsError::ReservedField(field));
        }
        self.entries.insert(field, permission);
        Ok(())
    }

    /// Remove a field's annotation so it inherits the default policy again.
    ///
    /// Returns the annotation that was removed, if any.
    pub fn clear(&mut self, field: &str) -> Result<Option<Permission>> {
        if Self::is_reserved(field) {
            return Err(PermsError::ReservedField(field.to_string()));
        }
        Ok(self.entries.remove(field))
    }

    /// Get a field's explicit annotation.
    pub fn get(&self, field: &str) -> Option<Permission> {
        self.entries.get(field).copied()
    }

    /// Get a field's effective permission under the given default policy.
    pub fn effective(&self, field: &str, default_policy: Permission) -> Permission {
        resolve(self.get(field), default_policy)
    }

    /// Iterate over the user annotations (the reserved entry is skipped).
    pub fn iter(&self) -> impl Iterator<Item = (&str, Permission)> {
        self.entries
            .iter()
            .filter(|(field, _)| !Self::is_reserved(field))
            .map(|(field, permission)| (field.as_str(), *permission))
    }

    /// Number of user annotations.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for PermissionTable {
    fn default() -> Self {
        Self::new()
    }
}
