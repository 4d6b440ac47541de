//! Store configuration.

use pathguard_core::Permission;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Object key that marks a sub-object for promotion into a nested store.
pub const DEFAULT_MARKER_KEY: &str = "store";

/// Configuration applied when a store is constructed.
///
/// Stores created by promotion inherit the configuration of the store that
/// promoted them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoreConfig {
    /// Initial default policy.
    pub default_policy: Permission,

    /// Reserved key that turns a written sub-object into a nested store.
    pub marker_key: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            default_policy: Permission::ReadWrite,
            marker_key: DEFAULT_MARKER_KEY.to_string(),
        }
    }
}

impl StoreConfig {
    /// Parse a configuration from JSON. Missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_default_policy(mut self, policy: Permission) -> Self {
        self.default_policy = policy;
        self
    }

    pub fn with_marker_key(mut self, key: impl Into<String>) -> Self {
        self.marker_key = key.into();
        self
    }
}
