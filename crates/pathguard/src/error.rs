//! Error types for the store.

use pathguard_core::{Action, CoreError};
use pathguard_perms::PermsError;
use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The access evaluator denied the action for the full path.
    #[error("access forbidden: cannot {action} {path:?}")]
    AccessDenied { action: Action, path: String },

    /// A path segment resolved to a value that has no fields.
    #[error("cannot traverse into {kind} at segment {segment:?}")]
    NotTraversable { segment: String, kind: &'static str },

    /// An array was addressed with a key that is not an index.
    #[error("invalid array index: {0:?}")]
    InvalidIndex(String),

    /// The store instance is already borrowed by an operation in progress.
    #[error("store is busy: {0}")]
    Reentrant(String),

    /// Permission annotation error.
    #[error("permission error: {0}")]
    Perms(#[from] PermsError),

    /// Core error.
    #[error("core error: {0}")]
    Core(#[from] CoreError),

    /// JSON serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Whether this is an access error.
    pub fn is_access_denied(&self) -> bool {
        matches!(self, StoreError::AccessDenied { .. })
    }

    /// Whether this is a type error: a value along the path cannot hold fields.
    pub fn is_type_error(&self) -> bool {
        matches!(
            self,
            StoreError::NotTraversable { .. } | StoreError::InvalidIndex(_)
        )
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
