//! Error types for Pathguard Core.

use thiserror::Error;

/// Core errors that can occur while decoding primitives.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid permission: {0:?} (expected one of \"r\", \"w\", \"rw\", \"none\")")]
    InvalidPermission(String),

    #[error("invalid action: {0:?}")]
    InvalidAction(String),

    #[error("not a JSON primitive: {0}")]
    NotPrimitive(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
