//! Error types for the permissions module.

use thiserror::Error;

/// Errors that can occur while managing permission annotations.
#[derive(Debug, Error)]
pub enum PermsError {
    /// The field's permission is fixed and cannot be annotated.
    #[error("field {0:?} is reserved and its permission cannot be changed")]
    ReservedField(String),
}

/// Result type for permission operations.
pub type Result<T> = std::result::Result<T, PermsError>;
