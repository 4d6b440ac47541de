//! # Pathguard Permissions
//!
//! Permission annotations and policy resolution.
//!
//! ## Overview
//!
//! A permission is attached to a field of one specific container instance,
//! not to a type. Each store owns a [`PermissionTable`]: a side table from
//! field name to [`Permission`]. A field with no entry inherits the store's
//! default policy.
//!
//! ## Key Concepts
//!
//! - **Annotation**: an explicit permission for one field of one store
//! - **Default policy**: the fallback permission for unannotated fields
//! - **Role check**: [`have_role`] decides whether a permission grants an action
//!
//! The default policy itself lives under the reserved field name
//! [`DEFAULT_POLICY_FIELD`], whose annotation is fixed to `none` and can never
//! be changed.
//!
//! ## Usage
//!
//! ```rust
//! use pathguard_core::{Action, Permission};
//! use pathguard_perms::{have_role, PermissionTable};
//!
//! let mut table = PermissionTable::new();
//! table.annotate("secret", Permission::NoAccess).unwrap();
//!
//! let effective = table.effective("secret", Permission::ReadWrite);
//! assert!(!have_role(Some(effective), Action::Read));
//!
//! let effective = table.effective("name", Permission::ReadOnly);
//! assert!(have_role(Some(effective), Action::Read));
//! ```

pub mod annotation;
pub mod error;
pub mod policy;

pub use annotation::{PermissionTable, DEFAULT_POLICY_FIELD};
pub use error::{PermsError, Result};
pub use policy::{have_role, have_role_str, resolve};
