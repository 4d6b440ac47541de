//! # Pathguard Core
//!
//! Pure primitives for Pathguard: permissions, actions, path segments, and
//! the JSON primitive values a store can hold.
//!
//! This crate contains no containers and no traversal. It is the vocabulary
//! shared by the permission layer and the store itself.
//!
//! ## Key Types
//!
//! - [`Permission`] - The four-valued access lattice (`r`, `w`, `rw`, `none`)
//! - [`Action`] - What a caller is attempting (read or write)
//! - [`Segment`] - One step of a `:` delimited path
//! - [`Primitive`] - A JSON scalar (null, bool, number, string)
//!
//! ## Paths
//!
//! Paths are split on [`path::DELIMITER`]. There is no escaping: a segment can
//! never contain a `:`. Empty segments are legal and name the field `""`.

pub mod error;
pub mod json;
pub mod path;
pub mod types;

pub use error::{CoreError, Result};
pub use json::{is_json_object, Primitive};
pub use path::{join, next_segment, segments, Segment, DELIMITER};
pub use types::{is_permission, Action, Permission};
