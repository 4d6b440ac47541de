//! Strong type definitions for permissions and actions.
//!
//! Both types serialize to the short strings used in declarations, so a
//! permission written in a config file reads exactly as it does in code.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Access permission attached to a field, or used as a store's default policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    /// `"r"`: readable, not writable.
    #[serde(rename = "r")]
    ReadOnly,

    /// `"w"`: writable, not readable.
    #[serde(rename = "w")]
    WriteOnly,

    /// `"rw"`: readable and writable. The default policy of a new store.
    #[default]
    #[serde(rename = "rw")]
    ReadWrite,

    /// `"none"`: neither readable nor writable.
    #[serde(rename = "none")]
    NoAccess,
}

impl Permission {
    /// All permissions, in declaration order.
    pub const ALL: [Permission; 4] = [
        Permission::ReadOnly,
        Permission::WriteOnly,
        Permission::ReadWrite,
        Permission::NoAccess,
    ];

    /// The short declaration string.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Permission::ReadOnly => "r",
            Permission::WriteOnly => "w",
            Permission::ReadWrite => "rw",
            Permission::NoAccess => "none",
        }
    }

    /// Whether this permission grants read access.
    pub const fn can_read(&self) -> bool {
        matches!(self, Permission::ReadOnly | Permission::ReadWrite)
    }

    /// Whether this permission grants write access.
    pub const fn can_write(&self) -> bool {
        matches!(self, Permission::WriteOnly | Permission::ReadWrite)
    }

    /// Whether this permission grants the given action.
    pub const fn allows(&self, action: Action) -> bool {
        match action {
            Action::Read => self.can_read(),
            Action::Write => self.can_write(),
        }
    }

    /// Parse a declaration string, returning `None` for anything unrecognized.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == s)
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| CoreError::InvalidPermission(s.to_string()))
    }
}

/// Check whether a string is a valid permission declaration.
pub fn is_permission(value: &str) -> bool {
    Permission::parse(value).is_some()
}

/// The kind of access being attempted on a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Read,
    Write,
}

impl Action {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Write => "write",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read" => Ok(Action::Read),
            "write" => Ok(Action::Write),
            other => Err(CoreError::InvalidAction(other.to_string())),
        }
    }
}
