//! Role checks and effective-permission resolution.

use pathguard_core::{Action, Permission};

/// Check whether a permission grants an action.
///
/// Read needs `r` or `rw`, write needs `w` or `rw`. An absent permission is
/// treated exactly like `none`.
pub fn have_role(permission: Option<Permission>, action: Action) -> bool {
    permission.is_some_and(|p| p.allows(action))
}

/// Role check over a raw declaration string.
///
/// Unrecognized strings grant nothing.
pub fn have_role_str(permission: &str, action: Action) -> bool {
    have_role(Permission::parse(permission), action)
}

/// Resolve the effective permission of a field: its annotation if present,
/// otherwise the enclosing container's default policy.
pub fn resolve(annotation: Option<Permission>, default_policy: Permission) -> Permission {
    annotation.unwrap_or(default_policy)
}
