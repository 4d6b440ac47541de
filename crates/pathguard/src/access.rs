//! Access evaluation: is an action permitted at a path?
//!
//! Evaluation walks the path once before any traversal happens. At each hop
//! the container's own default policy is carried forward, so plain containers
//! nested in a store inherit that store's policy. Only the final segment's
//! permission decides the outcome, except where the walk enters a nested store,
//! which then answers for the rest of the path.

use pathguard_core::{next_segment, Action, Permission, Segment};
use pathguard_perms::{have_role, resolve};

use crate::error::{Result, StoreError};
use crate::store::Store;
use crate::value::{FieldMap, StoreValue};

/// Evaluate an action against a store's fields.
pub(crate) fn allowed_in_store(
    action: Action,
    store: &Store,
    path: &str,
    inherited: Permission,
) -> Result<bool> {
    let state = store.state()?;
    let segment = next_segment(path);
    let own_policy = state.default_policy;
    let annotation = state.annotations.get(segment.head);

    match state.fields.field(segment.head) {
        Some(value) => allowed_at(
            action,
            value,
            segment,
            resolve(annotation, own_policy),
            own_policy,
        ),
        None => Ok(allowed_if_absent(action, annotation, own_policy, inherited)),
    }
}

/// Evaluate an action against an arbitrary value reached mid-path.
pub(crate) fn allowed_in_value(
    action: Action,
    value: &StoreValue,
    path: &str,
    inherited: Permission,
) -> Result<bool> {
    match value {
        StoreValue::Store(store) => allowed_in_store(action, store, path, inherited),
        StoreValue::Container(container) => allowed_in_fields(action, container, path, inherited),
        StoreValue::Undefined | StoreValue::Primitive(pathguard_core::Primitive::Null) => {
            Ok(allowed_if_absent(action, None, inherited, inherited))
        }
        other => Err(StoreError::NotTraversable {
            segment: next_segment(path).head.to_string(),
            kind: other.kind(),
        }),
    }
}

/// Plain containers carry no annotations: every field has the inherited policy.
fn allowed_in_fields<M: FieldMap + ?Sized>(
    action: Action,
    map: &M,
    path: &str,
    inherited: Permission,
) -> Result<bool> {
    let segment = next_segment(path);
    match map.field(segment.head) {
        Some(value) => allowed_at(action, value, segment, inherited, inherited),
        None => Ok(allowed_if_absent(action, None, inherited, inherited)),
    }
}

/// Decide at a field that exists.
fn allowed_at(
    action: Action,
    value: &StoreValue,
    segment: Segment<'_>,
    permission: Permission,
    policy: Permission,
) -> Result<bool> {
    if segment.is_final {
        return Ok(have_role(Some(permission), action));
    }

    match value {
        // A nested store is asked about read access whatever the action.
        // Its own write guard still runs when the write reaches it.
        StoreValue::Store(child) => child.allowed_to_read(segment.rest),
        StoreValue::Lazy(lazy) => allowed_in_value(action, &lazy.call(), segment.rest, policy),
        other => allowed_in_value(action, other, segment.rest, policy),
    }
}

/// Decide at a field that does not exist yet.
///
/// The inherited policy must permit the action before the field is considered
/// at all; then the field is judged as if it held a value, by its annotation
/// or the container's own policy.
fn allowed_if_absent(
    action: Action,
    annotation: Option<Permission>,
    own_policy: Permission,
    inherited: Permission,
) -> bool {
    have_role(Some(inherited), action) && have_role(Some(resolve(annotation, own_policy)), action)
}
