//! Scenario vectors for access-control behaviour.
//!
//! Each vector describes a store, one access against it, and the outcome
//! every conforming build must produce.

use pathguard::{Store, StoreError, StoreResult};
use pathguard_core::{Action, Permission};
use serde_json::Value;

/// What a scenario must produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    /// The read returns this JSON value.
    Value(&'static str),
    /// The read returns undefined.
    Undefined,
    /// The read returns a nested store.
    Store,
    /// The write succeeds.
    Written,
    /// The access is refused.
    Denied,
    /// The path runs through a value that cannot be traversed.
    TypeError,
}

/// A scenario vector.
#[derive(Debug, Clone)]
pub struct ScenarioVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Entries written, path by path, before annotations are applied.
    pub setup: &'static str,
    /// Field annotations.
    pub annotations: &'static [(&'static str, Permission)],
    /// Policy in force during the access.
    pub default_policy: Permission,
    /// The access performed.
    pub action: Action,
    /// The path accessed.
    pub path: &'static str,
    /// JSON value written, for write scenarios.
    pub value: &'static str,
    /// Required outcome.
    pub expected: Expected,
}

const RW: Permission = Permission::ReadWrite;

/// Get all scenario vectors.
pub fn all_vectors() -> Vec<ScenarioVector> {
    vec![
        ScenarioVector {
            name: "unwritten path reads undefined",
            setup: "{}",
            annotations: &[],
            default_policy: RW,
            action: Action::Read,
            path: "a:b:c",
            value: "null",
            expected: Expected::Undefined,
        },
        ScenarioVector {
            name: "none annotation denies read under rw policy",
            setup: r#"{"secret": 1}"#,
            annotations: &[("secret", Permission::NoAccess)],
            default_policy: RW,
            action: Action::Read,
            path: "secret",
            value: "null",
            expected: Expected::Denied,
        },
        ScenarioVector {
            name: "none annotation denies write under rw policy",
            setup: r#"{"secret": 1}"#,
            annotations: &[("secret", Permission::NoAccess)],
            default_policy: RW,
            action: Action::Write,
            path: "secret",
            value: "2",
            expected: Expected::Denied,
        },
        ScenarioVector {
            name: "nested write reads back",
            setup: r#"{"a:b:c": 5}"#,
            annotations: &[],
            default_policy: RW,
            action: Action::Read,
            path: "a:b:c",
            value: "null",
            expected: Expected::Value("5"),
        },
        ScenarioVector {
            name: "plain object reads as json text",
            setup: r#"{"a": {"b": 1}}"#,
            annotations: &[],
            default_policy: RW,
            action: Action::Read,
            path: "a",
            value: "null",
            expected: Expected::Value(r#""{\"b\":1}""#),
        },
        ScenarioVector {
            name: "marker key promotes to store",
            setup: r#"{"x": {"store": {"y": 1}}}"#,
            annotations: &[],
            default_policy: RW,
            action: Action::Read,
            path: "x",
            value: "null",
            expected: Expected::Store,
        },
        ScenarioVector {
            name: "promoted store field reads through",
            setup: r#"{"x": {"store": {"y": 1}}}"#,
            annotations: &[],
            default_policy: RW,
            action: Action::Read,
            path: "x:y",
            value: "null",
            expected: Expected::Value("1"),
        },
        ScenarioVector {
            name: "read-only policy blocks write",
            setup: "{}",
            annotations: &[],
            default_policy: Permission::ReadOnly,
            action: Action::Write,
            path: "k",
            value: "1",
            expected: Expected::Denied,
        },
        ScenarioVector {
            name: "write-only field is hidden",
            setup: r#"{"inbox": "hello"}"#,
            annotations: &[("inbox", Permission::WriteOnly)],
            default_policy: RW,
            action: Action::Read,
            path: "inbox",
            value: "null",
            expected: Expected::Denied,
        },
        ScenarioVector {
            name: "write-only absent field accepts write",
            setup: "{}",
            annotations: &[("inbox", Permission::WriteOnly)],
            default_policy: RW,
            action: Action::Write,
            path: "inbox",
            value: r#""hello""#,
            expected: Expected::Written,
        },
        ScenarioVector {
            name: "absent annotated field still needs store policy",
            setup: "{}",
            annotations: &[("inbox", Permission::WriteOnly)],
            default_policy: Permission::NoAccess,
            action: Action::Write,
            path: "inbox",
            value: r#""hello""#,
            expected: Expected::Denied,
        },
        ScenarioVector {
            name: "annotation beats default policy",
            setup: r#"{"name": "John"}"#,
            annotations: &[("name", Permission::ReadOnly)],
            default_policy: Permission::NoAccess,
            action: Action::Read,
            path: "name",
            value: "null",
            expected: Expected::Value(r#""John""#),
        },
        ScenarioVector {
            name: "intermediate annotation is not consulted",
            setup: r#"{"a": {"b": 1}}"#,
            annotations: &[("a", Permission::NoAccess)],
            default_policy: RW,
            action: Action::Read,
            path: "a:b",
            value: "null",
            expected: Expected::Value("1"),
        },
        ScenarioVector {
            name: "path through a number is a type error",
            setup: r#"{"n": 1}"#,
            annotations: &[],
            default_policy: RW,
            action: Action::Read,
            path: "n:x",
            value: "null",
            expected: Expected::TypeError,
        },
        ScenarioVector {
            name: "array element by index",
            setup: r#"{"list": [10, 20]}"#,
            annotations: &[],
            default_policy: RW,
            action: Action::Read,
            path: "list:1",
            value: "null",
            expected: Expected::Value("20"),
        },
        ScenarioVector {
            name: "write vivifies intermediates",
            setup: "{}",
            annotations: &[],
            default_policy: RW,
            action: Action::Write,
            path: "p:q:r",
            value: "true",
            expected: Expected::Written,
        },
    ]
}

/// Set up a vector's store.
pub fn store_from_vector(vector: &ScenarioVector) -> Result<Store, String> {
    let store = Store::new();
    let setup: serde_json::Map<String, Value> =
        serde_json::from_str(vector.setup).map_err(|e| format!("bad setup: {e}"))?;
    store
        .write_entries(setup)
        .map_err(|e| format!("setup failed: {e}"))?;
    for (field, permission) in vector.annotations {
        store
            .restrict(*field, *permission)
            .map_err(|e| format!("annotation failed: {e}"))?;
    }
    store
        .set_default_policy(vector.default_policy)
        .map_err(|e| format!("policy failed: {e}"))?;
    Ok(store)
}

/// Run a vector and describe the outcome in the terms of [`Expected`].
pub fn run_vector(vector: &ScenarioVector) -> Result<Expected, String> {
    let store = store_from_vector(vector)?;

    let outcome = match vector.action {
        Action::Read => store.read(vector.path).map(|result| match result {
            StoreResult::Undefined => Ok(Expected::Undefined),
            StoreResult::Store(_) => Ok(Expected::Store),
            StoreResult::Primitive(p) => matching_value(vector, p.to_json()),
        }),
        Action::Write => {
            let value: Value =
                serde_json::from_str(vector.value).map_err(|e| format!("bad value: {e}"))?;
            store.write(vector.path, value).map(|_| Ok(Expected::Written))
        }
    };

    match outcome {
        Ok(result) => result,
        Err(StoreError::AccessDenied { .. }) => Ok(Expected::Denied),
        Err(e) if e.is_type_error() => Ok(Expected::TypeError),
        Err(e) => Err(e.to_string()),
    }
}

/// Compare a read value against the vector's expected JSON.
fn matching_value(vector: &ScenarioVector, actual: Value) -> Result<Expected, String> {
    match vector.expected {
        Expected::Value(text) => {
            let expected: Value =
                serde_json::from_str(text).map_err(|e| format!("bad expectation: {e}"))?;
            if expected == actual {
                Ok(Expected::Value(text))
            } else {
                Err(format!("read {actual}, expected {expected}"))
            }
        }
        _ => Err(format!("read {actual}")),
    }
}

/// Verify all scenario vectors.
///
/// Returns `(name, passed, detail)` for each vector.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    all_vectors()
        .iter()
        .map(|v| match run_vector(v) {
            Ok(outcome) if outcome == v.expected => (v.name.to_string(), true, String::new()),
            Ok(outcome) => (
                v.name.to_string(),
                false,
                format!("got {outcome:?}, expected {:?}", v.expected),
            ),
            Err(detail) => (v.name.to_string(), false, detail),
        })
        .collect()
}
