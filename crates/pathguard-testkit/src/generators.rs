//! Proptest generators for property-based testing.

use proptest::prelude::*;

use pathguard::{Store, StoreConfig};
use pathguard_core::{join, Action, Permission, Primitive};

/// Generate a Permission.
pub fn permission() -> impl Strategy<Value = Permission> {
    prop_oneof![
        Just(Permission::ReadOnly),
        Just(Permission::WriteOnly),
        Just(Permission::ReadWrite),
        Just(Permission::NoAccess),
    ]
}

/// Generate an Action.
pub fn action() -> impl Strategy<Value = Action> {
    prop_oneof![Just(Action::Read), Just(Action::Write)]
}

/// Generate a field name. Never the marker key or the reserved policy field.
pub fn segment() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,7}".prop_filter("reserved name", |s| {
        s != pathguard::DEFAULT_MARKER_KEY && s != pathguard_perms::DEFAULT_POLICY_FIELD
    })
}

/// Generate a path of one to `max_depth` segments.
pub fn path(max_depth: usize) -> impl Strategy<Value = String> {
    prop::collection::vec(segment(), 1..=max_depth.max(1)).prop_map(|parts| join(&parts))
}

/// Generate a primitive value.
pub fn primitive() -> impl Strategy<Value = Primitive> {
    prop_oneof![
        Just(Primitive::Null),
        any::<bool>().prop_map(Primitive::from),
        any::<i64>().prop_map(Primitive::from),
        (-1.0e9f64..1.0e9f64).prop_map(Primitive::from),
        "[ -~]{0,16}".prop_map(Primitive::from),
    ]
}

/// Parameters for generating a store with annotated fields.
#[derive(Debug, Clone)]
pub struct StoreParams {
    pub default_policy: Permission,
    pub fields: Vec<(String, Permission, Primitive)>,
}

impl Arbitrary for StoreParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            permission(),
            prop::collection::btree_map(segment(), (permission(), primitive()), 0..12),
        )
            .prop_map(|(default_policy, fields)| StoreParams {
                default_policy,
                fields: fields
                    .into_iter()
                    .map(|(name, (permission, value))| (name, permission, value))
                    .collect(),
            })
            .boxed()
    }
}

/// Build a store from parameters.
pub fn store_from_params(params: &StoreParams) -> Store {
    params
        .fields
        .iter()
        .fold(
            Store::builder()
                .config(StoreConfig::default().with_default_policy(params.default_policy)),
            |builder, (name, permission, value)| {
                builder.restricted_field(name.clone(), *permission, value.clone())
            },
        )
        .build()
        .expect("generated names are never reserved")
}
