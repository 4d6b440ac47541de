//! # Pathguard Testkit
//!
//! Testing utilities for Pathguard.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Scenario vectors**: Named access scenarios with their expected outcomes
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: Prepared stores for common test setups
//!
//! ## Scenario Vectors
//!
//! Every vector sets up a store, performs one access, and records what must
//! happen:
//!
//! ```rust
//! use pathguard_testkit::vectors::verify_all_vectors;
//!
//! for (name, passed, detail) in verify_all_vectors() {
//!     assert!(passed, "{name}: {detail}");
//! }
//! ```
//!
//! ## Property Testing
//!
//! Use the generators with proptest:
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use pathguard_testkit::generators::{store_from_params, StoreParams};
//!
//! proptest! {
//!     #[test]
//!     fn export_respects_permissions(params: StoreParams) {
//!         let store = store_from_params(&params);
//!         for (field, permission, _) in &params.fields {
//!             prop_assert_eq!(store.entries().contains_key(field), permission.can_read());
//!         }
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use pathguard_testkit::fixtures::TestFixture;
//!
//! let fixture = TestFixture::profile();
//! assert!(fixture.is_denied_read("password"));
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{init_tracing, nested_fixtures, TestFixture};
pub use generators::{store_from_params, StoreParams};
pub use vectors::{all_vectors, run_vector, verify_all_vectors, Expected, ScenarioVector};
