//! # recdao Testkit
//!
//! Testing utilities for recdao.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Conformance battery**: the generic checks every [`recdao_store::Store`] must pass
//! - **Generators**: Proptest strategies for mutation sequences, predicates and comparators
//! - **Fixtures**: The "band" data set and a notification recorder
//!
//! ## Conformance
//!
//! Run the battery against a store factory; each check gets a fresh store:
//!
//! ```rust
//! use std::sync::Arc;
//! use recdao_store::{MemoryStore, StoreRef};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! recdao_testkit::conformance::run_all(|| Arc::new(MemoryStore::new()) as StoreRef)
//!     .await
//!     .unwrap();
//! # });
//! ```
//!
//! ## Property Testing
//!
//! Use the generators with proptest:
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use recdao_testkit::generators::{model, ops};
//!
//! proptest! {
//!     #[test]
//!     fn store_matches_model(ops in ops(32)) {
//!         // apply(&store, &ops) then compare select_all() against model(&ops)
//!     }
//! }
//! ```

pub mod conformance;
pub mod fixtures;
pub mod generators;

pub use fixtures::{angus, band, full_band, jon, person, seed, Recorder};
pub use generators::{apply, model, Op};
