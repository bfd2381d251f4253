//! # recdao Core
//!
//! Core primitives shared by every recdao crate: records, their identities,
//! and the pure query algebra evaluated against them.
//!
//! ## Key Types
//!
//! - [`Record`] - A JSON object with an optional `id` field
//! - [`RecordId`] - Integer or string identity of a record
//! - [`Predicate`] - Closed expression tree of comparison leaves and AND/OR/NOT
//! - [`Comparator`] - Ordered list of `(field, direction)` sort keys
//!
//! ## Usage
//!
//! ```rust
//! use recdao_core::{Comparator, Predicate, Record};
//! use serde_json::json;
//!
//! let angus = Record::from_value(json!({"id": 1, "lastName": "Young", "deceased": false})).unwrap();
//! let jon = Record::from_value(json!({"id": 2, "lastName": "Bonham", "deceased": true})).unwrap();
//!
//! let alive = Predicate::eq("deceased", false);
//! assert!(alive.matches(&angus));
//! assert!(!alive.matches(&jon));
//!
//! let by_name = Comparator::asc("lastName");
//! assert!(by_name.compare(&jon, &angus).is_lt());
//! ```
//!
//! ## Design Notes
//!
//! - **Closed algebra**: predicates and comparators are plain enums/structs with one
//!   evaluator each, so they can be cloned, serialized and logged.
//! - **Total value order**: [`value::compare_values`] orders any two JSON values, which
//!   keeps sorting deterministic for heterogeneous fields.

pub mod comparator;
pub mod error;
pub mod predicate;
pub mod types;
pub mod value;

pub use comparator::{Comparator, Direction, SortKey};
pub use error::{CoreError, Result};
pub use predicate::{Operand, Predicate};
pub use types::{Record, RecordId, ID_FIELD};
