//! # recdao Store
//!
//! The uniform data-access contract for recdao. Every collection of records,
//! whether held in memory, in SQLite, or behind a stack of decorators,
//! implements the same [`Store`] trait.
//!
//! ## Overview
//!
//! A store maps record ids to records and supports five operations: `put`
//! (upsert), `remove`, `find`, `select` (push all records into a [`Sink`])
//! and `subscribe` (mutation notifications). Query views built through
//! [`StoreExt`] (`filter`, `order_by`, `limit`, `skip`) are themselves
//! stores, so they compose freely and never copy the underlying records.
//!
//! ## Key Types
//!
//! - [`Store`] - The async trait for all record collections
//! - [`StoreExt`] - Query builder and convenience methods on [`StoreRef`]
//! - [`MemoryStore`] - Insertion-ordered in-memory store
//! - [`SqliteStore`] - SQLite-based persistent store
//! - [`ProxyStore`] - Pass-through decorator base
//! - [`Sink`] - Consumer of a `select` result, with [`ArraySink`] as the default
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use recdao_core::{Comparator, Predicate, Record};
//! use recdao_store::{MemoryStore, Store, StoreExt, StoreRef};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let store: StoreRef = Arc::new(MemoryStore::new());
//! store.put(Record::new().with_id(1).with("lastName", "Young").with("deceased", false)).await.unwrap();
//! store.put(Record::new().with_id(2).with("lastName", "Bonham").with("deceased", true)).await.unwrap();
//!
//! let living = store
//!     .filter(Predicate::eq("deceased", false))
//!     .order_by(Comparator::asc("lastName"))
//!     .select_all()
//!     .await
//!     .unwrap();
//! assert_eq!(living.len(), 1);
//! # });
//! ```
//!
//! ## Design Notes
//!
//! - **Lazy views**: a view holds only its parent handle and its parameter;
//!   every `select` re-evaluates against the parent.
//! - **Pass-through mutations**: `put`, `remove`, `find` and `subscribe` on a
//!   view reach the underlying store unchanged.
//! - **Synchronous notifications**: listeners run before `put`/`remove` return,
//!   outside any store lock.

pub mod error;
pub mod listeners;
pub mod memory;
pub mod migration;
pub mod proxy;
pub mod query;
pub mod sequence;
pub mod sink;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use listeners::{Listener, Listeners, Notification, SubscriptionId, Topic, ON};
pub use memory::MemoryStore;
pub use proxy::ProxyStore;
pub use query::{FilteredStore, LimitedStore, OrderedStore, SkipStore};
pub use sequence::IdSequence;
pub use sink::{ArraySink, CountSink, FnSink, SharedSink, Sink};
pub use sqlite::SqliteStore;
pub use traits::{Store, StoreExt, StoreRef};
