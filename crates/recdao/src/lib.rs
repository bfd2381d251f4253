//! # recdao
//!
//! A uniform, asynchronous data-access API over keyed record collections.
//!
//! ## Overview
//!
//! recdao provides:
//!
//! - **Stores**: one contract (`put`, `remove`, `find`, `select`, `subscribe`) for
//!   every collection, in memory or in SQLite
//! - **Views**: `filter`, `order_by`, `limit` and `skip` compose into lazy views
//!   that are themselves stores
//! - **Journals**: a decorator that records every mutation and a replay that
//!   rebuilds state from the record
//! - **Database**: named collections, optionally journaled to disk and
//!   recovered on open
//!
//! ## Usage
//!
//! ```rust,no_run
//! use recdao::{Comparator, Database, DatabaseConfig, Predicate, Record, Store, StoreExt};
//!
//! async fn example() {
//!     let db = Database::new(DatabaseConfig::journaled("data"));
//!     let people = db.collection("people").await.unwrap();
//!
//!     people
//!         .store()
//!         .put(Record::new().with_id(1).with("lastName", "Young").with("deceased", false))
//!         .await
//!         .unwrap();
//!
//!     let living = people
//!         .store()
//!         .filter(Predicate::eq("deceased", false))
//!         .order_by(Comparator::asc("lastName"))
//!         .select_all()
//!         .await
//!         .unwrap();
//!     println!("{} living", living.len());
//! }
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `recdao::core` - Records, predicates and comparators
//! - `recdao::store` - The Store contract, sinks, views and concrete stores
//! - `recdao::journal` - Journal decorator and replay

pub mod database;
pub mod error;

// Re-export component crates
pub use recdao_core as core;
pub use recdao_journal as journal;
pub use recdao_store as store;

// Re-export main types for convenience
pub use database::{Collection, Database, DatabaseConfig};
pub use error::{DatabaseError, Result};

// Re-export commonly used types
pub use recdao_core::{Comparator, Direction, Predicate, Record, RecordId};
pub use recdao_journal::{JournalConfig, JournalStore, ReplayReport};
pub use recdao_store::{
    ArraySink, CountSink, MemoryStore, Notification, ProxyStore, Sink, SqliteStore, Store,
    StoreError, StoreExt, StoreRef, Topic,
};
