//! # recdao Journal
//!
//! Durability for recdao stores: a decorator that records every successful
//! mutation as an append-only entry in a second store, and a replay routine
//! that rebuilds a store from those entries.
//!
//! ## Key Types
//!
//! - [`JournalStore`] - Decorator journaling `put`/`remove` of its delegate
//! - [`JournalEntry`] - `{id, record, isRemove}` as stored in the journal
//! - [`replay`] - Apply a journal, oldest first, to a target store
//! - [`JournalConfig`] - Background or inline appends
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use recdao_core::Record;
//! use recdao_journal::{replay, JournalStore};
//! use recdao_store::{MemoryStore, Store, StoreExt, StoreRef};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let journal: StoreRef = Arc::new(MemoryStore::new());
//! let store = JournalStore::new(Arc::new(MemoryStore::new()), Arc::clone(&journal));
//!
//! store.put(Record::new().with_id(1).with("firstName", "Angus")).await.unwrap();
//! store.flush().await.unwrap();
//!
//! let rebuilt: StoreRef = Arc::new(MemoryStore::new());
//! replay(&journal, &rebuilt).await.unwrap();
//! assert_eq!(rebuilt.count().await.unwrap(), 1);
//! # });
//! ```
//!
//! ## Design Notes
//!
//! - **Best effort**: the caller's result comes from the delegate alone. There is
//!   no atomicity between the delegate write and its journal entry; a crash in
//!   between loses the entry.
//! - **Ordered appends**: a single writer task appends entries in the order the
//!   delegate operations completed.
//! - **Racing writers**: concurrent `put`s of one id are not serialized, so their
//!   entries may land in either order.

pub mod config;
pub mod entry;
pub mod error;
pub mod journal;
pub mod replay;

pub use config::{AppendMode, JournalConfig};
pub use entry::JournalEntry;
pub use error::{JournalError, Result};
pub use journal::{JournalStats, JournalStore};
pub use replay::{replay, ReplayReport};
