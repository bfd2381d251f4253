//! In-memory implementation of the Store trait.
//!
//! Records live in an insertion-ordered map owned exclusively by the store.
//! Thread-safe via RwLock; listeners run after the lock is released.

use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use tracing::debug;

use recdao_core::{Record, RecordId};

use crate::error::{Result, StoreError};
use crate::listeners::{Listener, Listeners, SubscriptionId, Topic};
use crate::sequence::IdSequence;
use crate::sink::Sink;
use crate::traits::Store;

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Natural order is insertion
/// order: replacing a record keeps its position, removing and re-putting
/// it moves it to the end.
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
    ids: IdSequence,
    listeners: Listeners,
}

#[derive(Default)]
struct MemoryStoreInner {
    /// Records keyed by insertion position.
    records: BTreeMap<u64, Record>,

    /// Id index: record id -> position.
    positions: HashMap<RecordId, u64>,

    /// Next insertion position.
    next_position: u64,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner::default()),
            ids: IdSequence::new(),
            listeners: Listeners::new(),
        }
    }

    /// Number of records held.
    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.records.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryStoreInner>> {
        self.inner.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryStoreInner>> {
        self.inner.write().map_err(|_| StoreError::Poisoned)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn put(&self, mut record: Record) -> Result<Record> {
        let id = match record.try_id()? {
            Some(id) => {
                self.ids.observe(&id);
                id
            }
            None => {
                let id = self.ids.next_id()?;
                record.set_id(id.clone());
                id
            }
        };

        {
            let mut inner = self.write()?;
            let existing = inner.positions.get(&id).copied();
            let position = match existing {
                Some(position) => position,
                None => {
                    let position = inner.next_position;
                    inner.next_position += 1;
                    inner.positions.insert(id.clone(), position);
                    position
                }
            };
            inner.records.insert(position, record.clone());
        }

        debug!(%id, "put");
        self.listeners.notify(Topic::Put, &record);
        Ok(record)
    }

    async fn remove(&self, id: &RecordId) -> Result<Record> {
        let removed = {
            let mut inner = self.write()?;
            let position = inner
                .positions
                .remove(id)
                .ok_or_else(|| StoreError::NotFound(id.clone()))?;
            inner
                .records
                .remove(&position)
                .ok_or_else(|| StoreError::NotFound(id.clone()))?
        };

        debug!(%id, "remove");
        self.listeners.notify(Topic::Remove, &removed);
        Ok(removed)
    }

    async fn find(&self, id: &RecordId) -> Result<Record> {
        let inner = self.read()?;
        inner
            .positions
            .get(id)
            .and_then(|position| inner.records.get(position))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    async fn select(&self, sink: &mut dyn Sink) -> Result<()> {
        // Snapshot so sinks never run under the lock
        let snapshot: Vec<Record> = self.read()?.records.values().cloned().collect();

        for record in &snapshot {
            sink.put(record)?;
        }
        sink.eof()
    }

    fn subscribe(&self, topic: Option<Topic>, listener: Listener) -> SubscriptionId {
        self.listeners.subscribe(topic, listener)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }
}
