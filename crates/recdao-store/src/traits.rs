//! Store trait: the uniform interface over a keyed record collection.
//!
//! Every concrete store and every decorator implements [`Store`]. The
//! query builder lives on [`StoreExt`], which wraps a shared [`StoreRef`]
//! in a lazy view without touching the underlying records.

use std::sync::Arc;

use async_trait::async_trait;
use recdao_core::{Comparator, Predicate, Record, RecordId};

use crate::error::{Result, StoreError};
use crate::listeners::{Listener, SubscriptionId, Topic};
use crate::query::{FilteredStore, LimitedStore, OrderedStore, SkipStore};
use crate::sink::{ArraySink, CountSink, SharedSink, Sink};

/// Shared handle to a store. Decorators hold one of these, never the records.
pub type StoreRef = Arc<dyn Store>;

/// The Store trait: async interface for record collections.
///
/// # Design Notes
///
/// - **Upsert**: `put` replaces any record with the same id and assigns an id
///   to records that have none.
/// - **Notifications**: `put` and `remove` notify listeners before returning.
/// - **Natural order**: `select` delivers records in the store's own order
///   (insertion order for concrete stores) and then calls `eof` once.
/// - **No serialization**: concurrent operations may interleave at await points.
#[async_trait]
pub trait Store: Send + Sync {
    /// Insert or replace a record, returning it as stored.
    async fn put(&self, record: Record) -> Result<Record>;

    /// Remove a record by id, returning the removed record.
    ///
    /// Fails with [`StoreError::NotFound`] if no such record exists.
    async fn remove(&self, id: &RecordId) -> Result<Record>;

    /// Look up a record by id.
    ///
    /// Fails with [`StoreError::NotFound`] if no such record exists.
    async fn find(&self, id: &RecordId) -> Result<Record>;

    /// Push every record into `sink`, then call `sink.eof()` once.
    ///
    /// A sink error aborts the select and is returned; records already
    /// delivered are not rolled back.
    async fn select(&self, sink: &mut dyn Sink) -> Result<()>;

    /// Register a listener for `topic` (or all topics with `None`).
    fn subscribe(&self, topic: Option<Topic>, listener: Listener) -> SubscriptionId;

    /// Remove a subscription. Returns false if it was not registered here.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;

    /// If this store is a filtered view, its parent and predicate.
    ///
    /// Used so that filtering a filtered view ANDs the predicates instead of
    /// stacking another layer.
    fn as_filtered(&self) -> Option<(&StoreRef, &Predicate)> {
        None
    }
}

/// Extension methods for shared store handles.
pub trait StoreExt {
    /// Select into an owned sink and hand it back once `eof` has been delivered.
    fn select_into<S: Sink>(
        &self,
        sink: S,
    ) -> impl std::future::Future<Output = Result<S>> + Send;

    /// Put `record`, then hand the stored record to `sink` and return the sink.
    /// `eof` is not delivered.
    fn put_into<S: Sink>(
        &self,
        record: Record,
        sink: S,
    ) -> impl std::future::Future<Output = Result<S>> + Send;

    /// Select into a fresh [`ArraySink`].
    fn select_all(&self) -> impl std::future::Future<Output = Result<ArraySink>> + Send;

    /// Count the records a select would deliver.
    fn count(&self) -> impl std::future::Future<Output = Result<usize>> + Send;

    /// Remove the record with the same id as `record`.
    fn remove_record(
        &self,
        record: &Record,
    ) -> impl std::future::Future<Output = Result<Record>> + Send;

    /// Mirror every future put/remove into a shared sink.
    fn listen<S: Sink + 'static>(&self, sink: &SharedSink<S>) -> SubscriptionId;

    /// View that only delivers records matching `predicate`.
    fn filter(&self, predicate: Predicate) -> StoreRef;

    /// View that delivers records sorted by `comparator`.
    fn order_by(&self, comparator: Comparator) -> StoreRef;

    /// View that delivers at most `n` records.
    fn limit(&self, n: usize) -> StoreRef;

    /// View that drops the first `n` records.
    fn skip(&self, n: usize) -> StoreRef;
}

impl StoreExt for StoreRef {
    async fn select_into<S: Sink>(&self, mut sink: S) -> Result<S> {
        self.select(&mut sink).await?;
        Ok(sink)
    }

    async fn put_into<S: Sink>(&self, record: Record, mut sink: S) -> Result<S> {
        let stored = self.put(record).await?;
        sink.put(&stored)?;
        Ok(sink)
    }

    async fn select_all(&self) -> Result<ArraySink> {
        self.select_into(ArraySink::new()).await
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.select_into(CountSink::new()).await?.value())
    }

    async fn remove_record(&self, record: &Record) -> Result<Record> {
        let id = record
            .try_id()?
            .ok_or(StoreError::MissingId)?;
        self.remove(&id).await
    }

    fn listen<S: Sink + 'static>(&self, sink: &SharedSink<S>) -> SubscriptionId {
        self.subscribe(None, sink.listener())
    }

    fn filter(&self, predicate: Predicate) -> StoreRef {
        match self.as_filtered() {
            Some((parent, existing)) => Arc::new(FilteredStore::new(
                Arc::clone(parent),
                existing.clone().and(predicate),
            )),
            None => Arc::new(FilteredStore::new(Arc::clone(self), predicate)),
        }
    }

    fn order_by(&self, comparator: Comparator) -> StoreRef {
        Arc::new(OrderedStore::new(Arc::clone(self), comparator))
    }

    fn limit(&self, n: usize) -> StoreRef {
        Arc::new(LimitedStore::new(Arc::clone(self), n))
    }

    fn skip(&self, n: usize) -> StoreRef {
        Arc::new(SkipStore::new(Arc::clone(self), n))
    }
}
