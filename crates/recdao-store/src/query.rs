//! Query views: lazy decorators that reshape `select`.
//!
//! Each view holds a parent store and one query parameter. Mutations and
//! lookups pass straight through to the parent; only `select` changes, by
//! wrapping the caller's sink in an adapter before driving the parent.
//!
//! Views nest left to right: in `store.filter(p).order_by(c).limit(n).skip(m)`
//! records flow base -> filter -> order -> limit -> skip -> caller's sink.

use async_trait::async_trait;

use recdao_core::{Comparator, Predicate, Record, RecordId};

use crate::error::Result;
use crate::listeners::{Listener, SubscriptionId, Topic};
use crate::proxy::ProxyStore;
use crate::sink::{ArraySink, Sink};
use crate::traits::{Store, StoreRef};

// ─────────────────────────────────────────────────────────────────────────────
// Sink adapters
// ─────────────────────────────────────────────────────────────────────────────

/// Forwards only records matching the predicate.
struct FilterSink<'a, S: ?Sized> {
    predicate: &'a Predicate,
    inner: &'a mut S,
}

impl<S: Sink + ?Sized> Sink for FilterSink<'_, S> {
    fn put(&mut self, record: &Record) -> Result<()> {
        if self.predicate.matches(record) {
            self.inner.put(record)?;
        }
        Ok(())
    }

    fn eof(&mut self) -> Result<()> {
        self.inner.eof()
    }

    fn remove(&mut self, record: &Record) -> Result<()> {
        if self.predicate.matches(record) {
            self.inner.remove(record)?;
        }
        Ok(())
    }
}

/// Forwards the first `remaining` records.
struct LimitSink<'a, S: ?Sized> {
    remaining: usize,
    inner: &'a mut S,
}

impl<S: Sink + ?Sized> Sink for LimitSink<'_, S> {
    fn put(&mut self, record: &Record) -> Result<()> {
        if self.remaining > 0 {
            self.remaining -= 1;
            self.inner.put(record)?;
        }
        Ok(())
    }

    fn eof(&mut self) -> Result<()> {
        self.inner.eof()
    }

    fn remove(&mut self, record: &Record) -> Result<()> {
        self.inner.remove(record)
    }
}

/// Drops the first `to_skip` records.
struct SkipSink<'a, S: ?Sized> {
    to_skip: usize,
    inner: &'a mut S,
}

impl<S: Sink + ?Sized> Sink for SkipSink<'_, S> {
    fn put(&mut self, record: &Record) -> Result<()> {
        if self.to_skip > 0 {
            self.to_skip -= 1;
            return Ok(());
        }
        self.inner.put(record)
    }

    fn eof(&mut self) -> Result<()> {
        self.inner.eof()
    }

    fn remove(&mut self, record: &Record) -> Result<()> {
        self.inner.remove(record)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Views
// ─────────────────────────────────────────────────────────────────────────────

/// Filtered view (`where`).
pub struct FilteredStore {
    proxy: ProxyStore,
    predicate: Predicate,
}

impl FilteredStore {
    pub fn new(parent: StoreRef, predicate: Predicate) -> Self {
        Self {
            proxy: ProxyStore::new(parent),
            predicate,
        }
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }
}

#[async_trait]
impl Store for FilteredStore {
    async fn put(&self, record: Record) -> Result<Record> {
        self.proxy.put(record).await
    }

    async fn remove(&self, id: &RecordId) -> Result<Record> {
        self.proxy.remove(id).await
    }

    async fn find(&self, id: &RecordId) -> Result<Record> {
        self.proxy.find(id).await
    }

    async fn select(&self, sink: &mut dyn Sink) -> Result<()> {
        let mut filtered = FilterSink {
            predicate: &self.predicate,
            inner: sink,
        };
        self.proxy.select(&mut filtered).await
    }

    fn subscribe(&self, topic: Option<Topic>, listener: Listener) -> SubscriptionId {
        self.proxy.subscribe(topic, listener)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.proxy.unsubscribe(id)
    }

    fn as_filtered(&self) -> Option<(&StoreRef, &Predicate)> {
        Some((self.proxy.delegate(), &self.predicate))
    }
}

/// Sorted view (`orderBy`).
///
/// Buffers the parent's full result, stable-sorts it, then replays it.
pub struct OrderedStore {
    proxy: ProxyStore,
    comparator: Comparator,
}

impl OrderedStore {
    pub fn new(parent: StoreRef, comparator: Comparator) -> Self {
        Self {
            proxy: ProxyStore::new(parent),
            comparator,
        }
    }

    pub fn comparator(&self) -> &Comparator {
        &self.comparator
    }
}

#[async_trait]
impl Store for OrderedStore {
    async fn put(&self, record: Record) -> Result<Record> {
        self.proxy.put(record).await
    }

    async fn remove(&self, id: &RecordId) -> Result<Record> {
        self.proxy.remove(id).await
    }

    async fn find(&self, id: &RecordId) -> Result<Record> {
        self.proxy.find(id).await
    }

    async fn select(&self, sink: &mut dyn Sink) -> Result<()> {
        let mut buffer = ArraySink::new();
        self.proxy.select(&mut buffer).await?;

        let mut records = buffer.into_records();
        self.comparator.sort(&mut records);

        for record in &records {
            sink.put(record)?;
        }
        sink.eof()
    }

    fn subscribe(&self, topic: Option<Topic>, listener: Listener) -> SubscriptionId {
        self.proxy.subscribe(topic, listener)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.proxy.unsubscribe(id)
    }
}

/// Pagination view: at most `limit` records.
pub struct LimitedStore {
    proxy: ProxyStore,
    limit: usize,
}

impl LimitedStore {
    pub fn new(parent: StoreRef, limit: usize) -> Self {
        Self {
            proxy: ProxyStore::new(parent),
            limit,
        }
    }
}

#[async_trait]
impl Store for LimitedStore {
    async fn put(&self, record: Record) -> Result<Record> {
        self.proxy.put(record).await
    }

    async fn remove(&self, id: &RecordId) -> Result<Record> {
        self.proxy.remove(id).await
    }

    async fn find(&self, id: &RecordId) -> Result<Record> {
        self.proxy.find(id).await
    }

    async fn select(&self, sink: &mut dyn Sink) -> Result<()> {
        let mut limited = LimitSink {
            remaining: self.limit,
            inner: sink,
        };
        self.proxy.select(&mut limited).await
    }

    fn subscribe(&self, topic: Option<Topic>, listener: Listener) -> SubscriptionId {
        self.proxy.subscribe(topic, listener)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.proxy.unsubscribe(id)
    }
}

/// Pagination view: drops the first `skip` records.
pub struct SkipStore {
    proxy: ProxyStore,
    skip: usize,
}

impl SkipStore {
    pub fn new(parent: StoreRef, skip: usize) -> Self {
        Self {
            proxy: ProxyStore::new(parent),
            skip,
        }
    }
}

#[async_trait]
impl Store for SkipStore {
    async fn put(&self, record: Record) -> Result<Record> {
        self.proxy.put(record).await
    }

    async fn remove(&self, id: &RecordId) -> Result<Record> {
        self.proxy.remove(id).await
    }

    async fn find(&self, id: &RecordId) -> Result<Record> {
        self.proxy.find(id).await
    }

    async fn select(&self, sink: &mut dyn Sink) -> Result<()> {
        let mut skipping = SkipSink {
            to_skip: self.skip,
            inner: sink,
        };
        self.proxy.select(&mut skipping).await
    }

    fn subscribe(&self, topic: Option<Topic>, listener: Listener) -> SubscriptionId {
        self.proxy.subscribe(topic, listener)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.proxy.unsubscribe(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::memory::MemoryStore;
    use crate::sink::FnSink;
    use crate::traits::StoreExt;
    use serde_json::json;
    use std::sync::Arc;

    async fn band() -> StoreRef {
        let store: StoreRef = Arc::new(MemoryStore::new());
        for value in [
            json!({"id": 1, "firstName": "Angus", "lastName": "Young", "deceased": false}),
            json!({"id": 2, "firstName": "Jon", "lastName": "Bonham", "deceased": true}),
            json!({"id": 3, "firstName": "Bon", "lastName": "Scott", "deceased": true}),
            json!({"id": 4, "firstName": "Malcolm", "lastName": "Young", "deceased": true}),
        ] {
            store.put(Record::from_value(value).unwrap()).await.unwrap();
        }
        store
    }

    async fn ids(store: &StoreRef) -> Vec<i64> {
        store
            .select_all()
            .await
            .unwrap()
            .records()
            .iter()
            .filter_map(|r| r.id().and_then(|id| id.as_int()))
            .collect()
    }

    #[tokio::test]
    async fn test_filter() {
        let store = band().await;
        let dead = store.filter(Predicate::neq("deceased", false));
        assert_eq!(ids(&dead).await, vec![2, 3, 4]);
    }

    #[tokio::test]
    async fn test_filter_twice_ands_into_one_layer() {
        let store = band().await;
        let dead = store.filter(Predicate::eq("deceased", true));
        let dead_youngs = dead.filter(Predicate::eq("lastName", "Young"));

        assert_eq!(ids(&dead_youngs).await, vec![4]);
        let (parent, predicate) = dead_youngs.as_filtered().unwrap();
        assert!(Arc::ptr_eq(parent, &store));
        assert!(matches!(predicate, Predicate::And(terms) if terms.len() == 2));
    }

    #[tokio::test]
    async fn test_order_by_is_stable() {
        let store = band().await;
        let sorted = store.order_by(Comparator::asc("lastName"));
        // Both Youngs tie and keep insertion order
        assert_eq!(ids(&sorted).await, vec![2, 3, 1, 4]);

        let sorted = store.order_by(Comparator::desc("lastName").then_desc("firstName"));
        assert_eq!(ids(&sorted).await, vec![4, 1, 3, 2]);
    }

    #[tokio::test]
    async fn test_limit_and_skip() {
        let store = band().await;
        assert_eq!(ids(&store.limit(2)).await, vec![1, 2]);
        assert_eq!(ids(&store.skip(3)).await, vec![4]);
        assert_eq!(ids(&store.skip(1).limit(2)).await, vec![2, 3]);
        assert_eq!(ids(&store.limit(2).skip(1)).await, vec![2]);
        assert!(ids(&store.limit(0)).await.is_empty());
        assert!(ids(&store.skip(10)).await.is_empty());
    }

    #[tokio::test]
    async fn test_full_chain() {
        let store = band().await;
        let page = store
            .filter(Predicate::eq("deceased", true))
            .order_by(Comparator::asc("firstName"))
            .limit(2)
            .skip(1);
        // dead by first name: Bon(3), Jon(2), Malcolm(4); first two; drop one
        assert_eq!(ids(&page).await, vec![2]);
    }

    #[tokio::test]
    async fn test_views_pass_mutations_through() {
        let store = band().await;
        let view = store.filter(Predicate::eq("deceased", false)).limit(1);

        view.put(Record::new().with_id(9).with("deceased", false))
            .await
            .unwrap();
        assert!(store.find(&RecordId::Int(9)).await.is_ok());

        view.remove(&RecordId::Int(9)).await.unwrap();
        assert!(store.find(&RecordId::Int(9)).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_eof_delivered_once_through_views() {
        struct EofCounter(usize, usize);
        impl Sink for EofCounter {
            fn put(&mut self, _record: &Record) -> Result<()> {
                self.0 += 1;
                Ok(())
            }
            fn eof(&mut self) -> Result<()> {
                self.1 += 1;
                Ok(())
            }
        }

        let store = band().await;
        let view = store
            .filter(Predicate::True)
            .order_by(Comparator::asc("id"))
            .skip(1)
            .limit(1);
        let counter = view.select_into(EofCounter(0, 0)).await.unwrap();
        assert_eq!(counter.0, 1);
        assert_eq!(counter.1, 1);
    }

    #[tokio::test]
    async fn test_sink_error_stops_ordered_and_filtered_selects() {
        let store = band().await;
        let views = [
            (store.order_by(Comparator::desc("id")), vec![4, 3]),
            (store.filter(Predicate::neq("deceased", false)), vec![2, 3]),
        ];

        for (view, expected) in views {
            let mut seen = Vec::new();
            let result = {
                let mut sink = FnSink::new(|r: &Record| {
                    let id = r.id().and_then(|id| id.as_int()).unwrap_or_default();
                    seen.push(id);
                    if id == 3 {
                        Err(StoreError::Sink("no threes".into()))
                    } else {
                        Ok(())
                    }
                });
                view.select(&mut sink).await
            };
            assert!(matches!(result, Err(StoreError::Sink(_))));
            assert_eq!(seen, expected);
        }
    }
}
