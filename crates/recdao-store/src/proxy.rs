//! Delegating store: forwards every operation to an inner store.
//!
//! Decorators embed a `ProxyStore` and route the operations they do not
//! change through it, so pass-through behavior (results, errors and
//! notification timing) is identical everywhere.

use async_trait::async_trait;

use recdao_core::{Record, RecordId};

use crate::error::Result;
use crate::listeners::{Listener, SubscriptionId, Topic};
use crate::sink::Sink;
use crate::traits::{Store, StoreRef};

/// A store that forwards everything to its delegate.
#[derive(Clone)]
pub struct ProxyStore {
    delegate: StoreRef,
}

impl ProxyStore {
    pub fn new(delegate: StoreRef) -> Self {
        Self { delegate }
    }

    /// The wrapped store.
    pub fn delegate(&self) -> &StoreRef {
        &self.delegate
    }
}

#[async_trait]
impl Store for ProxyStore {
    async fn put(&self, record: Record) -> Result<Record> {
        self.delegate.put(record).await
    }

    async fn remove(&self, id: &RecordId) -> Result<Record> {
        self.delegate.remove(id).await
    }

    async fn find(&self, id: &RecordId) -> Result<Record> {
        self.delegate.find(id).await
    }

    async fn select(&self, sink: &mut dyn Sink) -> Result<()> {
        self.delegate.select(sink).await
    }

    fn subscribe(&self, topic: Option<Topic>, listener: Listener) -> SubscriptionId {
        self.delegate.subscribe(topic, listener)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.delegate.unsubscribe(id)
    }
}
