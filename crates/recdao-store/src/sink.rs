//! Sinks: consumers of the record sequence produced by `select`.
//!
//! A sink receives zero or more `put` calls followed by exactly one `eof`.
//! Subscription-style sinks additionally receive `remove` when they mirror
//! live mutations instead of one-shot query results.

use std::sync::{Arc, Mutex};

use recdao_core::Record;

use crate::error::{Result, StoreError};
use crate::listeners::{Listener, Notification, Topic};

/// Consumer of a record sequence.
pub trait Sink: Send {
    /// Receive one record, in final delivered order.
    fn put(&mut self, record: &Record) -> Result<()>;

    /// End of stream. Called once, after the last `put`.
    fn eof(&mut self) -> Result<()> {
        Ok(())
    }

    /// A mirrored record was removed from its store.
    fn remove(&mut self, _record: &Record) -> Result<()> {
        Ok(())
    }
}

/// Collects records into an ordered vector.
#[derive(Debug, Clone, Default)]
pub struct ArraySink {
    records: Vec<Record>,
    eof: bool,
}

impl ArraySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// The collected records.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether `eof` has been received.
    pub fn is_eof(&self) -> bool {
        self.eof
    }
}

impl Sink for ArraySink {
    fn put(&mut self, record: &Record) -> Result<()> {
        self.records.push(record.clone());
        Ok(())
    }

    fn eof(&mut self) -> Result<()> {
        self.eof = true;
        Ok(())
    }

    fn remove(&mut self, record: &Record) -> Result<()> {
        if let Some(id) = record.id() {
            self.records.retain(|r| r.id().as_ref() != Some(&id));
        }
        Ok(())
    }
}

/// Counts records without keeping them.
#[derive(Debug, Clone, Copy, Default)]
pub struct CountSink {
    value: usize,
}

impl CountSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> usize {
        self.value
    }
}

impl Sink for CountSink {
    fn put(&mut self, _record: &Record) -> Result<()> {
        self.value += 1;
        Ok(())
    }

    fn remove(&mut self, _record: &Record) -> Result<()> {
        self.value = self.value.saturating_sub(1);
        Ok(())
    }
}

/// Adapts a closure into a sink. `eof` is a no-op.
pub struct FnSink<F> {
    f: F,
}

impl<F> FnSink<F>
where
    F: FnMut(&Record) -> Result<()> + Send,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> Sink for FnSink<F>
where
    F: FnMut(&Record) -> Result<()> + Send,
{
    fn put(&mut self, record: &Record) -> Result<()> {
        (self.f)(record)
    }
}

/// A sink shared between a query and live notifications.
///
/// Cloning the handle shares the underlying sink. [`SharedSink::listener`]
/// turns the sink into a store listener that mirrors puts and removes.
pub struct SharedSink<S> {
    inner: Arc<Mutex<S>>,
}

impl<S> Clone for SharedSink<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: Sink + 'static> SharedSink<S> {
    pub fn new(sink: S) -> Self {
        Self {
            inner: Arc::new(Mutex::new(sink)),
        }
    }

    /// Run `f` with the sink locked.
    pub fn with<T>(&self, f: impl FnOnce(&mut S) -> T) -> Result<T> {
        let mut guard = self.inner.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(f(&mut guard))
    }

    /// A listener that forwards put/remove notifications into this sink.
    pub fn listener(&self) -> Listener {
        let sink = self.clone();
        Arc::new(move |n: &Notification| {
            let outcome = sink.with(|s| match n.topic {
                Topic::Put => s.put(&n.record),
                Topic::Remove => s.remove(&n.record),
            });
            if let Err(e) = outcome.and_then(|r| r) {
                tracing::warn!(subscription = %n.subscription, "listener sink failed: {}", e);
            }
        })
    }
}

impl<S: Sink + 'static> Sink for SharedSink<S> {
    fn put(&mut self, record: &Record) -> Result<()> {
        self.with(|s| s.put(record))?
    }

    fn eof(&mut self) -> Result<()> {
        self.with(|s| s.eof())?
    }

    fn remove(&mut self, record: &Record) -> Result<()> {
        self.with(|s| s.remove(record))?
    }
}
