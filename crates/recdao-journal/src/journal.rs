//! Journal decorator: records every successful mutation in a journal store.
//!
//! The primary result always comes from the delegate. Journal writes are
//! best effort: there is no atomicity between the delegate write and its
//! entry, and a failed append is logged and counted, never returned.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use recdao_core::{Record, RecordId};
use recdao_store::{
    Listener, ProxyStore, Result as StoreResult, Sink, Store, StoreRef, SubscriptionId, Topic,
};

use crate::config::{AppendMode, JournalConfig};
use crate::entry::JournalEntry;
use crate::error::{JournalError, Result};
use crate::replay::{replay, ReplayReport};

/// Append outcome counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JournalStats {
    /// Entries the journal store accepted.
    pub appended: u64,
    /// Entries that could not be written.
    pub failed: u64,
}

#[derive(Default)]
struct Counters {
    appended: AtomicU64,
    failed: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> JournalStats {
        JournalStats {
            appended: self.appended.load(Ordering::SeqCst),
            failed: self.failed.load(Ordering::SeqCst),
        }
    }
}

enum Command {
    Append(JournalEntry),
    Flush(oneshot::Sender<()>),
}

/// A store that journals each successful `put` and `remove` of its delegate.
pub struct JournalStore {
    proxy: ProxyStore,
    journal: StoreRef,
    mode: AppendMode,
    sender: Option<mpsc::Sender<Command>>,
    counters: Arc<Counters>,
}

impl JournalStore {
    /// Wrap `delegate`, journaling into `journal` with the default config.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime, since the background
    /// writer is spawned here.
    pub fn new(delegate: StoreRef, journal: StoreRef) -> Self {
        Self::with_config(delegate, journal, JournalConfig::default())
    }

    /// Wrap `delegate` with an explicit config.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime with
    /// [`AppendMode::Background`].
    pub fn with_config(delegate: StoreRef, journal: StoreRef, config: JournalConfig) -> Self {
        let counters = Arc::new(Counters::default());

        let sender = match config.append_mode {
            AppendMode::Background => {
                let (tx, rx) = mpsc::channel(config.channel_capacity.max(1));
                tokio::spawn(run_writer(
                    Arc::clone(&journal),
                    rx,
                    Arc::clone(&counters),
                ));
                Some(tx)
            }
            AppendMode::Inline => None,
        };

        Self {
            proxy: ProxyStore::new(delegate),
            journal,
            mode: config.append_mode,
            sender,
            counters,
        }
    }

    /// Replay `journal` into `delegate`, then wrap it.
    ///
    /// Replayed mutations are applied to the delegate directly, so they are
    /// not journaled a second time.
    pub async fn recover(
        delegate: StoreRef,
        journal: StoreRef,
        config: JournalConfig,
    ) -> Result<(Self, ReplayReport)> {
        let report = replay(&journal, &delegate).await?;
        Ok((Self::with_config(delegate, journal, config), report))
    }

    /// The store receiving the primary writes.
    pub fn delegate(&self) -> &StoreRef {
        self.proxy.delegate()
    }

    /// The store receiving journal entries.
    pub fn journal(&self) -> &StoreRef {
        &self.journal
    }

    /// Whether appends are queued for the writer task or awaited inline.
    pub fn append_mode(&self) -> AppendMode {
        self.mode
    }

    /// Current append counters.
    pub fn stats(&self) -> JournalStats {
        self.counters.snapshot()
    }

    /// Wait until every entry queued so far has been attempted.
    ///
    /// Returns immediately in inline mode.
    pub async fn flush(&self) -> Result<()> {
        let Some(sender) = &self.sender else {
            return Ok(());
        };

        let (tx, rx) = oneshot::channel();
        sender
            .send(Command::Flush(tx))
            .await
            .map_err(|_| JournalError::WriterClosed)?;
        rx.await.map_err(|_| JournalError::WriterClosed)
    }

    async fn record(&self, entry: JournalEntry) {
        match &self.sender {
            None => append(&self.journal, entry, &self.counters).await,
            Some(sender) => {
                if sender.send(Command::Append(entry)).await.is_err() {
                    warn!("journal writer closed, entry dropped");
                    self.counters.failed.fetch_add(1, Ordering::SeqCst);
                }
            }
        }
    }
}

/// Background writer: appends queued entries one at a time, in queue order.
async fn run_writer(journal: StoreRef, mut rx: mpsc::Receiver<Command>, counters: Arc<Counters>) {
    while let Some(command) = rx.recv().await {
        match command {
            Command::Append(entry) => append(&journal, entry, &counters).await,
            Command::Flush(done) => {
                // The flusher may have given up waiting
                let _ = done.send(());
            }
        }
    }
    debug!("journal writer stopped");
}

async fn append(journal: &StoreRef, entry: JournalEntry, counters: &Counters) {
    let outcome = match entry.to_record() {
        Ok(record) => journal.put(record).await.map_err(JournalError::from),
        Err(e) => Err(e),
    };

    match outcome {
        Ok(stored) => {
            counters.appended.fetch_add(1, Ordering::SeqCst);
            debug!(entry = ?stored.id(), is_remove = entry.is_remove, "journaled");
        }
        Err(e) => {
            counters.failed.fetch_add(1, Ordering::SeqCst);
            warn!(record = ?entry.record.id(), "journal append failed: {}", e);
        }
    }
}

#[async_trait]
impl Store for JournalStore {
    async fn put(&self, record: Record) -> StoreResult<Record> {
        let stored = self.proxy.put(record).await?;
        self.record(JournalEntry::put(stored.clone())).await;
        Ok(stored)
    }

    async fn remove(&self, id: &RecordId) -> StoreResult<Record> {
        let removed = self.proxy.remove(id).await?;
        self.record(JournalEntry::remove(removed.clone())).await;
        Ok(removed)
    }

    async fn find(&self, id: &RecordId) -> StoreResult<Record> {
        self.proxy.find(id).await
    }

    async fn select(&self, sink: &mut dyn Sink) -> StoreResult<()> {
        self.proxy.select(sink).await
    }

    fn subscribe(&self, topic: Option<Topic>, listener: Listener) -> SubscriptionId {
        self.proxy.subscribe(topic, listener)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.proxy.unsubscribe(id)
    }
}
