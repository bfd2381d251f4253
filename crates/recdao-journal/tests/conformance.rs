//! A journaled store must behave exactly like its delegate.

use std::sync::Arc;

use recdao_journal::{JournalConfig, JournalStore};
use recdao_store::{MemoryStore, SqliteStore, StoreRef};
use recdao_testkit::conformance::run_all;

#[tokio::test]
async fn test_background_journal_conforms() {
    run_all(|| {
        Arc::new(JournalStore::new(
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryStore::new()),
        )) as StoreRef
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_inline_journal_conforms() {
    run_all(|| {
        Arc::new(JournalStore::with_config(
            Arc::new(MemoryStore::new()),
            Arc::new(SqliteStore::open_memory().unwrap()),
            JournalConfig::inline(),
        )) as StoreRef
    })
    .await
    .unwrap();
}
