//! Database: a registry of named record collections.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use recdao_journal::{JournalConfig, JournalStore, ReplayReport};
use recdao_store::{MemoryStore, SqliteStore, StoreError, StoreRef};

use crate::error::{DatabaseError, Result};

/// File suffix of a collection's journal inside the journal directory.
pub const JOURNAL_SUFFIX: &str = ".journal.db";

/// Configuration for a Database.
#[derive(Debug, Clone, Default)]
pub struct DatabaseConfig {
    /// Directory for per-collection journals. `None` keeps collections in
    /// memory only.
    pub journal_dir: Option<PathBuf>,
    /// How journaled collections write their entries.
    pub journal: JournalConfig,
}

impl DatabaseConfig {
    /// Journal every collection under `dir`.
    pub fn journaled(dir: impl Into<PathBuf>) -> Self {
        Self {
            journal_dir: Some(dir.into()),
            ..Self::default()
        }
    }
}

/// A named collection and its store.
#[derive(Clone)]
pub struct Collection {
    name: String,
    store: StoreRef,
    journal: Option<Arc<JournalStore>>,
    recovered: ReplayReport,
}

impl Collection {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The collection's store. Journaled collections return the journal
    /// decorator, so every write through it is recorded.
    pub fn store(&self) -> &StoreRef {
        &self.store
    }

    /// The journal decorator, if the collection is journaled.
    pub fn journal(&self) -> Option<&Arc<JournalStore>> {
        self.journal.as_ref()
    }

    /// What was replayed when the collection was opened.
    pub fn recovered(&self) -> ReplayReport {
        self.recovered
    }

    /// Wait for queued journal entries to be written.
    pub async fn flush(&self) -> Result<()> {
        if let Some(journal) = &self.journal {
            journal.flush().await?;
        }
        Ok(())
    }
}

/// A registry of named collections.
///
/// Collections are opened on first use and shared afterwards: every call to
/// [`Database::collection`] with the same name returns the same store.
pub struct Database {
    config: DatabaseConfig,
    collections: Mutex<HashMap<String, Collection>>,
}

impl Database {
    /// Create a database.
    pub fn new(config: DatabaseConfig) -> Self {
        Self {
            config,
            collections: Mutex::new(HashMap::new()),
        }
    }

    /// A database whose collections live in memory only.
    pub fn in_memory() -> Self {
        Self::new(DatabaseConfig::default())
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// Get a collection, opening it on first use.
    pub async fn collection(&self, name: &str) -> Result<Collection> {
        validate_name(name)?;

        // Held across the open so a journal is never replayed twice
        let mut collections = self.collections.lock().await;
        if let Some(collection) = collections.get(name) {
            return Ok(collection.clone());
        }

        let collection = self.open_collection(name).await?;
        collections.insert(name.to_string(), collection.clone());
        Ok(collection)
    }

    /// Names of the collections opened so far, sorted.
    pub async fn collection_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.collections.lock().await.keys().cloned().collect();
        names.sort();
        names
    }

    /// Flush every journaled collection.
    pub async fn flush(&self) -> Result<()> {
        let collections: Vec<Collection> =
            self.collections.lock().await.values().cloned().collect();
        for collection in &collections {
            collection.flush().await?;
        }
        Ok(())
    }

    /// Path of the journal for `name`, if journaling is configured.
    pub fn journal_path(&self, name: &str) -> Option<PathBuf> {
        self.config
            .journal_dir
            .as_deref()
            .map(|dir| journal_file(dir, name))
    }

    async fn open_collection(&self, name: &str) -> Result<Collection> {
        let primary: StoreRef = Arc::new(MemoryStore::new());

        let Some(dir) = &self.config.journal_dir else {
            debug!(collection = name, "opened in-memory collection");
            return Ok(Collection {
                name: name.to_string(),
                store: primary,
                journal: None,
                recovered: ReplayReport::default(),
            });
        };

        // Directory creation, migrations and the id scan all block
        let path = journal_file(dir, name);
        let (dir, file) = (dir.clone(), path.clone());
        let journal = tokio::task::spawn_blocking(move || -> Result<SqliteStore> {
            std::fs::create_dir_all(&dir)?;
            Ok(SqliteStore::open(&file)?)
        })
        .await
        .map_err(|e| StoreError::Task(format!("spawn_blocking failed: {}", e)))??;
        let journal: StoreRef = Arc::new(journal);

        let (store, recovered) =
            JournalStore::recover(primary, journal, self.config.journal.clone()).await?;
        let store = Arc::new(store);

        info!(
            collection = name,
            path = %path.display(),
            entries = recovered.entries(),
            "opened journaled collection"
        );

        Ok(Collection {
            name: name.to_string(),
            store: Arc::clone(&store) as StoreRef,
            journal: Some(store),
            recovered,
        })
    }
}

fn journal_file(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{}{}", name, JOURNAL_SUFFIX))
}

fn validate_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(DatabaseError::InvalidName(name.to_string()))
    }
}
