//! SQLite implementation of the Store trait.
//!
//! The durable backend, normally used to hold journals. It uses rusqlite
//! with bundled SQLite, wrapped in async via tokio::spawn_blocking.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use recdao_core::{Record, RecordId};

use crate::error::{Result, StoreError};
use crate::listeners::{Listener, Listeners, SubscriptionId, Topic};
use crate::migration;
use crate::sequence::IdSequence;
use crate::sink::Sink;
use crate::traits::Store;

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime. Natural order is the insertion
/// sequence; an upsert keeps the original row position.
pub struct SqliteStore {
    /// The SQLite connection, protected by a mutex.
    conn: Arc<Mutex<Connection>>,
    ids: IdSequence,
    listeners: Listeners,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(mut conn: Connection) -> Result<Self> {
        migration::migrate(&mut conn)?;

        // Resume id assignment above every stored integer id
        let ids = IdSequence::new();
        {
            let mut stmt = conn.prepare("SELECT id FROM records")?;
            let keys = stmt.query_map([], |row| row.get::<_, String>(0))?;
            for key in keys {
                let id: RecordId = serde_json::from_str(&key?)?;
                ids.observe(&id);
            }
        }

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            ids,
            listeners: Listeners::new(),
        })
    }

    /// Number of stored records.
    pub async fn len(&self) -> Result<usize> {
        self.blocking(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))?;
            Ok(count as usize)
        })
        .await
    }

    /// Run a blocking operation on the connection.
    async fn blocking<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);

        tokio::task::spawn_blocking(move || {
            let mut conn = conn.lock().map_err(|_| StoreError::Poisoned)?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::Task(format!("spawn_blocking failed: {}", e)))?
    }
}

fn encode_id(id: &RecordId) -> Result<String> {
    Ok(serde_json::to_string(id)?)
}

#[async_trait]
impl Store for SqliteStore {
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

        let key = encode_id(&id)?;
        let body = serde_json::to_string(&record)?;

        self.blocking(move |conn| {
            conn.execute(
                "INSERT INTO records (id, body) VALUES (?1, ?2)
                 ON CONFLICT(id) DO UPDATE SET body = excluded.body",
                params![key, body],
            )?;
            Ok(())
        })
        .await?;

        debug!(%id, "put");
        self.listeners.notify(Topic::Put, &record);
        Ok(record)
    }

    async fn remove(&self, id: &RecordId) -> Result<Record> {
        let key = encode_id(id)?;

        let body = self
            .blocking(move |conn| {
                let tx = conn.transaction()?;
                let body: Option<String> = tx
                    .query_row(
                        "SELECT body FROM records WHERE id = ?1",
                        params![key],
                        |row| row.get(0),
                    )
                    .optional()?;
                if body.is_some() {
                    tx.execute("DELETE FROM records WHERE id = ?1", params![key])?;
                }
                tx.commit()?;
                Ok(body)
            })
            .await?
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;

        let removed: Record = serde_json::from_str(&body)?;

        debug!(%id, "remove");
        self.listeners.notify(Topic::Remove, &removed);
        Ok(removed)
    }

    async fn find(&self, id: &RecordId) -> Result<Record> {
        let key = encode_id(id)?;

        let body = self
            .blocking(move |conn| {
                conn.query_row(
                    "SELECT body FROM records WHERE id = ?1",
                    params![key],
                    |row| row.get::<_, String>(0),
                )
                .optional()
                .map_err(StoreError::from)
            })
            .await?
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;

        Ok(serde_json::from_str(&body)?)
    }

    async fn select(&self, sink: &mut dyn Sink) -> Result<()> {
        let bodies = self
            .blocking(|conn| {
                let mut stmt = conn.prepare("SELECT body FROM records ORDER BY seq")?;
                let bodies = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(bodies)
            })
            .await?;

        for body in &bodies {
            let record: Record = serde_json::from_str(body)?;
            sink.put(&record)?;
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::ArraySink;
    use serde_json::json;

    fn person(id: i64, first: &str) -> Record {
        Record::from_value(json!({"id": id, "firstName": first})).unwrap()
    }

    #[tokio::test]
    async fn test_put_and_find() {
        let store = SqliteStore::open_memory().unwrap();
        let stored = store.put(person(1, "Angus")).await.unwrap();

        let found = store.find(&RecordId::Int(1)).await.unwrap();
        assert_eq!(found, stored);
        assert_eq!(store.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_upsert_keeps_position() {
        let store = SqliteStore::open_memory().unwrap();
        store.put(person(2, "Jon")).await.unwrap();
        store.put(person(1, "Angus")).await.unwrap();
        store.put(person(2, "John Paul")).await.unwrap();

        let mut sink = ArraySink::new();
        store.select(&mut sink).await.unwrap();
        let names: Vec<_> = sink
            .records()
            .iter()
            .map(|r| r.get("firstName").cloned().unwrap())
            .collect();
        assert_eq!(names, vec![json!("John Paul"), json!("Angus")]);
        assert!(sink.is_eof());
    }

    #[tokio::test]
    async fn test_string_ids() {
        let store = SqliteStore::open_memory().unwrap();
        store
            .put(Record::new().with_id("zep").with("band", "Led Zeppelin"))
            .await
            .unwrap();

        let found = store.find(&RecordId::from("zep")).await.unwrap();
        assert_eq!(found.get("band"), Some(&json!("Led Zeppelin")));

        // The integer 1 and the string "1" are different ids
        assert!(store.find(&RecordId::from("1")).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_remove() {
        let store = SqliteStore::open_memory().unwrap();
        store.put(person(1, "Angus")).await.unwrap();

        let removed = store.remove(&RecordId::Int(1)).await.unwrap();
        assert_eq!(removed.get("firstName"), Some(&json!("Angus")));
        assert!(store.remove(&RecordId::Int(1)).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_reopen_resumes_id_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.put(person(41, "Cliff")).await.unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.len().await.unwrap(), 1);
        let assigned = store.put(Record::new().with("firstName", "Kirk")).await.unwrap();
        assert_eq!(assigned.id(), Some(RecordId::Int(42)));
    }
}
