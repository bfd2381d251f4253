//! Journal entries and their record layout.

use serde::{Deserialize, Serialize};

use recdao_core::{Record, RecordId};

use crate::error::{JournalError, Result};

/// One mutation captured by a journal.
///
/// Stored in the journal as `{"id": <journal id>, "record": {...}, "isRemove": bool}`.
/// The id belongs to the journal and is absent until the journal store
/// assigns one. Entries are never updated or deleted once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,

    /// Full snapshot of the affected record.
    pub record: Record,

    #[serde(default)]
    pub is_remove: bool,
}

impl JournalEntry {
    /// Entry for a record that was stored.
    pub fn put(record: Record) -> Self {
        Self {
            id: None,
            record,
            is_remove: false,
        }
    }

    /// Entry for a record that was removed.
    pub fn remove(record: Record) -> Self {
        Self {
            id: None,
            record,
            is_remove: true,
        }
    }

    /// Encode as a journal record.
    pub fn to_record(&self) -> Result<Record> {
        let value = serde_json::to_value(self).map_err(recdao_store::StoreError::from)?;
        Record::from_value(value).map_err(|e| JournalError::MalformedEntry(e.to_string()))
    }

    /// Decode a journal record.
    pub fn from_record(record: &Record) -> Result<Self> {
        serde_json::from_value(record.clone().into_value())
            .map_err(|e| JournalError::MalformedEntry(e.to_string()))
    }

    /// Id of the affected record.
    pub fn record_id(&self) -> Result<RecordId> {
        self.record
            .try_id()
            .map_err(|e| JournalError::MalformedEntry(e.to_string()))?
            .ok_or_else(|| JournalError::MalformedEntry("entry record has no id".into()))
    }
}
