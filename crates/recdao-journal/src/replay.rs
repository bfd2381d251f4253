//! Rebuild a store from its journal.

use tracing::{debug, warn};

use recdao_store::{Store, StoreExt, StoreRef};

use crate::entry::JournalEntry;
use crate::error::{JournalError, Result};

/// What a replay applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayReport {
    /// Put entries applied.
    pub puts: usize,
    /// Remove entries applied.
    pub removes: usize,
    /// Remove entries whose record was already absent from the target.
    pub missing_removes: usize,
}

impl ReplayReport {
    /// Total entries read from the journal.
    pub fn entries(&self) -> usize {
        self.puts + self.removes + self.missing_removes
    }
}

/// Apply every entry of `journal`, oldest first, to `target`.
///
/// Puts are re-put and removes are re-removed; a remove of a record the
/// target does not hold is counted and skipped. The target publishes one
/// notification per applied entry.
pub async fn replay(journal: &StoreRef, target: &StoreRef) -> Result<ReplayReport> {
    let records = journal.select_all().await?.into_records();
    let mut report = ReplayReport::default();

    for record in &records {
        let entry = JournalEntry::from_record(record)?;

        if entry.is_remove {
            let id = entry.record_id()?;
            match target.remove(&id).await {
                Ok(_) => report.removes += 1,
                Err(e) if e.is_not_found() => {
                    warn!(%id, entry = ?entry.id, "replayed remove of missing record");
                    report.missing_removes += 1;
                }
                Err(e) => return Err(JournalError::Store(e)),
            }
        } else {
            target.put(entry.record).await?;
            report.puts += 1;
        }
    }

    debug!(
        puts = report.puts,
        removes = report.removes,
        missing = report.missing_removes,
        "journal replayed"
    );
    Ok(report)
}
