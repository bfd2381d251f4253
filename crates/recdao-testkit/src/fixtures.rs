//! Test fixtures and helpers.
//!
//! The "band" data set used across the workspace tests, plus a listener
//! that records every notification it sees.

use std::sync::{Arc, Mutex};

use recdao_core::Record;
use recdao_store::{Listener, Notification, Result, StoreRef};

/// Person 1: alive, sorts last by last name and first by first name.
pub fn angus() -> Record {
    person(1, "Angus", "Young", false)
}

/// Person 2: deceased.
pub fn jon() -> Record {
    person(2, "Jon", "Bonham", true)
}

/// Build a person record.
pub fn person(id: i64, first_name: &str, last_name: &str, deceased: bool) -> Record {
    Record::new()
        .with_id(id)
        .with("firstName", first_name)
        .with("lastName", last_name)
        .with("deceased", deceased)
}

/// Both fixture people, in insertion order.
pub fn band() -> Vec<Record> {
    vec![angus(), jon()]
}

/// A larger band for ordering and pagination tests.
///
/// Two people share the last name "Young" so stable ordering is observable.
pub fn full_band() -> Vec<Record> {
    vec![
        angus(),
        jon(),
        person(3, "Bon", "Scott", true),
        person(4, "Malcolm", "Young", true),
    ]
}

/// Put every record into `store`, in order.
pub async fn seed(store: &StoreRef, records: impl IntoIterator<Item = Record>) -> Result<()> {
    for record in records {
        store.put(record).await?;
    }
    Ok(())
}

/// Read a string field, or "" when absent.
pub fn field_str<'a>(record: &'a Record, field: &str) -> &'a str {
    record.get(field).and_then(|v| v.as_str()).unwrap_or("")
}

/// Read the given string field from each record.
pub fn names(records: &[Record], field: &str) -> Vec<String> {
    records
        .iter()
        .map(|r| field_str(r, field).to_string())
        .collect()
}

/// Records every notification delivered to its listener.
#[derive(Clone, Default)]
pub struct Recorder {
    seen: Arc<Mutex<Vec<Notification>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A listener that appends to this recorder.
    pub fn listener(&self) -> Listener {
        let seen = Arc::clone(&self.seen);
        Arc::new(move |n: &Notification| {
            if let Ok(mut seen) = seen.lock() {
                seen.push(n.clone());
            }
        })
    }

    /// Snapshot of the notifications seen so far.
    pub fn notifications(&self) -> Vec<Notification> {
        self.seen.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.notifications().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A person without an id, for exercising id assignment.
pub fn anonymous(first_name: &str) -> Record {
    Record::new().with("firstName", first_name)
}
