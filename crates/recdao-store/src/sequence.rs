//! Monotonic id assignment for records stored without an id.

use std::sync::atomic::{AtomicU64, Ordering};

use recdao_core::RecordId;

use crate::error::{Result, StoreError};

const LAST_ID: u64 = i64::MAX as u64;

/// Hands out increasing integer ids.
///
/// Every integer id a store accepts is passed to [`IdSequence::observe`], so
/// assigned ids stay above anything callers have supplied. Once `i64::MAX`
/// has been handed out or observed the sequence is exhausted and
/// [`IdSequence::next_id`] fails instead of reusing an id.
#[derive(Debug)]
pub struct IdSequence {
    // One past the last id in use; `LAST_ID + 1` when exhausted.
    next: AtomicU64,
}

impl IdSequence {
    /// Start at 1.
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// Start at `first`. Negative starts are clamped to 0.
    pub fn starting_at(first: i64) -> Self {
        Self {
            next: AtomicU64::new(first.max(0) as u64),
        }
    }

    /// Allocate the next id.
    pub fn next_id(&self) -> Result<RecordId> {
        self.next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                (n <= LAST_ID).then_some(n + 1)
            })
            .map(|n| RecordId::Int(n as i64))
            .map_err(|_| StoreError::IdsExhausted)
    }

    /// Bump the sequence past an id that is already in use.
    pub fn observe(&self, id: &RecordId) {
        if let RecordId::Int(i) = id {
            if *i >= 0 {
                self.next.fetch_max(*i as u64 + 1, Ordering::SeqCst);
            }
        }
    }

    /// The id the next call to `next_id` would return, or `None` once the
    /// sequence is exhausted.
    pub fn peek(&self) -> Option<i64> {
        i64::try_from(self.next.load(Ordering::SeqCst)).ok()
    }
}

impl Default for IdSequence {
    fn default() -> Self {
        Self::new()
    }
}
