use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use tracing::debug;

use crate::core::{DisabilityEntry, EntryDraft, EntryId};

/// Caller-side list of disability entries, kept apart from the calculator so
/// the calculator only ever sees a plain slice.
pub trait EntryStore: Send + Sync {
    /// Entries in insertion order.
    fn list(&self) -> Result<Vec<DisabilityEntry>, StoreError>;
    fn add(&self, draft: EntryDraft) -> Result<DisabilityEntry, StoreError>;
    fn remove(&self, id: EntryId) -> Result<DisabilityEntry, StoreError>;
    fn clear(&self) -> Result<(), StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("entry {0} not found")]
    NotFound(EntryId),
    #[error("entry store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug)]
pub struct InMemoryEntryStore {
    entries: Mutex<Vec<DisabilityEntry>>,
    next_id: AtomicU64,
}

impl Default for InMemoryEntryStore {
    fn default() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }
}

impl InMemoryEntryStore {
    fn guard(&self) -> Result<MutexGuard<'_, Vec<DisabilityEntry>>, StoreError> {
        self.entries
            .lock()
            .map_err(|_| StoreError::Unavailable("entry mutex poisoned".to_string()))
    }
}

impl EntryStore for InMemoryEntryStore {
    fn list(&self) -> Result<Vec<DisabilityEntry>, StoreError> {
        Ok(self.guard()?.clone())
    }

    fn add(&self, draft: EntryDraft) -> Result<DisabilityEntry, StoreError> {
        let id = EntryId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let entry = DisabilityEntry::new(id, draft.percentage, draft.prior_condition);
        self.guard()?.push(entry.clone());
        debug!(%id, percentage = entry.percentage, prior = entry.prior_condition, "entry added");
        Ok(entry)
    }

    fn remove(&self, id: EntryId) -> Result<DisabilityEntry, StoreError> {
        let mut guard = self.guard()?;
        let index = guard
            .iter()
            .position(|entry| entry.id == id)
            .ok_or(StoreError::NotFound(id))?;
        let removed = guard.remove(index);
        debug!(%id, "entry removed");
        Ok(removed)
    }

    fn clear(&self) -> Result<(), StoreError> {
        let mut guard = self.guard()?;
        let count = guard.len();
        guard.clear();
        debug!(count, "entries cleared");
        Ok(())
    }
}
