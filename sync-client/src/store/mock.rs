//! Mock record store for testing.
//!
//! Keeps records in memory, logs every call, can fail the next call of a
//! kind, and can hold calls at a gate so tests decide when each one returns.

use super::{apply_save, RecordStore, StoreError};
use async_trait::async_trait;
use itemsync_types::{Record, RecordId, SavePolicy};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

/// A call observed by [`MockRecordStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    /// `save()` for a record.
    Save {
        /// Saved record.
        id: RecordId,
        /// Requested policy.
        policy: SavePolicy,
    },
    /// `fetch()` for a record.
    Fetch(RecordId),
    /// `delete()` for a record.
    Delete(RecordId),
}

/// Mock record store for testing.
///
/// Clones share state, so a test keeps one handle while the item owns another.
#[derive(Debug, Default)]
pub struct MockRecordStore {
    inner: Arc<Mutex<MockRecordStoreInner>>,
}

#[derive(Debug, Default)]
struct MockRecordStoreInner {
    records: HashMap<RecordId, Record>,
    calls: Vec<StoreCall>,
    fail_next_save: Option<String>,
    fail_next_fetch: Option<String>,
    fail_next_delete: Option<String>,
    gate: Option<Arc<Semaphore>>,
    in_flight: usize,
    max_in_flight: usize,
}

impl MockRecordStore {
    /// Create a new empty mock store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a record in the store directly.
    pub fn insert(&self, record: Record) {
        let mut inner = self.inner.lock().unwrap();
        inner.records.insert(record.id, record);
    }

    /// Get the stored record for `id`.
    pub fn stored(&self, id: &RecordId) -> Option<Record> {
        let inner = self.inner.lock().unwrap();
        inner.records.get(id).cloned()
    }

    /// Get all calls made so far, in arrival order.
    pub fn calls(&self) -> Vec<StoreCall> {
        let inner = self.inner.lock().unwrap();
        inner.calls.clone()
    }

    /// Number of `save()` calls that have started.
    pub fn save_count(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        inner
            .calls
            .iter()
            .filter(|c| matches!(c, StoreCall::Save { .. }))
            .count()
    }

    /// Number of `delete()` calls that have started.
    pub fn delete_count(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        inner
            .calls
            .iter()
            .filter(|c| matches!(c, StoreCall::Delete(_)))
            .count()
    }

    /// Calls currently inside the store.
    pub fn in_flight(&self) -> usize {
        self.inner.lock().unwrap().in_flight
    }

    /// Highest number of calls ever inside the store at once.
    pub fn max_in_flight(&self) -> usize {
        self.inner.lock().unwrap().max_in_flight
    }

    /// Cause the next save() to fail with the given error.
    pub fn fail_next_save(&self, error: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_save = Some(error.to_string());
    }

    /// Cause the next fetch() to fail with the given error.
    pub fn fail_next_fetch(&self, error: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_fetch = Some(error.to_string());
    }

    /// Cause the next delete() to fail with the given error.
    pub fn fail_next_delete(&self, error: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_delete = Some(error.to_string());
    }

    /// Hold every later call at a gate until released.
    ///
    /// Held calls are already logged and counted as in flight.
    pub fn hold_requests(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.gate = Some(Arc::new(Semaphore::new(0)));
    }

    /// Let one held call (or the next call to arrive) through.
    pub fn release_one(&self) {
        let inner = self.inner.lock().unwrap();
        if let Some(gate) = &inner.gate {
            gate.add_permits(1);
        }
    }

    /// Open the gate for good and let every held call through.
    pub fn release_all(&self) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(gate) = inner.gate.take() {
            gate.close();
        }
    }

    /// Log the call and wait at the gate, if any.
    async fn enter(&self, call: StoreCall) {
        let gate = {
            let mut inner = self.inner.lock().unwrap();
            inner.calls.push(call);
            inner.in_flight += 1;
            inner.max_in_flight = inner.max_in_flight.max(inner.in_flight);
            inner.gate.clone()
        };
        if let Some(gate) = gate {
            // A closed gate means release_all(); go through either way.
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
    }
}

impl Clone for MockRecordStore {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[async_trait]
impl RecordStore for MockRecordStore {
    async fn save(&self, record: &Record, policy: SavePolicy) -> Result<Record, StoreError> {
        self.enter(StoreCall::Save {
            id: record.id,
            policy,
        })
        .await;

        let mut inner = self.inner.lock().unwrap();
        inner.in_flight -= 1;

        // Check for forced failure
        if let Some(error) = inner.fail_next_save.take() {
            return Err(StoreError::Unavailable(error));
        }

        let saved = apply_save(inner.records.get(&record.id), record, policy)?;
        inner.records.insert(saved.id, saved.clone());
        Ok(saved)
    }

    async fn fetch(&self, id: &RecordId) -> Result<Record, StoreError> {
        self.enter(StoreCall::Fetch(*id)).await;

        let mut inner = self.inner.lock().unwrap();
        inner.in_flight -= 1;

        if let Some(error) = inner.fail_next_fetch.take() {
            return Err(StoreError::Unavailable(error));
        }

        inner
            .records
            .get(id)
            .cloned()
            .ok_or(StoreError::NotFound(*id))
    }

    async fn delete(&self, id: &RecordId) -> Result<(), StoreError> {
        self.enter(StoreCall::Delete(*id)).await;

        let mut inner = self.inner.lock().unwrap();
        inner.in_flight -= 1;

        if let Some(error) = inner.fail_next_delete.take() {
            return Err(StoreError::Unavailable(error));
        }

        inner
            .records
            .remove(id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(*id))
    }
}
