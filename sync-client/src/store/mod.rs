//! Remote record store abstraction.
//!
//! An item mirrors one record held by a remote store. The store is reached
//! only through [`RecordStore`], so it can be a directory on disk, a mock for
//! tests, or a real service.
//!
//! # Design
//!
//! - `save()` returns the canonical post-save record, carrying a fresh change tag
//! - `fetch()` returns the current record
//! - `delete()` removes the record by identity
//!
//! # Example
//!
//! ```ignore
//! let store = MockRecordStore::new();
//! let saved = store.save(&record, SavePolicy::IfServerRecordUnchanged).await?;
//! assert!(saved.is_saved());
//! ```

mod dir;
mod mock;

pub use dir::DirRecordStore;
pub use mock::{MockRecordStore, StoreCall};

use async_trait::async_trait;
use itemsync_types::{ChangeTag, Record, RecordId, SavePolicy};
use thiserror::Error;

/// Record store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No record with this id.
    #[error("record {0} not found")]
    NotFound(RecordId),

    /// The stored record changed since the caller's snapshot.
    #[error("record {id} changed on server (expected tag {expected:?}, found {actual:?})")]
    Conflict {
        /// Record that was saved.
        id: RecordId,
        /// Tag the caller's snapshot carried.
        expected: Option<ChangeTag>,
        /// Tag the store holds.
        actual: Option<ChangeTag>,
    },

    /// The store could not be reached.
    #[error("record store unavailable: {0}")]
    Unavailable(String),

    /// A stored record could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Storage I/O failed.
    #[error("record store I/O error: {0}")]
    Io(String),
}

/// Remote record store.
///
/// Implementations handle the underlying storage (directory, service, mock).
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Save `record` under `policy` and return the stored record.
    async fn save(&self, record: &Record, policy: SavePolicy) -> Result<Record, StoreError>;

    /// Fetch the current record for `id`.
    async fn fetch(&self, id: &RecordId) -> Result<Record, StoreError>;

    /// Delete the record for `id`.
    async fn delete(&self, id: &RecordId) -> Result<(), StoreError>;
}

/// Apply a save to the currently stored record.
///
/// Shared by every store in this crate so they agree on policy semantics:
/// - `IfServerRecordUnchanged`: the caller's tag must match the stored tag
///   (both absent for a first save)
/// - `ChangedKeys`: the caller's data and checksum overwrite the stored ones,
///   whatever the stored tag is
///
/// The returned record carries the next change tag.
pub(crate) fn apply_save(
    existing: Option<&Record>,
    record: &Record,
    policy: SavePolicy,
) -> Result<Record, StoreError> {
    let stored_tag = existing.and_then(|r| r.change_tag);

    let mut saved = match policy {
        SavePolicy::IfServerRecordUnchanged => {
            if existing.is_none() && record.change_tag.is_some() {
                return Err(StoreError::NotFound(record.id));
            }
            if record.change_tag != stored_tag {
                return Err(StoreError::Conflict {
                    id: record.id,
                    expected: record.change_tag,
                    actual: stored_tag,
                });
            }
            record.clone()
        }
        SavePolicy::ChangedKeys => {
            let mut merged = existing.cloned().unwrap_or_else(|| Record::new(record.id));
            if record.data.is_some() {
                merged.data = record.data.clone();
            }
            if record.checksum.is_some() {
                merged.checksum = record.checksum;
            }
            merged
        }
    };

    saved.change_tag = Some(stored_tag.map_or_else(ChangeTag::first, |tag| tag.next()));
    Ok(saved)
}
