//! Directory-backed record store.
//!
//! Each record is one JSON file named `<record id>.json`. Payloads are
//! base64 inside the JSON. Writes go through a `.part` file and a rename.

use super::{apply_save, RecordStore, StoreError};
use async_trait::async_trait;
use itemsync_types::{Record, RecordId, SavePolicy};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Record store keeping one JSON file per record in a directory.
#[derive(Debug)]
pub struct DirRecordStore {
    root: PathBuf,
    // Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl DirRecordStore {
    /// Open a store rooted at `root`. The directory is created on first save.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Directory holding the record files.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, id: &RecordId) -> PathBuf {
        self.root.join(format!("{}.json", id))
    }

    async fn load(&self, id: &RecordId) -> Result<Option<Record>, StoreError> {
        let path = self.record_path(id);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(&path, e)),
        };
        let record = serde_json::from_slice(&bytes)
            .map_err(|e| StoreError::Serialization(format!("{}: {}", path.display(), e)))?;
        Ok(Some(record))
    }

    async fn store(&self, record: &Record) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| io_error(&self.root, e))?;

        let path = self.record_path(&record.id);
        let part = path.with_extension("json.part");
        let json = serde_json::to_vec_pretty(record)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        tokio::fs::write(&part, json)
            .await
            .map_err(|e| io_error(&part, e))?;
        tokio::fs::rename(&part, &path)
            .await
            .map_err(|e| io_error(&path, e))?;
        Ok(())
    }
}

fn io_error(path: &Path, err: std::io::Error) -> StoreError {
    StoreError::Io(format!("{}: {}", path.display(), err))
}

#[async_trait]
impl RecordStore for DirRecordStore {
    async fn save(&self, record: &Record, policy: SavePolicy) -> Result<Record, StoreError> {
        let _guard = self.write_lock.lock().await;

        let existing = self.load(&record.id).await?;
        let saved = apply_save(existing.as_ref(), record, policy)?;
        self.store(&saved).await?;

        tracing::debug!(
            "Saved record {} at tag {:?}",
            saved.id,
            saved.change_tag.map(|t| t.value())
        );
        Ok(saved)
    }

    async fn fetch(&self, id: &RecordId) -> Result<Record, StoreError> {
        self.load(id).await?.ok_or(StoreError::NotFound(*id))
    }

    async fn delete(&self, id: &RecordId) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;

        let path = self.record_path(id);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StoreError::NotFound(*id)),
            Err(e) => Err(io_error(&path, e)),
        }
    }
}
