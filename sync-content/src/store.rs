//! Local byte storage.
//!
//! This module provides a trait for reading and writing the cached bytes of
//! an item, a filesystem implementation, and a memory-based implementation
//! for testing.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::ContentError;

/// Trait for local byte storage addressed by path.
#[async_trait]
pub trait LocalStore: Send + Sync {
    /// Read the full contents at `path`.
    ///
    /// Returns `NotFound` if nothing is stored there.
    async fn read(&self, path: &Path) -> Result<Vec<u8>, ContentError>;

    /// Replace the contents at `path` with `data`.
    async fn write(&self, path: &Path, data: &[u8]) -> Result<(), ContentError>;
}

/// Filesystem-backed local store.
///
/// Writes go to a `.part` sibling first and are renamed into place, so a
/// reader never sees a half-written file.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsStore;

impl FsStore {
    /// Create a new filesystem store.
    pub fn new() -> Self {
        Self
    }
}

fn part_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    path.with_file_name(name)
}

#[async_trait]
impl LocalStore for FsStore {
    async fn read(&self, path: &Path) -> Result<Vec<u8>, ContentError> {
        tokio::fs::read(path)
            .await
            .map_err(|e| ContentError::from_io(path, e))
    }

    async fn write(&self, path: &Path, data: &[u8]) -> Result<(), ContentError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ContentError::from_io(parent, e))?;
        }
        let part = part_path(path);
        tokio::fs::write(&part, data)
            .await
            .map_err(|e| ContentError::from_io(&part, e))?;
        tokio::fs::rename(&part, path)
            .await
            .map_err(|e| ContentError::from_io(path, e))?;
        tracing::debug!("Wrote {} bytes to {}", data.len(), path.display());
        Ok(())
    }
}

/// In-memory local store for testing.
///
/// Stores bytes in a thread-safe HashMap and allows forcing the next read or
/// write to fail. Clones share state.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryStoreInner>>,
}

#[derive(Debug, Default)]
struct MemoryStoreInner {
    files: HashMap<PathBuf, Vec<u8>>,
    fail_next_read: Option<String>,
    fail_next_write: Option<String>,
    reads: usize,
    writes: usize,
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Put bytes at `path` directly, bypassing the trait.
    pub fn insert(&self, path: impl Into<PathBuf>, data: impl Into<Vec<u8>>) {
        let mut inner = self.inner.lock().unwrap();
        inner.files.insert(path.into(), data.into());
    }

    /// Get the bytes stored at `path`.
    pub fn get(&self, path: &Path) -> Option<Vec<u8>> {
        self.inner.lock().unwrap().files.get(path).cloned()
    }

    /// Cause the next read() to fail with the given message.
    pub fn fail_next_read(&self, error: &str) {
        self.inner.lock().unwrap().fail_next_read = Some(error.to_string());
    }

    /// Cause the next write() to fail with the given message.
    pub fn fail_next_write(&self, error: &str) {
        self.inner.lock().unwrap().fail_next_write = Some(error.to_string());
    }

    /// Number of read() calls so far.
    pub fn read_count(&self) -> usize {
        self.inner.lock().unwrap().reads
    }

    /// Number of write() calls so far.
    pub fn write_count(&self) -> usize {
        self.inner.lock().unwrap().writes
    }
}

#[async_trait]
impl LocalStore for MemoryStore {
    async fn read(&self, path: &Path) -> Result<Vec<u8>, ContentError> {
        let mut inner = self.inner.lock().unwrap();
        inner.reads += 1;

        if let Some(message) = inner.fail_next_read.take() {
            return Err(ContentError::Io {
                path: path.to_path_buf(),
                message,
            });
        }

        inner
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| ContentError::NotFound {
                path: path.to_path_buf(),
            })
    }

    async fn write(&self, path: &Path, data: &[u8]) -> Result<(), ContentError> {
        let mut inner = self.inner.lock().unwrap();
        inner.writes += 1;

        if let Some(message) = inner.fail_next_write.take() {
            return Err(ContentError::Io {
                path: path.to_path_buf(),
                message,
            });
        }

        inner.files.insert(path.to_path_buf(), data.to_vec());
        Ok(())
    }
}
