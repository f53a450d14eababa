//! CLI command implementations.

pub mod delete;
pub mod status;
pub mod transfer;

use anyhow::{bail, Context, Result};
use itemsync_client::{DirRecordStore, ItemHandle, RecordStore, StoreError, Tracker};
use itemsync_content::FsStore;
use itemsync_types::Record;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{CliConfig, Manifest};

/// Everything a command works with: settings, manifest, stores, tracker.
pub struct Session {
    /// Data directory holding config and manifest.
    pub data_dir: PathBuf,
    /// Loaded settings.
    pub config: CliConfig,
    /// Tracked files.
    pub manifest: Manifest,
    /// Record store.
    pub remote: Arc<DirRecordStore>,
    /// Running items.
    pub tracker: Tracker,
}

impl Session {
    /// Open a session over `data_dir`.
    pub async fn open(data_dir: &Path, config: CliConfig) -> Result<Self> {
        let manifest = Manifest::load(data_dir).await?;
        let remote = Arc::new(DirRecordStore::new(config.remote_dir(data_dir)));
        let tracker = Tracker::new(remote.clone(), Arc::new(FsStore::new()), config.item_config());
        tracing::debug!(
            "Session over {} ({} tracked files, records in {})",
            data_dir.display(),
            manifest.entries.len(),
            remote.root().display()
        );

        Ok(Self {
            data_dir: data_dir.to_path_buf(),
            config,
            manifest,
            remote,
            tracker,
        })
    }

    /// Start an item for `path`.
    ///
    /// With `register` an untracked file gets a fresh record id; without it
    /// an untracked file is an error.
    pub async fn item(&mut self, path: &Path, register: bool) -> Result<ItemHandle> {
        let entry = match self.manifest.get(path) {
            Some(entry) => entry.clone(),
            None if register => {
                let entry = self.manifest.register(path).clone();
                tracing::info!("Tracking {} as record {}", path.display(), entry.record_id);
                entry
            }
            None => bail!("{} is not tracked; upload it first", path.display()),
        };

        let record = match self.remote.fetch(&entry.record_id).await {
            Ok(record) => record,
            Err(StoreError::NotFound(id)) => Record::new(id),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to fetch record {}", entry.record_id))
            }
        };

        Ok(self.tracker.open(record, path, entry.base).await)
    }

    /// Persist the manifest.
    pub async fn save_manifest(&self) -> Result<()> {
        self.manifest.save(&self.data_dir).await
    }
}

/// Make `file` absolute so manifest keys do not depend on the working directory.
pub fn resolve(file: &Path) -> Result<PathBuf> {
    if file.is_absolute() {
        return Ok(file.to_path_buf());
    }
    let cwd = std::env::current_dir().context("Could not determine working directory")?;
    Ok(cwd.join(file))
}
