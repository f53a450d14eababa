//! Configuration management for itemsync.
//!
//! Two files live in the data directory:
//! - `itemsync.toml` - user settings ([`CliConfig`])
//! - `manifest.json` - which record each file mirrors ([`Manifest`])

use anyhow::{Context, Result};
use itemsync_client::ItemConfig;
use itemsync_content::HashAlgorithm;
use itemsync_types::{Digest, RecordId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// User settings, loaded from TOML. Every key is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Directory backing the record store (default: `<data dir>/remote`).
    pub remote_dir: Option<PathBuf>,
    /// Checksum algorithm (default: blake3).
    pub hash: HashAlgorithm,
    /// Log filter when `RUST_LOG` is unset (default: warn).
    pub log_level: String,
    /// Item mailbox capacity (default: 64).
    pub mailbox_capacity: usize,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            remote_dir: None,
            hash: HashAlgorithm::Blake3,
            log_level: "warn".to_string(),
            mailbox_capacity: itemsync_client::DEFAULT_MAILBOX_CAPACITY,
        }
    }
}

impl CliConfig {
    /// Config file name inside the data directory.
    pub const FILE_NAME: &'static str = "itemsync.toml";

    /// Load settings from `path`, or defaults if the file does not exist.
    pub async fn load(path: &Path) -> Result<Self> {
        let contents = match tokio::fs::read_to_string(path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()))
            }
        };
        toml::from_str(&contents).with_context(|| format!("Invalid configuration in {}", path.display()))
    }

    /// Directory backing the record store.
    pub fn remote_dir(&self, data_dir: &Path) -> PathBuf {
        self.remote_dir
            .clone()
            .unwrap_or_else(|| data_dir.join("remote"))
    }

    /// Item settings derived from this configuration.
    pub fn item_config(&self) -> ItemConfig {
        ItemConfig::new()
            .with_mailbox_capacity(self.mailbox_capacity)
            .with_hasher(self.hash)
    }
}

/// What the CLI remembers about one tracked file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Record the file mirrors.
    pub record_id: RecordId,
    /// Checksum at the last successful sync.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<Digest>,
}

/// Map of tracked files to their records, stored as JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Entries keyed by absolute file path.
    #[serde(default)]
    pub entries: BTreeMap<PathBuf, ManifestEntry>,
}

impl Manifest {
    /// Manifest file name inside the data directory.
    pub const FILE_NAME: &'static str = "manifest.json";

    /// Load the manifest from a directory. A missing file is an empty manifest.
    pub async fn load(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(Self::FILE_NAME);
        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e).context("Failed to read manifest"),
        };
        serde_json::from_str(&contents).context("Invalid manifest")
    }

    /// Save the manifest to a directory.
    pub async fn save(&self, data_dir: &Path) -> Result<()> {
        let path = data_dir.join(Self::FILE_NAME);
        let contents = serde_json::to_string_pretty(self)?;
        tokio::fs::write(&path, contents)
            .await
            .context("Failed to save manifest")?;
        Ok(())
    }

    /// Get the entry for `path`.
    pub fn get(&self, path: &Path) -> Option<&ManifestEntry> {
        self.entries.get(path)
    }

    /// Get the entry for `path`, minting a record id if it is new.
    pub fn register(&mut self, path: &Path) -> &ManifestEntry {
        self.entries
            .entry(path.to_path_buf())
            .or_insert_with(|| ManifestEntry {
                record_id: RecordId::new(),
                base: None,
            })
    }

    /// Record the checksum of a successful sync.
    pub fn set_base(&mut self, path: &Path, base: Option<Digest>) {
        if let Some(entry) = self.entries.get_mut(path) {
            entry.base = base;
        }
    }

    /// Forget `path`.
    pub fn remove(&mut self, path: &Path) -> Option<ManifestEntry> {
        self.entries.remove(path)
    }
}
