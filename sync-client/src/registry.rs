//! Tracker of live items.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use itemsync_content::LocalStore;
use itemsync_types::{Digest, Record, RecordId};

use crate::config::ItemConfig;
use crate::error::ItemError;
use crate::item::{Backends, Deletion, Item, ItemHandle};
use crate::store::RecordStore;

/// Set of items sharing one remote store, one local store and one config.
#[derive(Debug)]
pub struct Tracker {
    backends: Backends,
    config: ItemConfig,
    items: HashMap<RecordId, ItemHandle>,
}

impl Tracker {
    /// Create an empty tracker. The hasher comes from `config`.
    pub fn new(
        remote: Arc<dyn RecordStore>,
        local: Arc<dyn LocalStore>,
        config: ItemConfig,
    ) -> Self {
        let backends = Backends::new(remote, local).with_hasher(config.hash.hasher());
        Self {
            backends,
            config,
            items: HashMap::new(),
        }
    }

    /// The collaborators handed to every item.
    pub fn backends(&self) -> &Backends {
        &self.backends
    }

    /// The item configuration.
    pub fn config(&self) -> &ItemConfig {
        &self.config
    }

    /// Start an item for `record` at `path` and track it.
    ///
    /// The starting status is derived from the local bytes and `base`, the
    /// checksum recorded at the last successful sync.
    pub async fn open(
        &mut self,
        record: Record,
        path: impl Into<PathBuf>,
        base: Option<Digest>,
    ) -> ItemHandle {
        let handle = Item::new(record, path)
            .derive_status(&self.backends, base)
            .await
            .spawn(self.backends.clone(), &self.config);
        self.track(handle.clone());
        handle
    }

    /// Track a running item, replacing any item with the same id.
    pub fn track(&mut self, handle: ItemHandle) -> Option<ItemHandle> {
        self.items.insert(handle.id(), handle)
    }

    /// Get a tracked item.
    pub fn get(&self, id: &RecordId) -> Option<&ItemHandle> {
        self.items.get(id)
    }

    /// Stop tracking an item.
    pub fn untrack(&mut self, id: &RecordId) -> Option<ItemHandle> {
        self.items.remove(id)
    }

    /// Ids of all tracked items.
    pub fn ids(&self) -> impl Iterator<Item = &RecordId> {
        self.items.keys()
    }

    /// Number of tracked items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if no item is tracked.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Delete an item's remote record and stop tracking it.
    ///
    /// Returns `None` if the item is unknown or refused the delete; a refused
    /// item stays tracked.
    pub async fn delete(&mut self, id: &RecordId) -> Result<Option<Deletion>, ItemError> {
        let Some(handle) = self.items.get(id) else {
            tracing::debug!("Delete of untracked item {}", id);
            return Ok(None);
        };

        let deletion = handle.delete().await?;
        if deletion.is_some() {
            self.items.remove(id);
        }
        Ok(deletion)
    }
}
