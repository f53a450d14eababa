//! Scenario harness: a tracker wired to in-memory stores.
//!
//! The harness keeps test-side handles on the mock record store and the
//! memory store, so scenarios can hold remote calls, inject failures and
//! inspect what landed where.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use itemsync_client::{ItemConfig, ItemHandle, MockRecordStore, Tracker};
use itemsync_content::MemoryStore;
use itemsync_core::SyncStatus;
use itemsync_types::{ChangeTag, Record, RecordId};

/// How long `wait_until` polls before giving up.
pub const WAIT_TIMEOUT: Duration = Duration::from_secs(5);

/// A tracker over a [`MockRecordStore`] and a [`MemoryStore`].
pub struct ItemHarness {
    /// Remote side.
    pub remote: MockRecordStore,
    /// Local side.
    pub local: MemoryStore,
    /// Tracker under test.
    pub tracker: Tracker,
}

impl ItemHarness {
    /// Create a harness with default item configuration.
    pub fn new() -> Self {
        Self::with_config(ItemConfig::default())
    }

    /// Create a harness with the given item configuration.
    pub fn with_config(config: ItemConfig) -> Self {
        let remote = MockRecordStore::new();
        let local = MemoryStore::new();
        let tracker = Tracker::new(Arc::new(remote.clone()), Arc::new(local.clone()), config);
        Self {
            remote,
            local,
            tracker,
        }
    }

    /// Write local bytes for a fresh record and open an item for it.
    pub async fn open_local(&mut self, path: &str, data: &[u8]) -> ItemHandle {
        self.local.insert(path, data.to_vec());
        self.tracker
            .open(Record::new(RecordId::new()), PathBuf::from(path), None)
            .await
    }

    /// Open an item whose remote record changed behind its back.
    ///
    /// The remote holds `remote_data`, the local file holds `local_data`,
    /// and the last synced checksum is unknown, so the item starts in error.
    pub async fn open_diverged(
        &mut self,
        path: &str,
        local_data: &[u8],
        remote_data: &[u8],
    ) -> ItemHandle {
        let hasher = Arc::clone(&self.tracker.backends().hasher);
        let mut record = Record::new(RecordId::new())
            .with_payload(remote_data.to_vec(), hasher.digest(remote_data));
        record.change_tag = Some(ChangeTag::first());
        self.remote.insert(record.clone());
        self.local.insert(path, local_data.to_vec());

        self.tracker.open(record, PathBuf::from(path), None).await
    }

    /// Wait until the store has seen `n` saves.
    pub async fn wait_for_saves(&self, n: usize) {
        let remote = self.remote.clone();
        wait_until(move || remote.save_count() >= n).await;
    }
}

impl Default for ItemHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Poll `condition` until it holds. Panics after [`WAIT_TIMEOUT`].
pub async fn wait_until<F>(condition: F)
where
    F: Fn() -> bool,
{
    let polled = tokio::time::timeout(WAIT_TIMEOUT, async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await;

    if polled.is_err() {
        panic!("condition not met within {:?}", WAIT_TIMEOUT);
    }
}

/// Await `future`, panicking after [`WAIT_TIMEOUT`].
pub async fn within<F: Future>(future: F) -> F::Output {
    match tokio::time::timeout(WAIT_TIMEOUT, future).await {
        Ok(output) => output,
        Err(_) => panic!("future did not resolve within {:?}", WAIT_TIMEOUT),
    }
}

/// Wait until `item` reports a status satisfying `predicate`.
pub async fn wait_for_status<P>(item: &ItemHandle, predicate: P)
where
    P: Fn(&SyncStatus) -> bool,
{
    let mut rx = item.subscribe();
    within(async {
        loop {
            if predicate(&rx.borrow_and_update()) {
                return;
            }
            if rx.changed().await.is_err() {
                panic!("item stopped before reaching the expected status");
            }
        }
    })
    .await;
}
