//! Recovery scenarios.
//!
//! An item whose remote record diverged starts in error. From there the
//! caller picks a side: download takes the remote bytes, replace forces the
//! local ones.

#[cfg(test)]
mod tests {
    use crate::assertions::{assert_status_kind, assert_untouched};
    use crate::harness::{wait_until, within, ItemHarness};
    use itemsync_client::{ItemError, Reflected, StoreCall};
    use itemsync_core::{StatusKind, SyncStatus};
    use itemsync_types::{ChangeTag, SavePolicy};
    use std::path::Path;

    const PATH: &str = "/photos/cat.jpg";

    /// Error -> download -> synced, with the remote bytes on disk.
    #[tokio::test]
    async fn download_resolves_error() {
        let mut h = ItemHarness::new();
        let item = h.open_diverged(PATH, b"mine", b"theirs").await;
        assert_status_kind(&item.status(), StatusKind::Error).expect_pass();

        let outcome = within(item.download().await.unwrap().unwrap()).await;

        assert_eq!(outcome, Ok(Reflected::Completed));
        assert_eq!(item.status(), SyncStatus::Synced);
        assert_eq!(h.local.get(Path::new(PATH)), Some(b"theirs".to_vec()));
    }

    /// A second download while the first is in flight is refused and the
    /// status keeps pointing at the first.
    #[tokio::test]
    async fn second_download_refused_while_networking() {
        let mut h = ItemHarness::new();
        let item = h.open_diverged(PATH, b"mine", b"theirs").await;
        h.remote.hold_requests();

        let first = item.download().await.unwrap().unwrap();
        let remote = h.remote.clone();
        wait_until(move || remote.in_flight() == 1).await;

        assert!(item.download().await.unwrap().is_none());
        assert_eq!(item.status().current_op(), Some(first.op()));
        assert_eq!(
            h.remote
                .calls()
                .iter()
                .filter(|c| matches!(c, StoreCall::Fetch(_)))
                .count(),
            1
        );

        h.remote.release_all();
        assert_eq!(within(first).await, Ok(Reflected::Completed));
    }

    /// Error -> replace -> synced, with the local bytes forced over a record
    /// whose change tag the item never saw.
    #[tokio::test]
    async fn replace_forces_local_bytes() {
        let mut h = ItemHarness::new();
        let item = h.open_diverged(PATH, b"mine", b"theirs").await;

        let outcome = within(item.replace().await.unwrap().unwrap()).await;

        assert_eq!(outcome, Ok(Reflected::Completed));
        let stored = h.remote.stored(&item.id()).unwrap();
        assert_eq!(stored.data.as_deref(), Some(&b"mine"[..]));
        assert_eq!(stored.change_tag, Some(ChangeTag::new(2)));
        assert!(h.remote.calls().contains(&StoreCall::Save {
            id: item.id(),
            policy: SavePolicy::ChangedKeys
        }));
        assert_eq!(item.status(), SyncStatus::Synced);
    }

    /// Download and replace only make sense out of the error state.
    #[tokio::test]
    async fn recovery_refused_when_synced() {
        let mut h = ItemHarness::new();
        let item = h.open_local(PATH, b"bytes").await;

        assert!(item.download().await.unwrap().is_none());
        assert!(item.replace().await.unwrap().is_none());

        assert_eq!(item.status(), SyncStatus::Synced);
        assert_untouched(&h.remote.calls(), item.id()).expect_pass();
    }

    /// Upload stays refused until the error is resolved.
    #[tokio::test]
    async fn upload_allowed_again_after_replace() {
        let mut h = ItemHarness::new();
        let item = h.open_diverged(PATH, b"mine", b"theirs").await;
        assert!(item.upload().await.unwrap().is_none());

        within(item.replace().await.unwrap().unwrap()).await.unwrap();

        h.local.insert(PATH, b"mine, edited".to_vec());
        let outcome = within(item.upload().await.unwrap().unwrap()).await;
        assert_eq!(outcome, Ok(Reflected::Completed));
        assert_eq!(
            h.remote.stored(&item.id()).unwrap().data.as_deref(),
            Some(&b"mine, edited"[..])
        );
    }

    /// A failed fetch leaves the item in error with the new cause.
    #[tokio::test]
    async fn failed_download_stays_in_error() {
        let mut h = ItemHarness::new();
        let item = h.open_diverged(PATH, b"mine", b"theirs").await;
        h.remote.fail_next_fetch("offline");

        let outcome = within(item.download().await.unwrap().unwrap()).await;

        assert!(matches!(outcome, Err(ItemError::RemoteStore(_))));
        match item.status() {
            SyncStatus::Error { cause } => assert!(cause.contains("offline")),
            other => panic!("expected error, got {}", other),
        }
        assert_eq!(h.local.get(Path::new(PATH)), Some(b"mine".to_vec()));
    }

    /// A failed local write still refreshes the snapshot from the fetch.
    #[tokio::test]
    async fn failed_local_write_keeps_fetched_snapshot() {
        let mut h = ItemHarness::new();
        let item = h.open_diverged(PATH, b"mine", b"theirs").await;
        let mut remote = h.remote.stored(&item.id()).unwrap();
        remote.change_tag = Some(ChangeTag::new(5));
        h.remote.insert(remote.clone());
        h.local.fail_next_write("disk full");

        let outcome = within(item.download().await.unwrap().unwrap()).await;

        assert!(matches!(outcome, Err(ItemError::LocalIo(_))));
        assert!(item.status().is_error());
        assert_eq!(item.snapshot().await.unwrap(), remote);
    }
}
