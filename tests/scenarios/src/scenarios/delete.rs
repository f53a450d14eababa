//! Delete scenarios.
//!
//! Deletes bypass the operation queue: they are accepted from synced or
//! error, refused while anything is in flight, and never change the status.

#[cfg(test)]
mod tests {
    use crate::assertions::{assert_status_kind, assert_untouched};
    use crate::harness::{within, ItemHarness};
    use itemsync_client::{ItemError, Reflected, StoreError};
    use itemsync_core::StatusKind;

    /// Synced -> delete -> remote delete issued, item untracked.
    #[tokio::test]
    async fn delete_from_synced_untracks() {
        let mut h = ItemHarness::new();
        let item = h.open_local("/notes/todo.md", b"- milk").await;
        within(item.upload().await.unwrap().unwrap()).await.unwrap();

        let deletion = h.tracker.delete(&item.id()).await.unwrap().expect("accepted");

        assert!(h.tracker.get(&item.id()).is_none());
        assert_eq!(within(deletion).await, Ok(()));
        assert!(h.remote.stored(&item.id()).is_none());
        assert_eq!(h.remote.delete_count(), 1);
    }

    /// Delete while networking is refused: no remote call, status unchanged,
    /// item still tracked.
    #[tokio::test]
    async fn delete_refused_while_networking() {
        let mut h = ItemHarness::new();
        let item = h.open_local("/notes/todo.md", b"- milk").await;
        h.remote.hold_requests();

        let upload = item.upload().await.unwrap().unwrap();
        let before = item.status();

        assert!(h.tracker.delete(&item.id()).await.unwrap().is_none());

        assert_eq!(item.status(), before);
        assert_eq!(h.remote.delete_count(), 0);
        assert!(h.tracker.get(&item.id()).is_some());

        h.remote.release_all();
        assert_eq!(within(upload).await, Ok(Reflected::Completed));
    }

    /// Delete is accepted from error and leaves the error in place.
    #[tokio::test]
    async fn delete_from_error_keeps_status() {
        let mut h = ItemHarness::new();
        let item = h.open_diverged("/notes/todo.md", b"mine", b"theirs").await;

        let deletion = item.delete().await.unwrap().expect("accepted");

        assert_eq!(within(deletion).await, Ok(()));
        assert_status_kind(&item.status(), StatusKind::Error).expect_pass();
    }

    /// A failed remote delete is reported through the deletion only.
    #[tokio::test]
    async fn failed_delete_reports_error() {
        let mut h = ItemHarness::new();
        let item = h.open_local("/notes/todo.md", b"- milk").await;
        h.remote.fail_next_delete("forbidden");

        let deletion = item.delete().await.unwrap().unwrap();

        assert_eq!(
            within(deletion).await,
            Err(ItemError::RemoteStore(StoreError::Unavailable(
                "forbidden".into()
            )))
        );
        assert_status_kind(&item.status(), StatusKind::Synced).expect_pass();
    }

    /// Deleting something the tracker does not know does nothing.
    #[tokio::test]
    async fn delete_of_untracked_item_is_ignored() {
        let mut h = ItemHarness::new();
        let item = h.open_local("/notes/todo.md", b"- milk").await;
        h.tracker.untrack(&item.id());

        assert!(h.tracker.delete(&item.id()).await.unwrap().is_none());
        assert_untouched(&h.remote.calls(), item.id()).expect_pass();
    }
}
