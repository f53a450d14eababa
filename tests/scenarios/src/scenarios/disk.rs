//! On-disk scenarios.
//!
//! The same flows as the in-memory scenarios, against a [`DirRecordStore`]
//! and real files in a temp directory.
//!
//! [`DirRecordStore`]: itemsync_client::DirRecordStore

#[cfg(test)]
mod tests {
    use crate::harness::within;
    use itemsync_client::{DirRecordStore, ItemConfig, Reflected, RecordStore, Tracker};
    use itemsync_content::{FsStore, HashAlgorithm};
    use itemsync_types::{ChangeTag, Record, RecordId, SavePolicy};
    use std::sync::Arc;
    use tempfile::tempdir;

    fn tracker(remote: &Arc<DirRecordStore>, hash: HashAlgorithm) -> Tracker {
        Tracker::new(
            remote.clone(),
            Arc::new(FsStore::new()),
            ItemConfig::new().with_hasher(hash),
        )
    }

    #[tokio::test]
    async fn upload_then_download_on_another_replica() {
        let dir = tempdir().unwrap();
        let remote = Arc::new(DirRecordStore::new(dir.path().join("remote")));

        // First replica publishes.
        let a_path = dir.path().join("a").join("report.txt");
        std::fs::create_dir_all(a_path.parent().unwrap()).unwrap();
        std::fs::write(&a_path, b"quarterly numbers").unwrap();
        let mut a = tracker(&remote, HashAlgorithm::Blake3);
        let id = RecordId::new();
        let item_a = a.open(Record::new(id), &a_path, None).await;
        assert_eq!(
            within(item_a.upload().await.unwrap().unwrap()).await,
            Ok(Reflected::Completed)
        );

        // Second replica has no local copy, so it starts in error.
        let b_path = dir.path().join("b").join("report.txt");
        let mut b = tracker(&remote, HashAlgorithm::Blake3);
        let fetched = remote.fetch(&id).await.unwrap();
        let item_b = b.open(fetched, &b_path, None).await;
        assert!(item_b.status().is_error());

        assert_eq!(
            within(item_b.download().await.unwrap().unwrap()).await,
            Ok(Reflected::Completed)
        );
        assert_eq!(std::fs::read(&b_path).unwrap(), b"quarterly numbers");
        assert!(item_b.status().is_synced());
    }

    #[tokio::test]
    async fn concurrent_writer_is_detected_and_replaced() {
        let dir = tempdir().unwrap();
        let remote = Arc::new(DirRecordStore::new(dir.path().join("remote")));
        let path = dir.path().join("draft.txt");
        std::fs::write(&path, b"v1").unwrap();

        let mut tracker = tracker(&remote, HashAlgorithm::Sha256);
        let item = tracker.open(Record::new(RecordId::new()), &path, None).await;
        within(item.upload().await.unwrap().unwrap()).await.unwrap();

        // Someone else saves over us.
        let theirs = remote.fetch(&item.id()).await.unwrap();
        remote.save(&theirs, SavePolicy::IfServerRecordUnchanged).await.unwrap();

        std::fs::write(&path, b"v2").unwrap();
        assert!(within(item.upload().await.unwrap().unwrap()).await.is_err());
        assert!(item.status().is_error());

        assert_eq!(
            within(item.replace().await.unwrap().unwrap()).await,
            Ok(Reflected::Completed)
        );
        let stored = remote.fetch(&item.id()).await.unwrap();
        assert_eq!(stored.data.as_deref(), Some(&b"v2"[..]));
        assert_eq!(stored.change_tag, Some(ChangeTag::new(3)));
    }
}
