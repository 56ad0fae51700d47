//! Attachment intake
//!
//! Hands uploads to a [`BlobStore`] and records the resulting metadata.
//! Only metadata ever reaches a submission record.

use priorauth_core::{
    models::{Attachment, FileUpload},
    traits::BlobStore,
    AppError, AppResult,
};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Size-checks uploads and turns stored objects into attachment references
#[derive(Clone)]
pub struct AttachmentTracker {
    store: Arc<dyn BlobStore>,
    max_bytes: u64,
}

impl AttachmentTracker {
    pub fn new(store: Arc<dyn BlobStore>, max_bytes: u64) -> Self {
        Self { store, max_bytes }
    }

    /// Configured per-file limit in bytes
    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Reject a file larger than the limit
    pub fn check_size(&self, size: u64) -> AppResult<()> {
        if size > self.max_bytes {
            return Err(AppError::PayloadTooLarge {
                size,
                limit: self.max_bytes,
            });
        }
        Ok(())
    }

    /// Store one upload and return its attachment metadata
    #[instrument(skip(self, upload), fields(name = %upload.name, size = upload.size()))]
    pub async fn record(&self, upload: &FileUpload) -> AppResult<Attachment> {
        self.check_size(upload.size())?;

        let stored = self.store.put(upload).await?;
        info!(key = %stored.key, "Attachment stored");

        Ok(Attachment {
            key: stored.key,
            url: stored.url,
            name: upload.name.clone(),
            size: upload.size(),
            content_type: upload.content_type.clone(),
        })
    }

    /// Delete previously stored attachments; failures are logged, not returned
    pub async fn discard(&self, attachments: &[Attachment]) {
        for attachment in attachments {
            match self.store.delete(&attachment.key).await {
                Ok(true) => info!(key = %attachment.key, "Rolled back attachment"),
                Ok(false) => warn!(key = %attachment.key, "Attachment already gone during rollback"),
                Err(e) => warn!(key = %attachment.key, "Failed to roll back attachment: {}", e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob_store::InMemoryBlobStore;
    use bytes::Bytes;

    fn tracker(store: Arc<InMemoryBlobStore>, max: u64) -> AttachmentTracker {
        AttachmentTracker::new(store, max)
    }

    #[tokio::test]
    async fn test_record_returns_metadata() {
        let store = Arc::new(InMemoryBlobStore::default());
        let tracker = tracker(store.clone(), 1024);

        let upload = FileUpload::new("notes.pdf", None, Bytes::from_static(b"hello"));
        let attachment = tracker.record(&upload).await.unwrap();

        assert_eq!(attachment.name, "notes.pdf");
        assert_eq!(attachment.size, 5);
        assert_eq!(attachment.content_type, "application/octet-stream");
        assert!(store.get(&attachment.key).is_some());
        assert!(attachment.validate(1024).is_ok());
    }

    #[tokio::test]
    async fn test_oversized_upload_not_stored() {
        let store = Arc::new(InMemoryBlobStore::default());
        let tracker = tracker(store.clone(), 4);

        let upload = FileUpload::new("big.bin", None, Bytes::from_static(b"12345"));
        let result = tracker.record(&upload).await;

        assert!(matches!(
            result,
            Err(AppError::PayloadTooLarge { size: 5, limit: 4 })
        ));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_file_at_limit_is_accepted() {
        let tracker = tracker(Arc::new(InMemoryBlobStore::default()), 5);
        assert!(tracker.check_size(5).is_ok());
        assert!(tracker.check_size(6).is_err());
    }

    #[tokio::test]
    async fn test_discard_removes_objects() {
        let store = Arc::new(InMemoryBlobStore::default());
        let tracker = tracker(store.clone(), 1024);

        let a = tracker
            .record(&FileUpload::new("a.txt", None, Bytes::from_static(b"a")))
            .await
            .unwrap();
        let b = tracker
            .record(&FileUpload::new("b.txt", None, Bytes::from_static(b"b")))
            .await
            .unwrap();
        assert_eq!(store.len(), 2);

        tracker.discard(&[a, b]).await;
        assert!(store.is_empty());
    }
}
