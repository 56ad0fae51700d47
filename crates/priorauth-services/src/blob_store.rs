//! Attachment storage backends
//!
//! `FileSystemBlobStore` writes uploads under a directory that the HTTP
//! server exposes read-only; `InMemoryBlobStore` keeps bytes in a map.

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use priorauth_core::{
    models::FileUpload,
    traits::{BlobStore, StoredObject},
    AppError, AppResult,
};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Longest file-name part kept in a key
const MAX_NAME_LEN: usize = 100;

/// Reduce a client file name to a safe single path segment
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .take(MAX_NAME_LEN)
        .collect();

    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Storage key with a random prefix, so equal names never collide
pub fn generate_key(name: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}", &suffix[..8], sanitize_file_name(name))
}

fn public_url(base: &str, key: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), key)
}

fn is_plain_key(key: &str) -> bool {
    !key.is_empty() && !key.contains(['/', '\\']) && key != "." && key != ".."
}

/// Blob store backed by a local directory
pub struct FileSystemBlobStore {
    root: PathBuf,
    public_base_url: String,
}

impl FileSystemBlobStore {
    /// Create the store, making sure the root directory exists
    pub async fn new(root: impl AsRef<Path>, public_base_url: impl Into<String>) -> AppResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::Config(format!(
                "Cannot create upload directory {}: {}",
                root.display(),
                e
            ))
        })?;

        info!("Attachment storage at {}", root.display());
        Ok(Self {
            root,
            public_base_url: public_base_url.into(),
        })
    }

    /// Directory holding stored objects
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Write `data` to `file`; on failure the file at `path` is removed so a
/// truncated object is never served
async fn write_or_remove(path: &Path, mut file: fs::File, data: &[u8]) -> io::Result<()> {
    let written = match file.write_all(data).await {
        Ok(()) => file.flush().await,
        Err(e) => Err(e),
    };

    if written.is_err() {
        drop(file);
        if let Err(e) = fs::remove_file(path).await {
            warn!("Failed to remove partial file {}: {}", path.display(), e);
        }
    }
    written
}

#[async_trait]
impl BlobStore for FileSystemBlobStore {
    #[instrument(skip(self, upload), fields(name = %upload.name, size = upload.size()))]
    async fn put(&self, upload: &FileUpload) -> AppResult<StoredObject> {
        let key = generate_key(&upload.name);
        let path = self.root.join(&key);

        let file = fs::File::create(&path).await.map_err(|e| {
            error!("Failed to create {}: {}", path.display(), e);
            AppError::Upload(format!("Failed to store {}: {}", upload.name, e))
        })?;
        write_or_remove(&path, file, &upload.data)
            .await
            .map_err(|e| {
                error!("Failed to write {}: {}", path.display(), e);
                AppError::Upload(format!("Failed to store {}: {}", upload.name, e))
            })?;

        debug!("Stored {} bytes as {}", upload.size(), key);
        Ok(StoredObject {
            url: public_url(&self.public_base_url, &key),
            key,
        })
    }

    #[instrument(skip(self))]
    async fn delete(&self, key: &str) -> AppResult<bool> {
        if !is_plain_key(key) {
            return Ok(false);
        }

        match fs::remove_file(self.root.join(key)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(AppError::Upload(format!("Failed to delete {}: {}", key, e))),
        }
    }
}

/// Blob store keeping objects in memory
pub struct InMemoryBlobStore {
    objects: RwLock<HashMap<String, Bytes>>,
    public_base_url: String,
}

impl InMemoryBlobStore {
    pub fn new(public_base_url: impl Into<String>) -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
            public_base_url: public_base_url.into(),
        }
    }

    /// Bytes stored under `key`
    pub fn get(&self, key: &str) -> Option<Bytes> {
        self.objects.read().get(key).cloned()
    }

    /// Number of stored objects
    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }
}

impl Default for InMemoryBlobStore {
    fn default() -> Self {
        Self::new("/files")
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn put(&self, upload: &FileUpload) -> AppResult<StoredObject> {
        let key = generate_key(&upload.name);
        self.objects.write().insert(key.clone(), upload.data.clone());

        Ok(StoredObject {
            url: public_url(&self.public_base_url, &key),
            key,
        })
    }

    async fn delete(&self, key: &str) -> AppResult<bool> {
        Ok(self.objects.write().remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str, data: &'static [u8]) -> FileUpload {
        FileUpload::new(name, Some("application/pdf"), Bytes::from_static(data))
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("clinical notes.pdf"), "clinical_notes.pdf");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\scans\\mri.png"), "mri.png");
        assert_eq!(sanitize_file_name(".hidden"), "hidden");
        assert_eq!(sanitize_file_name(""), "file");
    }

    #[test]
    fn test_keys_are_unique_for_same_name() {
        let a = generate_key("report.pdf");
        let b = generate_key("report.pdf");
        assert_ne!(a, b);
        assert!(a.ends_with("-report.pdf"));
    }

    #[tokio::test]
    async fn test_memory_store_put_and_delete() {
        let store = InMemoryBlobStore::default();
        let stored = store.put(&upload("a.pdf", b"%PDF-1.4")).await.unwrap();

        assert_eq!(stored.url, format!("/files/{}", stored.key));
        assert_eq!(store.get(&stored.key).as_deref(), Some(&b"%PDF-1.4"[..]));

        assert!(store.delete(&stored.key).await.unwrap());
        assert!(!store.delete(&stored.key).await.unwrap());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_filesystem_store_round_trip() {
        let root = std::env::temp_dir().join(format!("priorauth-blobs-{}", Uuid::new_v4()));
        let store = FileSystemBlobStore::new(&root, "http://localhost:9001/files/")
            .await
            .unwrap();

        let stored = store.put(&upload("scan.pdf", b"bytes")).await.unwrap();
        assert_eq!(
            stored.url,
            format!("http://localhost:9001/files/{}", stored.key)
        );
        assert_eq!(fs::read(root.join(&stored.key)).await.unwrap(), b"bytes");

        assert!(store.delete(&stored.key).await.unwrap());
        assert!(!store.delete(&stored.key).await.unwrap());
        assert!(!store.delete("../outside").await.unwrap());

        fs::remove_dir_all(&root).await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_write_removes_partial_file() {
        let root = std::env::temp_dir().join(format!("priorauth-blobs-{}", Uuid::new_v4()));
        fs::create_dir_all(&root).await.unwrap();
        let path = root.join("partial.pdf");
        fs::write(&path, b"").await.unwrap();

        // a read-only handle refuses the write
        let file = fs::File::open(&path).await.unwrap();
        let result = write_or_remove(&path, file, b"%PDF-1.4").await;

        assert!(result.is_err());
        assert!(!path.exists());

        fs::remove_dir_all(&root).await.unwrap();
    }
}
