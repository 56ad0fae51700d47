//! Attachment model
//!
//! Metadata for a supporting document held by a storage backend. The
//! intake workflow only ever records this metadata, never the bytes.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Default attachment size limit (10 MiB)
pub const MAX_ATTACHMENT_BYTES: u64 = 10 * 1024 * 1024;

/// Content type used when the client does not send one
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Reference to a stored supporting document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Storage-backend identifier
    pub key: String,

    /// Retrieval URL
    pub url: String,

    /// Original filename
    pub name: String,

    /// Size in bytes
    pub size: u64,

    /// MIME type
    #[serde(rename = "type")]
    pub content_type: String,
}

impl Attachment {
    /// Check the metadata is usable as a reference
    pub fn validate(&self, max_bytes: u64) -> Result<(), String> {
        if self.key.trim().is_empty() {
            return Err("Attachment key is required".to_string());
        }

        if self.url.trim().is_empty() {
            return Err(format!("Attachment {} has no URL", self.key));
        }

        if self.name.trim().is_empty() {
            return Err(format!("Attachment {} has no file name", self.key));
        }

        if self.size > max_bytes {
            return Err(format!(
                "Attachment {} is {} bytes; the limit is {} bytes",
                self.name, self.size, max_bytes
            ));
        }

        Ok(())
    }
}

/// A file received from a client, not yet handed to storage
#[derive(Debug, Clone)]
pub struct FileUpload {
    /// Original filename as sent by the client
    pub name: String,

    /// MIME type as sent by the client
    pub content_type: String,

    /// Raw file content
    pub data: Bytes,
}

impl FileUpload {
    /// Create an upload, defaulting the content type when blank
    pub fn new(name: impl Into<String>, content_type: Option<&str>, data: Bytes) -> Self {
        let content_type = content_type
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();

        Self {
            name: name.into(),
            content_type,
            data,
        }
    }

    /// Size in bytes
    #[inline]
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}
