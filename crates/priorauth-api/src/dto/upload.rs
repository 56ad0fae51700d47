//! Upload DTOs

use priorauth_core::models::Attachment;
use serde::Serialize;

/// Body returned by `POST /api/upload`
///
/// Carries the same fields as an attachment reference, so clients can put
/// it straight into a submission's `meta.attachments`.
#[derive(Debug, Clone, Serialize)]
pub struct UploadResponse {
    pub ok: bool,
    pub key: String,
    pub url: String,
    pub name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub content_type: String,
}

impl From<Attachment> for UploadResponse {
    fn from(attachment: Attachment) -> Self {
        Self {
            ok: true,
            key: attachment.key,
            url: attachment.url,
            name: attachment.name,
            size: attachment.size,
            content_type: attachment.content_type,
        }
    }
}
