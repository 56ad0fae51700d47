//! Request body readers for file uploads
//!
//! Bodies are read chunk by chunk and rejected with `PayloadTooLarge` as
//! soon as they cross the limit, so oversized files are never buffered.

use actix_multipart::Multipart;
use actix_web::{http::header, HttpRequest};
use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use priorauth_core::{models::FileUpload, AppError, AppResult};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Limit for non-file form fields
pub const TEXT_FIELD_LIMIT: u64 = 1024 * 1024;

/// Most file parts accepted in one form
pub const MAX_FORM_FILES: usize = 10;

/// Most non-file parts accepted in one form
pub const MAX_FORM_FIELDS: usize = 16;

/// Field names treated as files even without a filename
const FILE_FIELDS: &[&str] = &["file", "files"];

/// Name given to files sent without one
pub const DEFAULT_FILE_NAME: &str = "upload.bin";

/// Raw-body upload headers
pub const FILENAME_HEADER: &str = "x-filename";
pub const FILE_TYPE_HEADER: &str = "x-file-type";

/// Parsed multipart form
#[derive(Debug, Default)]
pub struct UploadForm {
    /// File parts, in the order received
    pub files: Vec<FileUpload>,
    /// Other parts by field name
    pub fields: HashMap<String, Bytes>,
}

impl UploadForm {
    /// Raw content of a text field
    pub fn field(&self, name: &str) -> Option<&Bytes> {
        self.fields.get(name)
    }
}

/// Collect a stream into memory, failing once it exceeds `limit` bytes
pub async fn read_limited<S, E>(stream: &mut S, limit: u64) -> AppResult<Bytes>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: fmt::Display,
{
    let mut buf = BytesMut::new();
    while let Some(chunk) = stream.next().await {
        let chunk =
            chunk.map_err(|e| AppError::InvalidInput(format!("Failed to read request body: {}", e)))?;

        let size = (buf.len() + chunk.len()) as u64;
        if size > limit {
            return Err(AppError::PayloadTooLarge { size, limit });
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(buf.freeze())
}

/// Whether the request carries a multipart form
pub fn is_multipart(req: &HttpRequest) -> bool {
    header_str(req, header::CONTENT_TYPE.as_str())
        .is_some_and(|ct| ct.to_ascii_lowercase().starts_with("multipart/form-data"))
}

/// Trimmed, non-empty header value
pub fn header_str<'a>(req: &'a HttpRequest, name: &str) -> Option<&'a str> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Declared body size, if the client sent one
pub fn content_length(req: &HttpRequest) -> Option<u64> {
    header_str(req, header::CONTENT_LENGTH.as_str()).and_then(|v| v.parse().ok())
}

/// Read every part of a multipart form
///
/// Each file is limited to `file_limit` bytes, other fields to
/// [`TEXT_FIELD_LIMIT`]; at most [`MAX_FORM_FILES`] files and
/// [`MAX_FORM_FIELDS`] other fields are read. File inputs left empty by a
/// browser are skipped.
pub async fn read_form(mut multipart: Multipart, file_limit: u64) -> AppResult<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next().await {
        let mut field = field
            .map_err(|e| AppError::InvalidInput(format!("Malformed multipart body: {}", e)))?;

        let name = field.name().unwrap_or_default().to_string();
        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string);
        let content_type = field.content_type().map(ToString::to_string);

        if file_name.is_some() || FILE_FIELDS.contains(&name.as_str()) {
            if form.files.len() >= MAX_FORM_FILES {
                return Err(AppError::InvalidInput(format!(
                    "At most {} files may be sent in one form",
                    MAX_FORM_FILES
                )));
            }

            let data = read_limited(&mut field, file_limit).await?;
            let file_name = file_name.filter(|n| !n.trim().is_empty());
            if file_name.is_none() && data.is_empty() {
                continue;
            }

            debug!(field = %name, size = data.len(), "Received file part");
            form.files.push(FileUpload::new(
                file_name.unwrap_or_else(|| DEFAULT_FILE_NAME.to_string()),
                content_type.as_deref(),
                data,
            ));
        } else {
            if form.fields.len() >= MAX_FORM_FIELDS {
                return Err(AppError::InvalidInput(format!(
                    "At most {} form fields may be sent",
                    MAX_FORM_FIELDS
                )));
            }

            let data = read_limited(&mut field, TEXT_FIELD_LIMIT).await?;
            form.fields.insert(name, data);
        }
    }

    Ok(form)
}

/// Build an upload from a raw request body
///
/// The file name comes URL-encoded in `x-filename`; the type from
/// `x-file-type`, falling back to `content-type`.
pub async fn read_raw<S, E>(req: &HttpRequest, body: &mut S, limit: u64) -> AppResult<FileUpload>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: fmt::Display,
{
    if let Some(size) = content_length(req).filter(|size| *size > limit) {
        return Err(AppError::PayloadTooLarge { size, limit });
    }

    let data = read_limited(body, limit).await?;
    if data.is_empty() {
        return Err(AppError::MissingField("file".to_string()));
    }

    let name = header_str(req, FILENAME_HEADER)
        .map(|raw| {
            urlencoding::decode(raw)
                .map(|decoded| decoded.into_owned())
                .unwrap_or_else(|_| raw.to_string())
        })
        .unwrap_or_else(|| DEFAULT_FILE_NAME.to_string());

    let content_type = header_str(req, FILE_TYPE_HEADER)
        .or_else(|| header_str(req, header::CONTENT_TYPE.as_str()));

    Ok(FileUpload::new(name, content_type, data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;
    use futures::stream;

    fn chunks(parts: &[&'static str]) -> impl Stream<Item = Result<Bytes, String>> + Unpin {
        stream::iter(
            parts
                .iter()
                .map(|p| Ok::<_, String>(Bytes::from_static(p.as_bytes())))
                .collect::<Vec<_>>(),
        )
    }

    #[actix_rt::test]
    async fn test_read_limited_collects_chunks() {
        let mut body = chunks(&["ab", "cd"]);
        assert_eq!(read_limited(&mut body, 4).await.unwrap(), Bytes::from_static(b"abcd"));
    }

    #[actix_rt::test]
    async fn test_read_limited_stops_at_limit() {
        let mut body = chunks(&["abc", "def", "ghi"]);
        let result = read_limited(&mut body, 5).await;
        assert!(matches!(
            result,
            Err(AppError::PayloadTooLarge { size: 6, limit: 5 })
        ));
    }

    #[actix_rt::test]
    async fn test_read_raw_decodes_headers() {
        let req = TestRequest::post()
            .insert_header((FILENAME_HEADER, "MRI%20order%20(signed).pdf"))
            .insert_header((header::CONTENT_TYPE, "application/pdf"))
            .to_http_request();

        let upload = read_raw(&req, &mut chunks(&["%PDF"]), 1024).await.unwrap();
        assert_eq!(upload.name, "MRI order (signed).pdf");
        assert_eq!(upload.content_type, "application/pdf");
        assert_eq!(upload.size(), 4);
    }

    #[actix_rt::test]
    async fn test_read_raw_prefers_file_type_header() {
        let req = TestRequest::post()
            .insert_header((FILE_TYPE_HEADER, "image/png"))
            .insert_header((header::CONTENT_TYPE, "application/octet-stream"))
            .to_http_request();

        let upload = read_raw(&req, &mut chunks(&["png"]), 1024).await.unwrap();
        assert_eq!(upload.name, DEFAULT_FILE_NAME);
        assert_eq!(upload.content_type, "image/png");
    }

    #[actix_rt::test]
    async fn test_read_raw_empty_body() {
        let req = TestRequest::post().to_http_request();
        let result = read_raw(&req, &mut chunks(&[]), 1024).await;
        assert!(matches!(result, Err(AppError::MissingField(_))));
    }

    #[actix_rt::test]
    async fn test_declared_length_over_limit() {
        let req = TestRequest::post()
            .insert_header((header::CONTENT_LENGTH, "4096"))
            .to_http_request();
        let result = read_raw(&req, &mut chunks(&["x"]), 1024).await;
        assert!(matches!(
            result,
            Err(AppError::PayloadTooLarge { size: 4096, limit: 1024 })
        ));
    }

    #[test]
    fn test_is_multipart() {
        let req = TestRequest::post()
            .insert_header((header::CONTENT_TYPE, "multipart/form-data; boundary=x"))
            .to_http_request();
        assert!(is_multipart(&req));

        let req = TestRequest::post()
            .insert_header((header::CONTENT_TYPE, "application/pdf"))
            .to_http_request();
        assert!(!is_multipart(&req));
    }
}
