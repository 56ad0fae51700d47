//! Common traits for storage backends
//!
//! Defines the abstractions the intake workflow depends on: a submission
//! store and a blob store for attachment bytes. Each has an in-memory
//! implementation for tests and a durable one for production.

use crate::error::AppError;
use crate::models::{FileUpload, NewSubmission, Submission};
use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

/// Durable record of submissions
#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    /// Persist a submission, assigning `id` and `created_at` when unset
    ///
    /// Returns the stored form so storage-assigned fields are reflected back.
    /// Fails with `AppError::Persistence` when the backend is unreachable or
    /// the id is already taken.
    async fn insert(&self, submission: NewSubmission) -> Result<Submission, AppError>;

    /// Most recent `limit` submissions, newest first
    ///
    /// Ties on `created_at` are broken by insertion order, latest insert first.
    async fn list_recent(&self, limit: usize) -> Result<Vec<Submission>, AppError>;

    /// Find a submission by id
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Submission>, AppError>;
}

/// Reference returned by a blob store for a stored object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Backend identifier, usable with `BlobStore::delete`
    pub key: String,
    /// Public retrieval URL
    pub url: String,
}

/// Storage backend for attachment bytes
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store the upload and return its reference
    async fn put(&self, upload: &FileUpload) -> Result<StoredObject, AppError>;

    /// Remove a stored object; returns false when the key was unknown
    async fn delete(&self, key: &str) -> Result<bool, AppError>;
}

/// Largest page size a directory query may ask for
pub const MAX_PAGE_SIZE: usize = 50;

/// Page size used when the caller does not send one
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Pagination parameters
///
/// Out-of-range values are clamped rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub page_size: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    pub fn new(page: i64, page_size: i64) -> Self {
        Self {
            page: usize::try_from(page.max(1)).unwrap_or(1),
            page_size: usize::try_from(page_size.clamp(1, MAX_PAGE_SIZE as i64))
                .unwrap_or(DEFAULT_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.page_size)
    }

    pub fn limit(&self) -> usize {
        self.page_size
    }

    /// Slice an already-filtered list into this page
    pub fn paginate<T>(&self, items: Vec<T>) -> Page<T> {
        let total = items.len();
        let items = items
            .into_iter()
            .skip(self.offset())
            .take(self.limit())
            .collect();

        Page {
            items,
            total,
            page: self.page,
            page_size: self.page_size,
        }
    }
}

/// One page of results plus the unpaginated total
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
    pub items: Vec<T>,
}
