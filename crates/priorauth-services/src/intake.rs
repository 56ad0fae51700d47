//! Intake workflow
//!
//! Runs each submission as one sequential pipeline:
//! validate -> resolve payer rules -> store attachments -> persist.
//! A failure at any step aborts the submission; attachments stored along
//! the way are deleted again so no partial submission remains.

use priorauth_core::{
    models::{Attachment, FileUpload, Payer, Submission},
    traits::{Page, SubmissionRepository},
    AppError, AppResult,
};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::attachments::AttachmentTracker;
use crate::payer_directory::{PayerDirectory, PayerQuery};
use crate::resolver::AuthorizationResolver;
use crate::validation::{SubmissionRequest, SubmissionValidator, ValidatedSubmission};

/// Entry point for every intake operation
pub struct IntakeService {
    directory: Arc<PayerDirectory>,
    validator: SubmissionValidator,
    resolver: AuthorizationResolver,
    repository: Arc<dyn SubmissionRepository>,
    attachments: AttachmentTracker,
}

impl IntakeService {
    pub fn new(
        directory: Arc<PayerDirectory>,
        repository: Arc<dyn SubmissionRepository>,
        attachments: AttachmentTracker,
    ) -> Self {
        let validator = SubmissionValidator::new(directory.clone(), attachments.max_bytes());
        Self {
            directory,
            validator,
            resolver: AuthorizationResolver::new(),
            repository,
            attachments,
        }
    }

    /// Per-file attachment limit in bytes
    pub fn max_attachment_bytes(&self) -> u64 {
        self.attachments.max_bytes()
    }

    /// Search the payer directory
    pub fn search_payers(&self, query: &PayerQuery) -> Page<Payer> {
        self.directory.search(query)
    }

    /// Look up one payer
    pub fn payer(&self, id: &str) -> AppResult<&Payer> {
        self.directory.require(id)
    }

    /// Validate, resolve and persist a submission whose attachments (if any)
    /// were uploaded beforehand
    #[instrument(skip(self, request))]
    pub async fn submit(&self, request: &SubmissionRequest) -> AppResult<Submission> {
        let validated = self.validator.validate(request)?;
        self.persist(validated).await
    }

    /// Same as [`submit`](Self::submit), storing `uploads` first
    ///
    /// Every file is size-checked before any is stored. Uploads run in
    /// order; if one fails, or persisting fails, the files already stored
    /// are deleted and nothing is recorded.
    #[instrument(skip(self, request, uploads), fields(files = uploads.len()))]
    pub async fn submit_with_uploads(
        &self,
        request: &SubmissionRequest,
        uploads: Vec<FileUpload>,
    ) -> AppResult<Submission> {
        let mut validated = self.validator.validate(request)?;

        for upload in &uploads {
            self.attachments.check_size(upload.size())?;
        }

        let mut stored: Vec<Attachment> = Vec::with_capacity(uploads.len());
        for upload in &uploads {
            match self.attachments.record(upload).await {
                Ok(attachment) => stored.push(attachment),
                Err(e) => {
                    warn!(
                        name = %upload.name,
                        "Upload failed after {} of {} files, rolling back: {}",
                        stored.len(),
                        uploads.len(),
                        e
                    );
                    self.attachments.discard(&stored).await;
                    return Err(e);
                }
            }
        }

        validated.meta.attachments.extend(stored.iter().cloned());

        match self.persist(validated).await {
            Ok(submission) => Ok(submission),
            Err(e) => {
                self.attachments.discard(&stored).await;
                Err(e)
            }
        }
    }

    /// Store a single upload on its own, ahead of a later submission
    pub async fn record_attachment(&self, upload: &FileUpload) -> AppResult<Attachment> {
        self.attachments.record(upload).await
    }

    /// Most recent submissions, newest first
    #[instrument(skip(self))]
    pub async fn list_recent(&self, limit: usize) -> AppResult<Vec<Submission>> {
        self.repository.list_recent(limit).await
    }

    /// Look up one submission
    #[instrument(skip(self))]
    pub async fn find(&self, id: Uuid) -> AppResult<Submission> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::SubmissionNotFound(id.to_string()))
    }

    async fn persist(&self, validated: ValidatedSubmission) -> AppResult<Submission> {
        let outcome = self.resolver.resolve(&validated, &validated.payer);
        debug!(status = %outcome.status, eta_days = outcome.eta_days, "Persisting submission");

        let submission = self
            .repository
            .insert(validated.into_new_submission(outcome))
            .await
            .map_err(|e| {
                error!("Failed to persist submission: {}", e);
                e
            })?;

        info!(
            id = %submission.id,
            payer_id = %submission.payer_id,
            status = %submission.status,
            attachments = submission.attachments().len(),
            "Submission created"
        );
        Ok(submission)
    }
}
