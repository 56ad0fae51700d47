//! Submission DTOs

use priorauth_core::models::Submission;
use serde::{Deserialize, Serialize};

use super::common::deserialize_optional_number;

/// Query parameters for `GET /api/submissions`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmissionListParams {
    /// Maximum number of records, newest first
    #[serde(default, deserialize_with = "deserialize_optional_number")]
    pub limit: Option<i64>,
}

/// Body returned after a submission is stored
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionCreatedResponse {
    pub ok: bool,
    pub record: Submission,
}

impl From<Submission> for SubmissionCreatedResponse {
    fn from(record: Submission) -> Self {
        Self { ok: true, record }
    }
}
