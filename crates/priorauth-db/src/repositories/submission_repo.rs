//! Submission repository implementation
//!
//! Provides PostgreSQL-backed storage for prior-authorization submissions.
//! Uses runtime queries (not compile-time macros) to avoid requiring a
//! database connection at build time.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use priorauth_core::{
    models::{AuthStatus, NewSubmission, Submission, SubmissionMeta, Urgency},
    traits::SubmissionRepository,
    AppError, AppResult,
};
use sqlx::{types::Json, FromRow, PgPool};
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

const SUBMISSION_SELECT_COLUMNS: &str = r#"
    id, created_at, patient_name, dob,
    payer_id, payer_name, cpt, icd10,
    urgency, status, eta_days, notes, meta
"#;

/// Database row representation of a submission
#[derive(Debug, FromRow)]
struct SubmissionRow {
    id: Uuid,
    created_at: DateTime<Utc>,
    patient_name: String,
    dob: NaiveDate,
    payer_id: String,
    payer_name: String,
    cpt: Option<String>,
    icd10: Option<String>,
    urgency: String,
    status: String,
    eta_days: i32,
    notes: Option<String>,
    meta: Json<SubmissionMeta>,
}

impl TryFrom<SubmissionRow> for Submission {
    type Error = AppError;

    fn try_from(row: SubmissionRow) -> Result<Self, Self::Error> {
        let status = AuthStatus::from_str(&row.status).ok_or_else(|| {
            AppError::Persistence(format!(
                "Submission {} has unknown status '{}'",
                row.id, row.status
            ))
        })?;
        let urgency = Urgency::from_str(&row.urgency).ok_or_else(|| {
            AppError::Persistence(format!(
                "Submission {} has unknown urgency '{}'",
                row.id, row.urgency
            ))
        })?;
        let eta_days = u32::try_from(row.eta_days).map_err(|_| {
            AppError::Persistence(format!(
                "Submission {} has negative eta_days {}",
                row.id, row.eta_days
            ))
        })?;

        Ok(Submission {
            id: row.id,
            created_at: row.created_at,
            patient_name: row.patient_name,
            dob: row.dob,
            payer_id: row.payer_id,
            payer_name: row.payer_name,
            cpt: row.cpt.filter(|c| !c.is_empty()),
            icd10: row.icd10.filter(|c| !c.is_empty()),
            urgency,
            notes: row.notes.filter(|n| !n.is_empty()),
            status,
            eta_days,
            meta: row.meta.0,
        })
    }
}

/// PostgreSQL implementation of SubmissionRepository
pub struct PgSubmissionRepository {
    pool: PgPool,
}

impl PgSubmissionRepository {
    /// Create a new submission repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubmissionRepository for PgSubmissionRepository {
    #[instrument(skip(self, submission), fields(payer_id = %submission.payer_id))]
    async fn insert(&self, submission: NewSubmission) -> AppResult<Submission> {
        let id = submission.id.unwrap_or_else(Uuid::new_v4);
        debug!("Inserting submission {}", id);

        let eta_days = i32::try_from(submission.eta_days).map_err(|_| {
            AppError::InvalidInput(format!("ETA of {} days is out of range", submission.eta_days))
        })?;

        let query = format!(
            r#"
            INSERT INTO submissions (
                id, created_at, patient_name, dob,
                payer_id, payer_name, cpt, icd10,
                urgency, status, eta_days, notes, meta
            )
            VALUES ($1, COALESCE($2, NOW()), $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {}
            "#,
            SUBMISSION_SELECT_COLUMNS
        );

        let row = sqlx::query_as::<sqlx::Postgres, SubmissionRow>(&query)
            .bind(id)
            .bind(submission.created_at)
            .bind(&submission.patient_name)
            .bind(submission.dob)
            .bind(&submission.payer_id)
            .bind(&submission.payer_name)
            .bind(&submission.cpt)
            .bind(&submission.icd10)
            .bind(submission.urgency.to_string())
            .bind(submission.status.to_string())
            .bind(eta_days)
            .bind(&submission.notes)
            .bind(Json(&submission.meta))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error inserting submission {}: {}", id, e);
                match &e {
                    sqlx::Error::Database(db) if db.is_unique_violation() => {
                        AppError::Persistence(format!("Submission {} already exists", id))
                    }
                    _ => AppError::from(e),
                }
            })?;

        let stored = Submission::try_from(row)?;
        info!(id = %stored.id, status = %stored.status, "Submission stored");

        Ok(stored)
    }

    #[instrument(skip(self))]
    async fn list_recent(&self, limit: usize) -> AppResult<Vec<Submission>> {
        debug!("Listing {} most recent submissions", limit);

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let query = format!(
            "SELECT {} FROM submissions ORDER BY created_at DESC, seq DESC LIMIT $1",
            SUBMISSION_SELECT_COLUMNS
        );

        let rows = sqlx::query_as::<sqlx::Postgres, SubmissionRow>(&query)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error listing submissions: {}", e);
                AppError::from(e)
            })?;

        rows.into_iter().map(Submission::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Submission>> {
        debug!("Finding submission by id: {}", id);

        let query = format!(
            "SELECT {} FROM submissions WHERE id = $1",
            SUBMISSION_SELECT_COLUMNS
        );

        let row = sqlx::query_as::<sqlx::Postgres, SubmissionRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error finding submission {}: {}", id, e);
                AppError::from(e)
            })?;

        row.map(Submission::try_from).transpose()
    }
}
