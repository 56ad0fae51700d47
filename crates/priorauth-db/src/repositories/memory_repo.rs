//! In-memory submission repository
//!
//! Non-durable store used when no database is configured and in tests.
//! Keeps at most `retention_cap` records; the oldest are dropped first.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use priorauth_core::{
    models::{NewSubmission, Submission},
    traits::SubmissionRepository,
    AppError, AppResult,
};
use std::collections::VecDeque;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

/// Default number of records retained
pub const DEFAULT_RETENTION_CAP: usize = 50;

/// Submission store backed by a bounded deque, newest first
pub struct InMemorySubmissionRepository {
    records: RwLock<VecDeque<Submission>>,
    retention_cap: usize,
}

impl Default for InMemorySubmissionRepository {
    fn default() -> Self {
        Self::new(DEFAULT_RETENTION_CAP)
    }
}

impl InMemorySubmissionRepository {
    /// Create a store retaining at most `retention_cap` records (minimum 1)
    pub fn new(retention_cap: usize) -> Self {
        let retention_cap = retention_cap.max(1);
        Self {
            records: RwLock::new(VecDeque::with_capacity(retention_cap)),
            retention_cap,
        }
    }

    /// Number of records currently retained
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Whether the store holds no records
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[async_trait]
impl SubmissionRepository for InMemorySubmissionRepository {
    #[instrument(skip(self, submission), fields(payer_id = %submission.payer_id))]
    async fn insert(&self, submission: NewSubmission) -> AppResult<Submission> {
        let stored = submission.into_submission(Utc::now());
        let mut records = self.records.write();

        if records.iter().any(|s| s.id == stored.id) {
            warn!(id = %stored.id, "Duplicate submission id rejected");
            return Err(AppError::Persistence(format!(
                "Submission {} already exists",
                stored.id
            )));
        }

        // Newest first; an equal timestamp goes ahead of earlier inserts
        let position = records
            .iter()
            .position(|s| s.created_at <= stored.created_at)
            .unwrap_or(records.len());
        records.insert(position, stored.clone());

        while records.len() > self.retention_cap {
            if let Some(dropped) = records.pop_back() {
                debug!(id = %dropped.id, "Retention cap reached, dropping oldest submission");
            }
        }

        Ok(stored)
    }

    #[instrument(skip(self))]
    async fn list_recent(&self, limit: usize) -> AppResult<Vec<Submission>> {
        Ok(self.records.read().iter().take(limit).cloned().collect())
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Submission>> {
        Ok(self.records.read().iter().find(|s| s.id == id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, NaiveDate};
    use priorauth_core::models::{AuthStatus, SubmissionMeta, Urgency};

    fn create_test_submission(name: &str, created_at: Option<DateTime<Utc>>) -> NewSubmission {
        NewSubmission {
            id: None,
            created_at,
            patient_name: name.to_string(),
            dob: NaiveDate::from_ymd_opt(1975, 1, 30).unwrap(),
            payer_id: "uhc-south".to_string(),
            payer_name: "UnitedHealthcare South Region".to_string(),
            cpt: Some("72148".to_string()),
            icd10: Some("M54.5".to_string()),
            urgency: Urgency::Urgent,
            notes: Some("MRI lumbar".to_string()),
            status: AuthStatus::PaRequired,
            eta_days: 4,
            meta: SubmissionMeta::default(),
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_id_and_timestamp() {
        let repo = InMemorySubmissionRepository::default();
        let before = Utc::now();
        let stored = repo.insert(create_test_submission("A", None)).await.unwrap();

        assert!(stored.created_at >= before);
        assert_eq!(repo.find_by_id(stored.id).await.unwrap(), Some(stored));
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected() {
        let repo = InMemorySubmissionRepository::default();
        let id = Uuid::new_v4();

        let mut first = create_test_submission("A", None);
        first.id = Some(id);
        repo.insert(first).await.unwrap();

        let mut second = create_test_submission("B", None);
        second.id = Some(id);
        let result = repo.insert(second).await;

        assert!(matches!(result, Err(AppError::Persistence(_))));
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn test_list_orders_by_created_at_desc() {
        let repo = InMemorySubmissionRepository::default();
        let now = Utc::now();

        repo.insert(create_test_submission("middle", Some(now - Duration::minutes(5))))
            .await
            .unwrap();
        repo.insert(create_test_submission("newest", Some(now)))
            .await
            .unwrap();
        repo.insert(create_test_submission("oldest", Some(now - Duration::minutes(10))))
            .await
            .unwrap();

        let names: Vec<String> = repo
            .list_recent(10)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.patient_name)
            .collect();
        assert_eq!(names, vec!["newest", "middle", "oldest"]);
    }

    #[tokio::test]
    async fn test_ties_list_latest_insert_first() {
        let repo = InMemorySubmissionRepository::default();
        let at = Utc::now();

        repo.insert(create_test_submission("first", Some(at))).await.unwrap();
        repo.insert(create_test_submission("second", Some(at))).await.unwrap();

        let recent = repo.list_recent(2).await.unwrap();
        assert_eq!(recent[0].patient_name, "second");
        assert_eq!(recent[1].patient_name, "first");
    }

    #[tokio::test]
    async fn test_retention_cap_keeps_most_recent() {
        let repo = InMemorySubmissionRepository::new(5);
        let start = Utc::now();

        for i in 0..8 {
            let at = start + Duration::seconds(i);
            repo.insert(create_test_submission(&format!("p{}", i), Some(at)))
                .await
                .unwrap();
        }

        let recent = repo.list_recent(50).await.unwrap();
        let names: Vec<&str> = recent.iter().map(|s| s.patient_name.as_str()).collect();
        assert_eq!(names, vec!["p7", "p6", "p5", "p4", "p3"]);
        assert_eq!(repo.len(), 5);
    }

    #[tokio::test]
    async fn test_list_respects_limit() {
        let repo = InMemorySubmissionRepository::default();
        for i in 0..4 {
            repo.insert(create_test_submission(&format!("p{}", i), None))
                .await
                .unwrap();
        }

        assert_eq!(repo.list_recent(2).await.unwrap().len(), 2);
        assert!(repo.list_recent(0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_repeated_reads_are_stable() {
        let repo = InMemorySubmissionRepository::default();
        let stored = repo.insert(create_test_submission("A", None)).await.unwrap();

        let first = repo.list_recent(1).await.unwrap();
        let second = repo.list_recent(1).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first[0].id, stored.id);
        assert_eq!(first[0].created_at, stored.created_at);
    }
}
