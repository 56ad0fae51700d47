//! Submission model
//!
//! A prior-authorization request as persisted by the intake workflow,
//! together with the structured metadata collected from the intake form.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::Attachment;

/// Clinical urgency of the request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Urgency {
    /// Standard review
    #[default]
    Routine,
    /// Expedited review requested
    Urgent,
    /// Emergency service
    Emergent,
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Urgency::Routine => write!(f, "Routine"),
            Urgency::Urgent => write!(f, "Urgent"),
            Urgency::Emergent => write!(f, "Emergent"),
        }
    }
}

impl Urgency {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "routine" => Some(Urgency::Routine),
            "urgent" => Some(Urgency::Urgent),
            "emergent" => Some(Urgency::Emergent),
            _ => None,
        }
    }
}

/// Authorization status derived at submission time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthStatus {
    /// Payer requires prior authorization; the request is pending
    #[serde(rename = "Submitted (PA Required)")]
    PaRequired,
    /// Payer does not require prior authorization
    #[serde(rename = "Not Required")]
    NotRequired,
}

impl fmt::Display for AuthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthStatus::PaRequired => write!(f, "Submitted (PA Required)"),
            AuthStatus::NotRequired => write!(f, "Not Required"),
        }
    }
}

impl AuthStatus {
    /// Parse the stored label
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim() {
            "Submitted (PA Required)" => Some(AuthStatus::PaRequired),
            "Not Required" => Some(AuthStatus::NotRequired),
            _ => None,
        }
    }
}

/// Administrative sex as captured on the intake form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    F,
    M,
    X,
    U,
}

/// Kind of appointment the service is requested for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppointmentType {
    Office,
    Outpatient,
    Inpatient,
    Imaging,
    Telehealth,
}

/// Ordering provider details
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub npi: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub fax: String,
}

impl ProviderInfo {
    /// Trim every field
    pub fn trimmed(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            npi: self.npi.trim().to_string(),
            phone: self.phone.trim().to_string(),
            fax: self.fax.trim().to_string(),
        }
    }
}

/// Patient coverage details
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientInfo {
    #[serde(default)]
    pub member_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sex: Option<Sex>,
}

/// Appointment details
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentInfo {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub appointment_type: Option<AppointmentType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_date: Option<NaiveDate>,
}

/// Resolved procedure and diagnosis code lists
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeLists {
    #[serde(default)]
    pub cpts: Vec<String>,
    #[serde(default)]
    pub icd10s: Vec<String>,
}

/// Structured intake metadata stored alongside a submission
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionMeta {
    #[serde(default)]
    pub provider: ProviderInfo,
    #[serde(default)]
    pub patient: PatientInfo,
    #[serde(default)]
    pub appointment: AppointmentInfo,
    #[serde(default)]
    pub codes: CodeLists,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

/// Status and ETA computed from payer rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthorizationOutcome {
    pub status: AuthStatus,
    pub eta_days: u32,
}

/// A validated submission ready to be stored
///
/// `id` and `created_at` are normally left unset so the store assigns them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubmission {
    pub id: Option<Uuid>,
    pub created_at: Option<DateTime<Utc>>,
    pub patient_name: String,
    pub dob: NaiveDate,
    pub payer_id: String,
    pub payer_name: String,
    pub cpt: Option<String>,
    pub icd10: Option<String>,
    pub urgency: Urgency,
    pub notes: Option<String>,
    pub status: AuthStatus,
    pub eta_days: u32,
    pub meta: SubmissionMeta,
}

impl NewSubmission {
    /// Fix the storage-assigned fields, generating any still missing
    pub fn into_submission(self, now: DateTime<Utc>) -> Submission {
        Submission {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            created_at: self.created_at.unwrap_or(now),
            patient_name: self.patient_name,
            dob: self.dob,
            payer_id: self.payer_id,
            payer_name: self.payer_name,
            cpt: self.cpt,
            icd10: self.icd10,
            urgency: self.urgency,
            notes: self.notes,
            status: self.status,
            eta_days: self.eta_days,
            meta: self.meta,
        }
    }
}

/// Persisted prior-authorization submission
///
/// `id` and `created_at` never change after insert; `status` and `eta_days`
/// are fixed at creation. `payer_name` is a snapshot of the payer's name at
/// submission time, not a live reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub patient_name: String,
    pub dob: NaiveDate,
    pub payer_id: String,
    pub payer_name: String,
    #[serde(default)]
    pub cpt: Option<String>,
    #[serde(default)]
    pub icd10: Option<String>,
    pub urgency: Urgency,
    #[serde(default)]
    pub notes: Option<String>,
    pub status: AuthStatus,
    pub eta_days: u32,
    #[serde(default)]
    pub meta: SubmissionMeta,
}

impl Submission {
    /// Attachments recorded with this submission
    pub fn attachments(&self) -> &[Attachment] {
        &self.meta.attachments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_new_submission() -> NewSubmission {
        NewSubmission {
            id: None,
            created_at: None,
            patient_name: "Jane Doe".to_string(),
            dob: NaiveDate::from_ymd_opt(1980, 4, 12).unwrap(),
            payer_id: "bcbs-tx".to_string(),
            payer_name: "Blue Cross Blue Shield of Texas".to_string(),
            cpt: Some("70450".to_string()),
            icd10: Some("R51.9".to_string()),
            urgency: Urgency::Routine,
            notes: None,
            status: AuthStatus::PaRequired,
            eta_days: 3,
            meta: SubmissionMeta::default(),
        }
    }

    #[test]
    fn test_urgency_parsing() {
        assert_eq!(Urgency::from_str("urgent"), Some(Urgency::Urgent));
        assert_eq!(Urgency::from_str(" Emergent "), Some(Urgency::Emergent));
        assert_eq!(Urgency::from_str("stat"), None);
        assert_eq!(Urgency::default(), Urgency::Routine);
    }

    #[test]
    fn test_status_labels_round_trip() {
        for status in [AuthStatus::PaRequired, AuthStatus::NotRequired] {
            assert_eq!(AuthStatus::from_str(&status.to_string()), Some(status));
        }
        assert_eq!(
            serde_json::to_value(AuthStatus::PaRequired).unwrap(),
            "Submitted (PA Required)"
        );
    }

    #[test]
    fn test_into_submission_assigns_missing_fields() {
        let now = Utc::now();
        let submission = create_test_new_submission().into_submission(now);
        assert_eq!(submission.created_at, now);
        assert_eq!(submission.payer_id, "bcbs-tx");
    }

    #[test]
    fn test_into_submission_keeps_preset_fields() {
        let id = Uuid::new_v4();
        let created = Utc::now() - chrono::Duration::hours(1);
        let mut new = create_test_new_submission();
        new.id = Some(id);
        new.created_at = Some(created);

        let submission = new.into_submission(Utc::now());
        assert_eq!(submission.id, id);
        assert_eq!(submission.created_at, created);
    }

    #[test]
    fn test_submission_wire_format_is_camel_case() {
        let submission = create_test_new_submission().into_submission(Utc::now());
        let json = serde_json::to_value(&submission).unwrap();

        assert_eq!(json["patientName"], "Jane Doe");
        assert_eq!(json["etaDays"], 3);
        assert_eq!(json["status"], "Submitted (PA Required)");
        assert_eq!(json["dob"], "1980-04-12");
        assert!(json["meta"]["codes"]["cpts"].is_array());
    }

    #[test]
    fn test_provider_info_trimmed() {
        let provider = ProviderInfo {
            name: "  Dr. Who ".to_string(),
            npi: " 1234567890".to_string(),
            phone: String::new(),
            fax: "555 ".to_string(),
        }
        .trimmed();

        assert_eq!(provider.name, "Dr. Who");
        assert_eq!(provider.npi, "1234567890");
        assert_eq!(provider.fax, "555");
    }
}
