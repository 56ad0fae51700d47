//! Submission validation
//!
//! Turns a raw intake request into a [`ValidatedSubmission`], reporting every
//! failing field at once instead of stopping at the first problem.

use chrono::NaiveDate;
use priorauth_core::{
    models::{
        AppointmentInfo, Attachment, AuthorizationOutcome, CodeLists, NewSubmission, PatientInfo,
        Payer, ProviderInfo, SubmissionMeta, Urgency,
    },
    AppError, AppResult, FieldErrors,
};
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, instrument, warn};
use validator::Validate;

use crate::payer_directory::PayerDirectory;

/// Procedure or diagnosis codes as sent by the client
///
/// Either a comma-separated string or a JSON array of strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum CodeListInput {
    Text(String),
    List(Vec<String>),
}

impl CodeListInput {
    /// Trimmed, non-empty entries with duplicates removed (first occurrence wins)
    pub fn entries(&self) -> Vec<String> {
        let raw: Vec<&str> = match self {
            CodeListInput::Text(text) => text.split(',').collect(),
            CodeListInput::List(items) => items.iter().map(String::as_str).collect(),
        };
        dedup_codes(raw.into_iter())
    }
}

fn dedup_codes<'a>(codes: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    codes
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .filter(|c| seen.insert(c.to_string()))
        .map(str::to_string)
        .collect()
}

/// Code lists nested under `meta.codes`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CodeListsInput {
    pub cpts: Option<CodeListInput>,
    pub icd10s: Option<CodeListInput>,
}

/// Structured intake details sent with a request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MetaInput {
    pub provider: ProviderInfo,
    pub patient: PatientInfo,
    pub appointment: AppointmentInfo,
    pub codes: CodeListsInput,
    pub attachments: Vec<Attachment>,
}

/// Raw submission request, as received from the client
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRequest {
    #[validate(length(max = 200, message = "Patient name must be at most 200 characters."))]
    pub patient_name: Option<String>,

    pub dob: Option<String>,

    pub payer_id: Option<String>,

    pub cpt: Option<String>,

    pub icd10: Option<String>,

    #[serde(alias = "cptList")]
    pub cpts: Option<CodeListInput>,

    #[serde(alias = "icdList")]
    pub icd10s: Option<CodeListInput>,

    pub urgency: Option<String>,

    #[validate(length(max = 4000, message = "Notes must be at most 4000 characters."))]
    pub notes: Option<String>,

    #[serde(default)]
    pub meta: Option<MetaInput>,
}

/// A request that passed every rule, with its payer resolved
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedSubmission {
    pub patient_name: String,
    pub dob: NaiveDate,
    pub payer: Payer,
    pub urgency: Urgency,
    pub notes: Option<String>,
    pub meta: SubmissionMeta,
}

impl ValidatedSubmission {
    /// Primary procedure code: the first resolved CPT
    pub fn primary_cpt(&self) -> Option<&str> {
        self.meta.codes.cpts.first().map(String::as_str)
    }

    /// Primary diagnosis code: the first resolved ICD-10
    pub fn primary_icd10(&self) -> Option<&str> {
        self.meta.codes.icd10s.first().map(String::as_str)
    }

    /// Combine with the resolved outcome into a storable record
    pub fn into_new_submission(self, outcome: AuthorizationOutcome) -> NewSubmission {
        NewSubmission {
            id: None,
            created_at: None,
            cpt: self.primary_cpt().map(str::to_string),
            icd10: self.primary_icd10().map(str::to_string),
            patient_name: self.patient_name,
            dob: self.dob,
            payer_id: self.payer.id,
            payer_name: self.payer.name,
            urgency: self.urgency,
            notes: self.notes,
            status: outcome.status,
            eta_days: outcome.eta_days,
            meta: self.meta,
        }
    }
}

/// Whether `code` is exactly five ASCII digits
pub fn is_valid_cpt(code: &str) -> bool {
    code.len() == 5 && code.bytes().all(|b| b.is_ascii_digit())
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// `patient_name` -> `patientName`
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for ch in field.chars() {
        if ch == '_' {
            upper = true;
        } else if upper {
            out.extend(ch.to_uppercase());
            upper = false;
        } else {
            out.push(ch);
        }
    }
    out
}

/// Applies the intake rules against the payer directory
pub struct SubmissionValidator {
    directory: Arc<PayerDirectory>,
    max_attachment_bytes: u64,
}

impl SubmissionValidator {
    pub fn new(directory: Arc<PayerDirectory>, max_attachment_bytes: u64) -> Self {
        Self {
            directory,
            max_attachment_bytes,
        }
    }

    /// Check every rule, returning all failures together as `InvalidFields`
    #[instrument(skip(self, request))]
    pub fn validate(&self, request: &SubmissionRequest) -> AppResult<ValidatedSubmission> {
        let mut errors = FieldErrors::new();

        if let Err(e) = request.validate() {
            if let AppError::InvalidFields(fields) = AppError::from(e) {
                errors.extend(fields.into_iter().map(|(k, v)| (camel_case(&k), v)));
            }
        }

        let patient_name = non_blank(request.patient_name.as_deref());
        if patient_name.is_none() {
            errors.insert("patientName".into(), "Patient name is required.".into());
        }

        let dob = match non_blank(request.dob.as_deref()) {
            None => {
                errors.insert("dob".into(), "Date of birth is required.".into());
                None
            }
            Some(raw) => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
                Ok(date) => Some(date),
                Err(_) => {
                    errors.insert(
                        "dob".into(),
                        "Date of birth must be a valid date (YYYY-MM-DD).".into(),
                    );
                    None
                }
            },
        };

        let payer = match non_blank(request.payer_id.as_deref()) {
            None => {
                errors.insert("payerId".into(), "Please select a payer.".into());
                None
            }
            Some(id) => match self.directory.get(id) {
                Some(payer) => Some(payer.clone()),
                None => {
                    errors.insert("payerId".into(), format!("Unknown payer: {}", id));
                    None
                }
            },
        };

        let meta = request.meta.clone().unwrap_or_default();

        let primary_cpt = non_blank(request.cpt.as_deref());
        if primary_cpt.is_some_and(|c| !is_valid_cpt(c)) {
            errors.insert("cpt".into(), "CPT must be 5 digits (e.g., 70450).".into());
        }

        let cpt_list = merge_lists(request.cpts.as_ref(), meta.codes.cpts.as_ref());
        let bad_cpts: Vec<&str> = cpt_list
            .iter()
            .map(String::as_str)
            .filter(|c| !is_valid_cpt(c))
            .collect();
        if !bad_cpts.is_empty() {
            errors.insert(
                "cpts".into(),
                format!("Each CPT must be 5 digits; invalid: {}", bad_cpts.join(", ")),
            );
        }

        let cpts = resolve_codes(cpt_list, primary_cpt);

        let icd_list = merge_lists(request.icd10s.as_ref(), meta.codes.icd10s.as_ref());
        let upper: Vec<String> = resolve_codes(icd_list, non_blank(request.icd10.as_deref()))
            .iter()
            .map(|c| c.to_uppercase())
            .collect();
        let icd10s = dedup_codes(upper.iter().map(String::as_str));

        let urgency = match non_blank(request.urgency.as_deref()) {
            None => Urgency::default(),
            Some(raw) => Urgency::from_str(raw).unwrap_or_else(|| {
                errors.insert(
                    "urgency".into(),
                    "Urgency must be Routine, Urgent, or Emergent.".into(),
                );
                Urgency::default()
            }),
        };

        if let Some(message) = meta
            .attachments
            .iter()
            .find_map(|a| a.validate(self.max_attachment_bytes).err())
        {
            errors.insert("attachments".into(), message);
        }

        match (patient_name, dob, payer) {
            (Some(name), Some(dob), Some(payer)) if errors.is_empty() => {
                debug!(payer_id = %payer.id, cpts = cpts.len(), "Submission request valid");
                Ok(ValidatedSubmission {
                    patient_name: name.to_string(),
                    dob,
                    payer,
                    urgency,
                    notes: non_blank(request.notes.as_deref()).map(str::to_string),
                    meta: SubmissionMeta {
                        provider: meta.provider.trimmed(),
                        patient: PatientInfo {
                            member_id: meta.patient.member_id.trim().to_string(),
                            sex: meta.patient.sex,
                        },
                        appointment: meta.appointment,
                        codes: CodeLists { cpts, icd10s },
                        attachments: meta.attachments,
                    },
                })
            }
            _ => {
                warn!(fields = ?errors.keys().collect::<Vec<_>>(), "Submission request rejected");
                Err(AppError::InvalidFields(errors))
            }
        }
    }
}

/// Top-level entries followed by those under `meta.codes`, deduplicated
fn merge_lists(top: Option<&CodeListInput>, nested: Option<&CodeListInput>) -> Vec<String> {
    let entries: Vec<String> = [top, nested]
        .into_iter()
        .flatten()
        .flat_map(CodeListInput::entries)
        .collect();
    dedup_codes(entries.iter().map(String::as_str))
}

/// The list when it has entries, otherwise the primary value alone
fn resolve_codes(list: Vec<String>, primary: Option<&str>) -> Vec<String> {
    if !list.is_empty() {
        return list;
    }
    primary.map(|p| vec![p.to_string()]).unwrap_or_default()
}
