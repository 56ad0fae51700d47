//! Domain models for the intake workflow
//!
//! This module contains the core domain models used throughout the application.

pub mod attachment;
pub mod payer;
pub mod submission;

pub use attachment::{Attachment, FileUpload, DEFAULT_CONTENT_TYPE, MAX_ATTACHMENT_BYTES};
pub use payer::Payer;
pub use submission::{
    AppointmentInfo, AppointmentType, AuthStatus, AuthorizationOutcome, CodeLists,
    NewSubmission, PatientInfo, ProviderInfo, Sex, Submission, SubmissionMeta, Urgency,
};
