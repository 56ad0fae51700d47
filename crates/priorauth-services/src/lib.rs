//! Intake workflow services
//!
//! - [`PayerDirectory`]: read-only payer catalog and search
//! - [`SubmissionValidator`]: field-by-field request validation
//! - [`AuthorizationResolver`]: status/ETA from payer rules
//! - [`AttachmentTracker`] and the blob stores: attachment storage
//! - [`IntakeService`]: the pipeline tying them together

pub mod attachments;
pub mod blob_store;
pub mod intake;
pub mod payer_directory;
pub mod resolver;
pub mod validation;

pub use attachments::AttachmentTracker;
pub use blob_store::{FileSystemBlobStore, InMemoryBlobStore};
pub use intake::IntakeService;
pub use payer_directory::{PayerDirectory, PayerQuery};
pub use resolver::AuthorizationResolver;
pub use validation::{
    CodeListInput, MetaInput, SubmissionRequest, SubmissionValidator, ValidatedSubmission,
};

/// Service name reported by the health endpoint
pub const SERVICE_NAME: &str = "priorauth";

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
