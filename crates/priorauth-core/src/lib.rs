//! PriorAuth Core Library
//!
//! This crate provides the foundational types, traits, and error handling
//! for the prior-authorization intake service. It includes:
//!
//! - Domain models (Payer, Submission, Attachment)
//! - Storage traits for submissions and attachment blobs
//! - Unified error handling with HTTP response mapping
//! - Application configuration

pub mod config;
pub mod error;
pub mod models;
pub mod traits;

pub use config::AppConfig;
pub use error::{AppError, FieldErrors};

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;
