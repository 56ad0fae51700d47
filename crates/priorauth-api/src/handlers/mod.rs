//! HTTP request handlers

pub mod health;
pub mod payer;
pub mod submission;
pub mod upload;

use actix_web::HttpResponse;
use priorauth_core::AppError;

pub use health::configure as configure_health;
pub use payer::configure as configure_payers;
pub use submission::configure as configure_submissions;
pub use upload::configure as configure_uploads;

/// Fallback for unsupported verbs on a known resource
pub async fn method_not_allowed() -> Result<HttpResponse, AppError> {
    Err(AppError::MethodNotAllowed)
}

/// Fallback for unknown paths under the API scope
pub async fn not_found() -> Result<HttpResponse, AppError> {
    Err(AppError::NotFound("No such endpoint".to_string()))
}
