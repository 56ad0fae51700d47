//! API layer for the prior-authorization intake service
//!
//! HTTP handlers for the payer directory, submission intake and
//! attachment uploads, all mounted under `/api`.

#![forbid(unsafe_code)]

pub mod actor;
pub mod dto;
pub mod handlers;
pub mod multipart;

use actix_web::web;
use priorauth_core::AppError;
use tracing::warn;

pub use actor::CurrentActor;
pub use dto::{HealthResponse, ItemsResponse, UploadResponse};
pub use handlers::{
    configure_health, configure_payers, configure_submissions, configure_uploads,
};

/// Largest JSON body accepted for a submission
pub const JSON_BODY_LIMIT: usize = 1024 * 1024;

/// JSON extractor settings: size limit and a JSON 400 on malformed bodies
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_BODY_LIMIT)
        .error_handler(|err, _req| {
            warn!("Rejected JSON body: {}", err);
            AppError::InvalidInput(err.to_string()).into()
        })
}

/// Query extractor settings: a JSON 400 on malformed query strings
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        warn!("Rejected query string: {}", err);
        AppError::InvalidInput(err.to_string()).into()
    })
}

/// Mount every API route under `/api`
///
/// Expects `web::Data<IntakeService>` and `web::Data<IntakeConfig>` to be
/// registered on the application.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(json_config())
            .app_data(query_config())
            .configure(configure_health)
            .configure(configure_payers)
            .configure(configure_submissions)
            .configure(configure_uploads)
            .default_service(web::to(handlers::not_found)),
    );
}
