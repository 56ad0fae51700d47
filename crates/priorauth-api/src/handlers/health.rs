//! Health check handler

use crate::dto::HealthResponse;
use actix_web::{web, HttpResponse};
use chrono::Utc;
use priorauth_services::{SERVICE_NAME, VERSION};

use super::method_not_allowed;

/// Liveness probe
///
/// GET /api/health
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        time: Utc::now().to_rfc3339(),
        service: SERVICE_NAME.to_string(),
        version: VERSION.to_string(),
    })
}

/// Configure health routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/health")
            .route(web::get().to(health))
            .default_service(web::to(method_not_allowed)),
    );
}
