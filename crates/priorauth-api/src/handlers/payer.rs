//! Payer directory handlers
//!
//! Read-only access to the payer catalog.

use crate::actor::CurrentActor;
use crate::dto::PayerSearchParams;
use actix_web::{web, HttpResponse};
use priorauth_core::AppError;
use priorauth_services::{IntakeService, PayerQuery};
use tracing::{debug, instrument};

use super::method_not_allowed;

/// Search payers
///
/// GET /api/payers?q=&state=&plan=&page=&pageSize=
#[instrument(skip(service, params, actor), fields(actor = %actor))]
pub async fn list_payers(
    service: web::Data<IntakeService>,
    params: web::Query<PayerSearchParams>,
    actor: CurrentActor,
) -> Result<HttpResponse, AppError> {
    let query = PayerQuery::from(params.into_inner());
    debug!(?query, "Searching payers");

    let page = service.search_payers(&query);
    Ok(HttpResponse::Ok().json(page))
}

/// Get a single payer by ID
///
/// GET /api/payers/{id}
#[instrument(skip(service, actor), fields(actor = %actor))]
pub async fn get_payer(
    service: web::Data<IntakeService>,
    path: web::Path<String>,
    actor: CurrentActor,
) -> Result<HttpResponse, AppError> {
    let payer = service.payer(&path)?;
    Ok(HttpResponse::Ok().json(payer))
}

/// Configure payer routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/payers")
            .route(web::get().to(list_payers))
            .default_service(web::to(method_not_allowed)),
    )
    .service(
        web::resource("/payers/{id}")
            .route(web::get().to(get_payer))
            .default_service(web::to(method_not_allowed)),
    );
}
