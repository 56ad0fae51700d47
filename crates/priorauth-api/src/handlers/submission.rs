//! Submission handlers
//!
//! HTTP handlers for the prior-authorization intake endpoints.

use crate::actor::CurrentActor;
use crate::dto::{ItemsResponse, SubmissionCreatedResponse, SubmissionListParams};
use crate::multipart::read_form;
use actix_multipart::Multipart;
use actix_web::{web, HttpRequest, HttpResponse};
use priorauth_core::{config::IntakeConfig, AppError};
use priorauth_services::{IntakeService, SubmissionRequest};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::method_not_allowed;

/// Form field holding the submission JSON in a multipart intake
pub const SUBMISSION_FIELD: &str = "submission";

/// List recent submissions, newest first
///
/// GET /api/submissions?limit=N
#[instrument(skip(service, intake, actor), fields(actor = %actor))]
pub async fn list_submissions(
    service: web::Data<IntakeService>,
    intake: web::Data<IntakeConfig>,
    params: web::Query<SubmissionListParams>,
    actor: CurrentActor,
) -> Result<HttpResponse, AppError> {
    let limit = intake.list_limit(params.limit);
    debug!(limit, "Listing submissions");

    let items = service.list_recent(limit).await?;
    Ok(HttpResponse::Ok().json(ItemsResponse::new(items)))
}

/// Get a single submission by ID
///
/// GET /api/submissions/{id}
#[instrument(skip(service, actor), fields(actor = %actor))]
pub async fn get_submission(
    service: web::Data<IntakeService>,
    path: web::Path<String>,
    actor: CurrentActor,
) -> Result<HttpResponse, AppError> {
    let id = Uuid::parse_str(path.trim())
        .map_err(|_| AppError::SubmissionNotFound(path.to_string()))?;

    let submission = service.find(id).await?;
    Ok(HttpResponse::Ok().json(submission))
}

/// Create a submission
///
/// POST /api/submissions
#[instrument(skip(service, req, actor), fields(actor = %actor))]
pub async fn create_submission(
    service: web::Data<IntakeService>,
    req: web::Json<SubmissionRequest>,
    actor: CurrentActor,
) -> Result<HttpResponse, AppError> {
    let submission = service.submit(&req).await?;

    info!(id = %submission.id, status = %submission.status, "Submission accepted");
    Ok(HttpResponse::Created().json(SubmissionCreatedResponse::from(submission)))
}

/// Create a submission together with its files
///
/// POST /api/submissions/with-attachments
///
/// Multipart form: a `submission` part with the JSON request and any
/// number of `file` parts.
#[instrument(skip(service, req, payload, actor), fields(actor = %actor))]
pub async fn create_submission_with_attachments(
    service: web::Data<IntakeService>,
    req: HttpRequest,
    payload: web::Payload,
    actor: CurrentActor,
) -> Result<HttpResponse, AppError> {
    let form = read_form(
        Multipart::new(req.headers(), payload),
        service.max_attachment_bytes(),
    )
    .await?;

    let body = form
        .field(SUBMISSION_FIELD)
        .ok_or_else(|| AppError::MissingField(SUBMISSION_FIELD.to_string()))?;
    let request: SubmissionRequest = serde_json::from_slice(body).map_err(|e| {
        warn!("Submission part is not valid JSON: {}", e);
        AppError::InvalidInput(format!("Invalid submission JSON: {}", e))
    })?;

    debug!(files = form.files.len(), "Submitting with attachments");
    let submission = service.submit_with_uploads(&request, form.files).await?;

    info!(
        id = %submission.id,
        attachments = submission.attachments().len(),
        "Submission with attachments accepted"
    );
    Ok(HttpResponse::Created().json(SubmissionCreatedResponse::from(submission)))
}

/// Configure submission routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/submissions")
            .route(web::get().to(list_submissions))
            .route(web::post().to(create_submission))
            .default_service(web::to(method_not_allowed)),
    )
    .service(
        web::resource("/submissions/with-attachments")
            .route(web::post().to(create_submission_with_attachments))
            .default_service(web::to(method_not_allowed)),
    )
    .service(
        web::resource("/submissions/{id}")
            .route(web::get().to(get_submission))
            .default_service(web::to(method_not_allowed)),
    );
}
