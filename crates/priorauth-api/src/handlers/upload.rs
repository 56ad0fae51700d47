//! Attachment upload handler
//!
//! Accepts either a multipart form with a `file` field or the raw file bytes
//! as the request body. The stored file's metadata is returned so the
//! client can reference it from a later submission.

use crate::actor::CurrentActor;
use crate::dto::UploadResponse;
use crate::multipart::{is_multipart, read_form, read_raw};
use actix_multipart::Multipart;
use actix_web::{web, HttpRequest, HttpResponse};
use priorauth_core::AppError;
use priorauth_services::IntakeService;
use tracing::{info, instrument, warn};

use super::method_not_allowed;

/// Store one attachment
///
/// POST /api/upload
#[instrument(skip(req, payload, service, actor), fields(actor = %actor))]
pub async fn upload(
    req: HttpRequest,
    mut payload: web::Payload,
    service: web::Data<IntakeService>,
    actor: CurrentActor,
) -> Result<HttpResponse, AppError> {
    let limit = service.max_attachment_bytes();

    let file = if is_multipart(&req) {
        let form = read_form(Multipart::new(req.headers(), payload), limit).await?;
        form.files.into_iter().next().ok_or_else(|| {
            warn!("Upload form carried no file");
            AppError::MissingField("file".to_string())
        })?
    } else {
        read_raw(&req, &mut payload, limit).await?
    };

    let attachment = service.record_attachment(&file).await?;
    info!(key = %attachment.key, size = attachment.size, "Upload stored");

    Ok(HttpResponse::Ok().json(UploadResponse::from(attachment)))
}

/// Configure upload routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/upload")
            .route(web::post().to(upload))
            .default_service(web::to(method_not_allowed)),
    );
}
