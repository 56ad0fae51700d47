//! PriorAuth intake server
//!
//! Prior-authorization intake desk: payer directory, submission intake with
//! payer-rule resolution, and attachment uploads.

use actix_cors::Cors;
use actix_web::{http::header, middleware, web, App, HttpResponse, HttpServer};
use priorauth_core::{
    config::{AppConfig, CorsConfig, LogConfig},
    traits::SubmissionRepository,
};
use priorauth_db::{create_pool, ensure_schema, InMemorySubmissionRepository, PgSubmissionRepository};
use priorauth_services::{AttachmentTracker, FileSystemBlobStore, IntakeService, PayerDirectory};
use std::env;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging
fn init_tracing(log: &LogConfig) {
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| log.level.clone());

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "priorauth={lvl},priorauth_api={lvl},priorauth_services={lvl},priorauth_db={lvl},actix_web=info,sqlx=warn",
            lvl = log_level
        ))
    });

    let registry = tracing_subscriber::registry().with(env_filter);

    if log.json {
        registry
            .with(fmt::layer().json().with_current_span(true))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .init();
    }
}

/// Build the CORS policy from configuration
fn build_cors(config: &CorsConfig) -> Cors {
    let cors = if config.allows_any() {
        Cors::default().allow_any_origin()
    } else {
        config
            .origin_list()
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
    };

    cors.allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
        .allowed_header("x-filename")
        .allowed_header("x-file-type")
        .allowed_header("x-actor")
        .max_age(3600)
}

/// Pick the submission store: PostgreSQL when a URL is configured,
/// otherwise a capped in-memory store
async fn build_repository(config: &AppConfig) -> Arc<dyn SubmissionRepository> {
    match config.database.url.as_deref() {
        Some(url) => {
            info!("Connecting to database...");
            let pool = create_pool(
                url,
                Some(config.database.max_connections),
                Some(config.database.acquire_timeout_secs),
            )
            .await
            .expect("Failed to create database pool");

            ensure_schema(&pool)
                .await
                .expect("Failed to prepare database schema");

            info!(
                "Database connection established with {} max connections",
                config.database.max_connections
            );
            Arc::new(PgSubmissionRepository::new(pool))
        }
        None => {
            warn!(
                "No database configured; submissions are kept in memory (last {} only)",
                config.intake.retention_cap
            );
            Arc::new(InMemorySubmissionRepository::new(config.intake.retention_cap))
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().expect("Invalid configuration");

    init_tracing(&config.log);

    info!("Starting PriorAuth intake server v{}", env!("CARGO_PKG_VERSION"));

    let directory = match config.payers.catalog_path.as_deref() {
        Some(path) => PayerDirectory::from_json_file(path),
        None => PayerDirectory::builtin(),
    }
    .expect("Failed to load payer catalog");
    info!("Payer directory ready with {} payers", directory.len());

    let repository = build_repository(&config).await;

    let blob_store = FileSystemBlobStore::new(
        &config.storage.upload_dir,
        config.storage.public_base_url.clone(),
    )
    .await
    .expect("Failed to prepare upload directory");
    let upload_dir = blob_store.root().to_path_buf();

    let service = web::Data::new(IntakeService::new(
        Arc::new(directory),
        repository,
        AttachmentTracker::new(Arc::new(blob_store), config.storage.max_upload_bytes),
    ));
    let intake_config = web::Data::new(config.intake.clone());

    let bind_addr = config.server_addr();
    let workers = config.server.workers.max(1);
    info!(
        "Starting HTTP server on {} with {} workers",
        bind_addr, workers
    );

    let cors_config = config.cors.clone();

    HttpServer::new(move || {
        App::new()
            .app_data(service.clone())
            .app_data(intake_config.clone())
            // Middleware
            .wrap(build_cors(&cors_config))
            .wrap(middleware::Logger::new("%a \"%r\" %s %b %Dms"))
            .wrap(TracingLogger::default())
            .wrap(middleware::Compress::default())
            .wrap(middleware::NormalizePath::trim())
            // API routes
            .configure(priorauth_api::configure)
            // Stored attachments, read-only
            .service(actix_files::Files::new("/files", upload_dir.clone()))
            // Root redirect to health
            .route(
                "/",
                web::get().to(|| async {
                    HttpResponse::Found()
                        .append_header(("Location", "/api/health"))
                        .finish()
                }),
            )
    })
    .workers(workers)
    .bind(&bind_addr)?
    .run()
    .await
}
