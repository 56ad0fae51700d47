//! Unified error handling for the intake service
//!
//! This module provides a single error type covering every failure the
//! intake workflow can surface, with automatic HTTP response mapping.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use std::collections::BTreeMap;
use thiserror::Error;

/// Field name -> human-readable message, in stable (alphabetical) order
pub type FieldErrors = BTreeMap<String, String>;

/// Main application error type
///
/// All errors in the application should be converted to this type.
/// It implements `ResponseError` for automatic HTTP response generation.
#[derive(Error, Debug)]
pub enum AppError {
    // ==================== Persistence Errors ====================
    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Database pool error: {0}")]
    Pool(String),

    // ==================== Validation Errors ====================
    #[error("Validation failed for {} field(s)", .0.len())]
    InvalidFields(FieldErrors),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    // ==================== Resource Errors ====================
    #[error("Payer not found: {0}")]
    PayerNotFound(String),

    #[error("Submission not found: {0}")]
    SubmissionNotFound(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    // ==================== Upload Errors ====================
    #[error("Payload too large: {size} bytes exceeds limit of {limit} bytes")]
    PayloadTooLarge { size: u64, limit: u64 },

    #[error("Upload failed: {0}")]
    Upload(String),

    // ==================== Internal Errors ====================
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AppError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            AppError::InvalidFields(_)
            | AppError::InvalidInput(_)
            | AppError::MissingField(_) => StatusCode::BAD_REQUEST,

            // 404 Not Found
            AppError::PayerNotFound(_) | AppError::SubmissionNotFound(_) | AppError::NotFound(_) => {
                StatusCode::NOT_FOUND
            }

            // 405 Method Not Allowed
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,

            // 413 Payload Too Large
            AppError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,

            // 502 Bad Gateway (storage backend refused the object)
            AppError::Upload(_) => StatusCode::BAD_GATEWAY,

            // 500 Internal Server Error
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Persistence(_) => "persistence_error",
            AppError::Pool(_) => "pool_error",
            AppError::InvalidFields(_) => "validation_error",
            AppError::InvalidInput(_) => "invalid_input",
            AppError::MissingField(_) => "missing_field",
            AppError::PayerNotFound(_) => "payer_not_found",
            AppError::SubmissionNotFound(_) => "submission_not_found",
            AppError::NotFound(_) => "not_found",
            AppError::MethodNotAllowed => "method_not_allowed",
            AppError::PayloadTooLarge { .. } => "payload_too_large",
            AppError::Upload(_) => "upload_error",
            AppError::Internal(_) => "internal_error",
            AppError::Config(_) => "config_error",
            AppError::Serialization(_) => "serialization_error",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        AppError::status_code(self)
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let mut body = json!({
            "ok": false,
            "error": self.error_code(),
            "message": self.to_string(),
            "status": status.as_u16(),
        });

        if let AppError::InvalidFields(fields) = self {
            body["fields"] = json!(fields);
        }

        HttpResponse::build(status).json(body)
    }
}

// ==================== From implementations ====================

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => AppError::Pool(err.to_string()),
            other => AppError::Persistence(other.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        let fields = err
            .field_errors()
            .into_iter()
            .map(|(field, errors)| {
                let message = errors
                    .iter()
                    .find_map(|e| e.message.as_ref().map(ToString::to_string))
                    .unwrap_or_else(|| format!("{} is invalid", field));
                (field.to_string(), message)
            })
            .collect();

        AppError::InvalidFields(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            AppError::InvalidFields(FieldErrors::new()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::PayerNotFound("nope".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::MethodNotAllowed.status_code(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            AppError::PayloadTooLarge {
                size: 11,
                limit: 10
            }
            .status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            AppError::Persistence("down".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(AppError::MethodNotAllowed.error_code(), "method_not_allowed");
        assert_eq!(
            AppError::Upload("refused".to_string()).error_code(),
            "upload_error"
        );
        assert_eq!(
            AppError::InvalidFields(FieldErrors::new()).error_code(),
            "validation_error"
        );
    }

    #[test]
    fn test_invalid_fields_response_lists_fields() {
        let mut fields = FieldErrors::new();
        fields.insert("dob".to_string(), "Date of birth is required.".to_string());
        fields.insert("patientName".to_string(), "Patient name is required.".to_string());

        let err = AppError::InvalidFields(fields);
        assert_eq!(err.to_string(), "Validation failed for 2 field(s)");

        let resp = err.error_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
