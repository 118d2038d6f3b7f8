use crate::application::upload::UploadError;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Errors surfaced by the HTTP handlers. Every variant maps to a status class and a
/// caller-safe message; the detailed cause only goes to the log.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error("could not read multipart body: {0}")]
    Multipart(#[from] MultipartError),

    #[error("uploaded file is {size} bytes, limit is {limit}")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error("{0}")]
    BadRequest(String),

    #[error("media delivery is not configured")]
    DeliveryNotConfigured,
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            ApiError::Upload(UploadError::Authentication) => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHENTICATED",
                "You must be logged in to upload.".to_string(),
            ),
            ApiError::Upload(err @ UploadError::Validation { .. }) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", capitalize(&err.to_string()))
            }
            ApiError::Upload(UploadError::Configuration(_)) | ApiError::DeliveryNotConfigured => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "CONFIGURATION_ERROR",
                "Media service credentials are not set.".to_string(),
            ),
            ApiError::Upload(UploadError::Ingestion(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INGESTION_FAILED",
                "Failed to upload media.".to_string(),
            ),
            ApiError::Upload(UploadError::Persistence(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "PERSISTENCE_FAILED",
                "Upload succeeded but saving the video failed.".to_string(),
            ),
            ApiError::PayloadTooLarge { .. } => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE",
                "The uploaded file is too large.".to_string(),
            ),
            ApiError::Multipart(err) if err.status() == StatusCode::PAYLOAD_TOO_LARGE => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE",
                "The uploaded file is too large.".to_string(),
            ),
            ApiError::Multipart(err) => (
                err.status(),
                "UNREADABLE_BODY",
                "Could not read the upload form.".to_string(),
            ),
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, "INVALID_REQUEST", message.clone())
            }
        }
    }
}

fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        if status.is_server_error() {
            tracing::error!(code, error = %self, "request failed");
        } else {
            tracing::warn!(code, error = %self, "request rejected");
        }

        let body = Json(serde_json::json!({
            "error": message,
            "code": code,
        }));
        (status, body).into_response()
    }
}
