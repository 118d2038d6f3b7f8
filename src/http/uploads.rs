use super::error::ApiError;
use super::AppState;
use crate::application::upload::{ImageUpload, UploadedFile, VideoUpload};
use crate::domain::Caller;
use crate::ports::ingestion::MediaIngestionPort;
use crate::ports::repository::VideoRepository;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub public_id: String,
    /// Delivery URL of the stored image. Videos are fetched through the listing instead.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub message: &'static str,
}

/// Fields of one multipart form, buffered.
#[derive(Debug, Default)]
struct FormFields {
    file: Option<UploadedFile>,
    text: HashMap<String, String>,
}

impl FormFields {
    fn take_text(&mut self, name: &str) -> Option<String> {
        self.text.remove(name)
    }
}

/// Reads the whole form. A request that is not multipart at all yields an empty form,
/// so the caller gets a validation error naming the missing fields.
/// A file larger than `max_file_bytes` is refused with `PayloadTooLarge`.
async fn read_form(
    multipart: Result<Multipart, MultipartRejection>,
    max_file_bytes: usize,
) -> Result<FormFields, ApiError> {
    let mut form = FormFields::default();
    let mut multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => {
            tracing::debug!(%rejection, "request body is not multipart");
            return Ok(form);
        }
    };

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        if name == "file" {
            let file_name = field.file_name().map(str::to_owned);
            let content_type = field.content_type().map(str::to_owned);
            let data = field.bytes().await?;
            if data.len() > max_file_bytes {
                return Err(ApiError::PayloadTooLarge {
                    size: data.len(),
                    limit: max_file_bytes,
                });
            }
            form.file = Some(UploadedFile {
                file_name,
                content_type,
                data,
            });
        } else {
            let value = field.text().await?;
            form.text.insert(name, value);
        }
    }
    Ok(form)
}

pub async fn upload_image<I, R>(
    State(state): State<AppState<I, R>>,
    caller: Option<Extension<Caller>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError>
where
    I: MediaIngestionPort + 'static,
    R: VideoRepository + 'static,
{
    let caller = caller.map(|Extension(caller)| caller);
    state.uploads.preflight(caller.as_ref())?;

    let form = read_form(multipart, state.max_upload_bytes).await?;
    let asset = state
        .uploads
        .upload_image(caller.as_ref(), ImageUpload { file: form.file })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            public_id: asset.public_id,
            url: asset.secure_url,
            message: "Image uploaded successfully",
        }),
    ))
}

pub async fn upload_video<I, R>(
    State(state): State<AppState<I, R>>,
    caller: Option<Extension<Caller>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError>
where
    I: MediaIngestionPort + 'static,
    R: VideoRepository + 'static,
{
    let caller = caller.map(|Extension(caller)| caller);
    state.uploads.preflight(caller.as_ref())?;

    let mut form = read_form(multipart, state.max_upload_bytes).await?;
    let upload = VideoUpload {
        title: form.take_text("title"),
        description: form.take_text("description"),
        original_size: form.take_text("originalSize"),
        file: form.file,
    };
    let record = state.uploads.upload_video(caller.as_ref(), upload).await?;

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            public_id: record.public_id,
            url: None,
            message: "Video uploaded successfully",
        }),
    ))
}
