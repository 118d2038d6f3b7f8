use super::error::ApiError;
use super::AppState;
use crate::domain::video::VideoRecord;
use crate::ports::ingestion::MediaIngestionPort;
use crate::ports::repository::VideoRepository;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub success: bool,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub videos: Option<Vec<VideoRecord>>,
}

pub async fn list_videos<I, R>(State(state): State<AppState<I, R>>) -> Response
where
    I: MediaIngestionPort + 'static,
    R: VideoRepository + 'static,
{
    match state.library.list_videos().await {
        Ok(videos) => (
            StatusCode::OK,
            Json(ListResponse {
                success: true,
                message: "Videos retrieved successfully",
                videos: Some(videos),
            }),
        )
            .into_response(),
        Err(err) => {
            tracing::error!(error = %err, "listing videos failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ListResponse {
                    success: false,
                    message: "Error retrieving videos",
                    videos: None,
                }),
            )
                .into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadQuery {
    pub public_id: Option<String>,
    pub title: Option<String>,
}

/// Redirects to an mp4 served as an attachment, named after the video title.
pub async fn download_video<I, R>(
    State(state): State<AppState<I, R>>,
    Query(query): Query<DownloadQuery>,
) -> Result<Redirect, ApiError>
where
    I: MediaIngestionPort + 'static,
    R: VideoRepository + 'static,
{
    let public_id = query
        .public_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("publicId is required".to_string()))?;
    let delivery = state.delivery.as_ref().ok_or(ApiError::DeliveryNotConfigured)?;

    let title = query.title.unwrap_or_default();
    Ok(Redirect::temporary(&delivery.video_download(&public_id, &title)))
}
