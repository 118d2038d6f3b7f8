use super::error::ApiError;
use super::AppState;
use crate::adapters::cloudinary::delivery::social_format;
use crate::ports::ingestion::MediaIngestionPort;
use crate::ports::repository::VideoRepository;
use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformQuery {
    pub public_id: Option<String>,
    pub format: Option<String>,
    #[serde(default)]
    pub remove_background: bool,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct TransformResponse {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<&'static str>,
}

/// Delivery URL for an uploaded image cropped to a social preset and/or with its
/// background removed.
pub async fn transform_image<I, R>(
    State(state): State<AppState<I, R>>,
    Query(query): Query<TransformQuery>,
) -> Result<Json<TransformResponse>, ApiError>
where
    I: MediaIngestionPort + 'static,
    R: VideoRepository + 'static,
{
    let public_id = query
        .public_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("publicId is required".to_string()))?;
    let delivery = state.delivery.as_ref().ok_or(ApiError::DeliveryNotConfigured)?;

    let response = match query.format.as_deref() {
        Some(key) => {
            let format = social_format(key)
                .ok_or_else(|| ApiError::BadRequest(format!("unknown format {:?}", key)))?;
            TransformResponse {
                url: delivery.social_image(&public_id, format, query.remove_background),
                width: Some(format.width),
                height: Some(format.height),
                format: Some(format.name),
            }
        }
        None if query.remove_background => TransformResponse {
            url: delivery.background_removed(&public_id),
            width: None,
            height: None,
            format: None,
        },
        None => {
            return Err(ApiError::BadRequest(
                "format or removeBackground is required".to_string(),
            ))
        }
    };
    Ok(Json(response))
}
