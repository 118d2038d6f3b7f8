//! HTTP inbound adapter: axum router, access gate and handlers.

pub mod error;
pub mod gate;
mod media;
mod uploads;
mod videos;

use crate::adapters::cloudinary::DeliveryUrls;
use crate::application::library::LibraryService;
use crate::application::upload::UploadService;
use crate::ports::ingestion::MediaIngestionPort;
use crate::ports::repository::VideoRepository;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{middleware, Json, Router};
use gate::GateState;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Room for multipart boundaries and the text fields on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub struct AppState<I, R> {
    pub uploads: Arc<UploadService<I, R>>,
    pub library: Arc<LibraryService<R>>,
    /// `None` when no media service account is configured.
    pub delivery: Option<Arc<DeliveryUrls>>,
    pub max_upload_bytes: usize,
}

impl<I, R> Clone for AppState<I, R> {
    fn clone(&self) -> Self {
        Self {
            uploads: self.uploads.clone(),
            library: self.library.clone(),
            delivery: self.delivery.clone(),
            max_upload_bytes: self.max_upload_bytes,
        }
    }
}

async fn health() -> &'static str {
    "ok"
}

/// Advisory ceiling for clients that want to reject oversized files before sending them.
async fn upload_limits<I, R>(State(state): State<AppState<I, R>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({ "maxUploadBytes": state.max_upload_bytes })),
    )
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Not found", "code": "NOT_FOUND" })),
    )
}

pub fn router<I, R>(state: AppState<I, R>, gate_state: GateState) -> Router
where
    I: MediaIngestionPort + 'static,
    R: VideoRepository + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let body_limit = state.max_upload_bytes.saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        .route("/api/image-upload", post(uploads::upload_image::<I, R>))
        .route("/api/video-upload", post(uploads::upload_video::<I, R>))
        .route("/api/videos", get(videos::list_videos::<I, R>))
        .route("/api/videos/download", get(videos::download_video::<I, R>))
        .route("/api/images/transform", get(media::transform_image::<I, R>))
        .route("/api/upload-limits", get(upload_limits::<I, R>))
        .route("/health", get(health))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(gate_state, gate::access_gate))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
