use crate::config::ConfigError;
use crate::domain::media::{IngestedAsset, MediaAsset, UploadDirective};
use crate::domain::video::{NewVideoRecord, VideoRecord};
use crate::domain::Caller;
use crate::ports::ingestion::{IngestionError, MediaIngestionPort};
use crate::ports::repository::{StoreError, VideoRepository};
use bytes::Bytes;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("authentication required")]
    Authentication,

    #[error("missing required field(s): {}", .missing.join(", "))]
    Validation { missing: Vec<&'static str> },

    #[error(transparent)]
    Configuration(#[from] ConfigError),

    #[error("upload to media service failed: {0}")]
    Ingestion(#[from] IngestionError),

    #[error("saving video metadata failed: {0}")]
    Persistence(#[from] StoreError),
}

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

#[derive(Debug, Clone, Default)]
pub struct ImageUpload {
    pub file: Option<UploadedFile>,
}

#[derive(Debug, Clone, Default)]
pub struct VideoUpload {
    pub file: Option<UploadedFile>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub original_size: Option<String>,
}

fn present_file(file: Option<UploadedFile>) -> Option<UploadedFile> {
    file.filter(|f| !f.data.is_empty())
}

fn present_text(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// The upload-and-transform workflow: authorize, validate, hand off, map, persist.
pub struct UploadService<I, R> {
    ingestion: Option<I>,
    repository: Arc<R>,
}

impl<I, R> UploadService<I, R>
where
    I: MediaIngestionPort,
    R: VideoRepository,
{
    /// `ingestion` is `None` when the media service credentials are not configured.
    pub fn new(ingestion: Option<I>, repository: Arc<R>) -> Self {
        Self {
            ingestion,
            repository,
        }
    }

    pub fn authorize<'a>(&self, caller: Option<&'a Caller>) -> Result<&'a Caller, UploadError> {
        caller.ok_or(UploadError::Authentication)
    }

    fn ingestion(&self) -> Result<&I, UploadError> {
        self.ingestion
            .as_ref()
            .ok_or(UploadError::Configuration(ConfigError::MediaCredentialsMissing))
    }

    /// Checks that need no request body. Run before reading the multipart stream.
    pub fn preflight<'a>(&self, caller: Option<&'a Caller>) -> Result<&'a Caller, UploadError> {
        let caller = self.authorize(caller)?;
        self.ingestion()?;
        Ok(caller)
    }

    pub async fn upload_image(
        &self,
        caller: Option<&Caller>,
        upload: ImageUpload,
    ) -> Result<IngestedAsset, UploadError> {
        let caller = self.preflight(caller)?;
        let file = present_file(upload.file).ok_or(UploadError::Validation {
            missing: vec!["file"],
        })?;

        let asset = self
            .ingestion()?
            .ingest(MediaAsset {
                file_name: file.file_name,
                content_type: file.content_type,
                data: file.data,
                directive: UploadDirective::image(),
            })
            .await?;

        tracing::info!(user = %caller.user_id, public_id = %asset.public_id, "image uploaded");
        Ok(asset)
    }

    pub async fn upload_video(
        &self,
        caller: Option<&Caller>,
        upload: VideoUpload,
    ) -> Result<VideoRecord, UploadError> {
        let caller = self.preflight(caller)?;

        let file = present_file(upload.file);
        let title = present_text(upload.title);
        let description = present_text(upload.description);

        let (file, title, description) = match (file, title, description) {
            (Some(file), Some(title), Some(description)) => (file, title, description),
            (file, title, description) => {
                let missing = [
                    ("file", file.is_none()),
                    ("title", title.is_none()),
                    ("description", description.is_none()),
                ]
                .into_iter()
                .filter_map(|(name, absent)| absent.then_some(name))
                .collect();
                return Err(UploadError::Validation { missing });
            }
        };

        let ingestion = self.ingestion()?;
        let asset = ingestion
            .ingest(MediaAsset {
                file_name: file.file_name,
                content_type: file.content_type,
                data: file.data,
                directive: UploadDirective::video(),
            })
            .await?;

        let record = NewVideoRecord::from_ingested(
            &asset,
            title,
            description,
            upload.original_size.unwrap_or_default(),
        );

        match self.repository.insert(record).await {
            Ok(stored) => {
                tracing::info!(
                    user = %caller.user_id,
                    public_id = %stored.public_id,
                    compressed_size = %stored.compressed_size,
                    "video uploaded"
                );
                Ok(stored)
            }
            Err(err) => {
                tracing::error!(public_id = %asset.public_id, error = %err, "video metadata not saved, removing remote asset");
                if let Err(cleanup) = ingestion.destroy(&asset.public_id, asset.kind).await {
                    tracing::error!(public_id = %asset.public_id, error = %cleanup, "remote asset left orphaned");
                }
                Err(UploadError::Persistence(err))
            }
        }
    }
}
