use crate::domain::media::{IngestedAsset, MediaAsset, ResourceKind};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestionError {
    /// Transport-level failure: connection refused, timeout, TLS.
    #[error("media service unreachable: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("media service rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The service answered 2xx but the body was not what we expect.
    #[error("unexpected media service response: {0}")]
    InvalidResponse(String),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaIngestionPort: Send + Sync {
    /// Send one buffered payload. Resolves exactly once with the stored asset or an error.
    async fn ingest(&self, asset: MediaAsset) -> Result<IngestedAsset, IngestionError>;

    /// Remove a previously ingested asset.
    async fn destroy(&self, public_id: &str, kind: ResourceKind) -> Result<(), IngestionError>;
}
