use crate::domain::video::{NewVideoRecord, VideoRecord};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("video store unavailable: {0}")]
    Unavailable(String),

    #[error("video with public id {0} already exists")]
    Duplicate(String),

    #[error("video store query failed: {0}")]
    Query(String),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VideoRepository: Send + Sync {
    /// Insert a new row; id and timestamps are assigned by the store.
    async fn insert(&self, record: NewVideoRecord) -> Result<VideoRecord, StoreError>;

    /// Every record, most recent first.
    async fn list_newest_first(&self) -> Result<Vec<VideoRecord>, StoreError>;
}
