use crate::domain::video::VideoRecord;
use crate::ports::repository::{StoreError, VideoRepository};
use std::sync::Arc;

/// Public listing of stored videos. No pagination, filtering or per-caller scoping.
pub struct LibraryService<R> {
    repository: Arc<R>,
}

impl<R: VideoRepository> LibraryService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub async fn list_videos(&self) -> Result<Vec<VideoRecord>, StoreError> {
        let videos = self.repository.list_newest_first().await?;
        tracing::debug!(count = videos.len(), "listed videos");
        Ok(videos)
    }
}
