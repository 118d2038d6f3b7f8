//! In-process `VideoRepository` backing the service and router tests.

use crate::domain::video::{NewVideoRecord, VideoRecord};
use crate::ports::repository::{StoreError, VideoRepository};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
pub struct InMemoryVideoRepository {
    records: Mutex<Vec<VideoRecord>>,
}

impl InMemoryVideoRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

#[async_trait]
impl VideoRepository for InMemoryVideoRepository {
    async fn insert(&self, record: NewVideoRecord) -> Result<VideoRecord, StoreError> {
        let mut records = self.records.lock().unwrap();
        if records.iter().any(|r| r.public_id == record.public_id) {
            return Err(StoreError::Duplicate(record.public_id));
        }
        // Strictly increasing timestamps, even for inserts within the same clock tick.
        let now = records
            .last()
            .map(|last| (last.created_at + Duration::milliseconds(1)).max(Utc::now()))
            .unwrap_or_else(Utc::now);
        let stored = VideoRecord {
            id: Uuid::new_v4(),
            title: record.title,
            description: record.description,
            public_id: record.public_id,
            original_size: record.original_size,
            compressed_size: record.compressed_size,
            duration: record.duration,
            created_at: now,
            updated_at: now,
        };
        records.push(stored.clone());
        Ok(stored)
    }

    async fn list_newest_first(&self) -> Result<Vec<VideoRecord>, StoreError> {
        let mut records = self.records.lock().unwrap().clone();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }
}
