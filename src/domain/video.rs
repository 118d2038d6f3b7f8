use super::media::IngestedAsset;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Metadata row describing one ingested video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub public_id: String,
    pub original_size: String,
    pub compressed_size: String,
    pub duration: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A video record that has not been written to the store yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewVideoRecord {
    pub title: String,
    pub description: String,
    pub public_id: String,
    pub original_size: String,
    pub compressed_size: String,
    pub duration: f64,
}

impl NewVideoRecord {
    /// Maps the ingestion reply onto the persisted schema. A missing duration becomes 0.
    pub fn from_ingested(
        asset: &IngestedAsset,
        title: String,
        description: String,
        original_size: String,
    ) -> Self {
        Self {
            title,
            description,
            public_id: asset.public_id.clone(),
            original_size,
            compressed_size: asset.bytes.to_string(),
            duration: asset.duration.unwrap_or(0.0),
        }
    }
}
