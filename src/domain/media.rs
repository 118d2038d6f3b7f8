use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const IMAGE_FOLDER: &str = "image-uploads";
pub const VIDEO_FOLDER: &str = "video-uploads";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Image,
    Video,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Image => "image",
            ResourceKind::Video => "video",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Incoming transformation applied by the ingestion service when the asset is stored.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Transformation {
    pub quality: Option<String>,
    pub fetch_format: Option<String>,
}

impl Transformation {
    /// Directive used for every uploaded video: automatic quality, mp4 container.
    pub fn compressed_mp4() -> Self {
        Self {
            quality: Some("auto".to_string()),
            fetch_format: Some("mp4".to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.quality.is_none() && self.fetch_format.is_none()
    }

    /// Renders the directive as a comma-separated component, e.g. `q_auto,f_mp4`.
    pub fn to_component(&self) -> String {
        let mut parts = Vec::new();
        if let Some(quality) = &self.quality {
            parts.push(format!("q_{}", quality));
        }
        if let Some(format) = &self.fetch_format {
            parts.push(format!("f_{}", format));
        }
        parts.join(",")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadDirective {
    pub kind: ResourceKind,
    pub folder: String,
    pub transformation: Option<Transformation>,
}

impl UploadDirective {
    pub fn image() -> Self {
        Self {
            kind: ResourceKind::Image,
            folder: IMAGE_FOLDER.to_string(),
            transformation: None,
        }
    }

    pub fn video() -> Self {
        Self {
            kind: ResourceKind::Video,
            folder: VIDEO_FOLDER.to_string(),
            transformation: Some(Transformation::compressed_mp4()),
        }
    }
}

/// A payload on its way to the ingestion service. Only lives for one call.
#[derive(Debug, Clone)]
pub struct MediaAsset {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
    pub directive: UploadDirective,
}

impl MediaAsset {
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.data.len()
    }
}

/// What the ingestion service reports back for a stored asset.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestedAsset {
    pub public_id: String,
    pub bytes: u64,
    pub duration: Option<f64>,
    pub secure_url: Option<String>,
    pub kind: ResourceKind,
}
