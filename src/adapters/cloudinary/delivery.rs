//! Delivery URLs for transformed assets.
//!
//! Transformations are applied on the fly by the delivery host, so nothing here talks to
//! the network: it only builds URLs of the form
//! `{base}/{cloud}/{kind}/upload/{transformation}/{public_id}`.

use crate::domain::media::ResourceKind;
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SocialFormat {
    pub name: &'static str,
    pub slug: &'static str,
    pub width: u32,
    pub height: u32,
    pub aspect_ratio: &'static str,
}

pub const SOCIAL_FORMATS: &[SocialFormat] = &[
    SocialFormat { name: "Instagram Post", slug: "instagram-post", width: 1080, height: 1080, aspect_ratio: "1:1" },
    SocialFormat { name: "Facebook Post", slug: "facebook-post", width: 1200, height: 630, aspect_ratio: "1200:630" },
    SocialFormat { name: "Twitter Post", slug: "twitter-post", width: 1200, height: 675, aspect_ratio: "16:9" },
    SocialFormat { name: "YouTube Thumbnail", slug: "youtube-thumbnail", width: 1280, height: 720, aspect_ratio: "16:9" },
    SocialFormat { name: "LinkedIn Post", slug: "linkedin-post", width: 1200, height: 627, aspect_ratio: "1200:627" },
    SocialFormat { name: "Pinterest Pin", slug: "pinterest-pin", width: 1000, height: 1500, aspect_ratio: "2:3" },
    SocialFormat { name: "Website Banner", slug: "website-banner", width: 1920, height: 600, aspect_ratio: "16:5" },
];

/// Looks a preset up by slug (`instagram-post`) or display name (`Instagram Post`).
pub fn social_format(key: &str) -> Option<&'static SocialFormat> {
    SOCIAL_FORMATS
        .iter()
        .find(|f| f.slug == key || f.name.eq_ignore_ascii_case(key))
}

/// `"My Holiday  Clip"` -> `"my_holiday_clip"`
pub fn download_file_stem(title: &str) -> String {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    let whitespace = WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("valid regex"));
    let stem = whitespace.replace_all(title.trim(), "_").to_lowercase();
    // The attachment flag is a path component; keep it to URL-safe characters.
    let stem: String = stem
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect();
    if stem.is_empty() {
        String::from("video")
    } else {
        stem
    }
}

#[derive(Debug, Clone)]
pub struct DeliveryUrls {
    base: String,
    cloud_name: String,
}

impl DeliveryUrls {
    pub fn new(base: &str, cloud_name: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
            cloud_name: cloud_name.to_string(),
        }
    }

    fn url(&self, kind: ResourceKind, transformation: &[String], public_id: &str, extension: Option<&str>) -> String {
        let mut url = format!("{}/{}/{}/upload", self.base, self.cloud_name, kind);
        for component in transformation.iter().filter(|c| !c.is_empty()) {
            url.push('/');
            url.push_str(component);
        }
        url.push('/');
        url.push_str(public_id.trim_start_matches('/'));
        if let Some(extension) = extension {
            url.push('.');
            url.push_str(extension);
        }
        url
    }

    /// mp4 download served with `Content-Disposition: attachment`.
    pub fn video_download(&self, public_id: &str, title: &str) -> String {
        let flag = format!("fl_attachment:{}", download_file_stem(title));
        self.url(ResourceKind::Video, &[flag], public_id, Some("mp4"))
    }

    /// Crops an image to a social preset, optionally removing the background first.
    pub fn social_image(&self, public_id: &str, format: &SocialFormat, remove_background: bool) -> String {
        let mut components = Vec::new();
        if remove_background {
            components.push("e_background_removal".to_string());
        }
        components.push(format!(
            "c_fill,w_{},h_{},ar_{},g_auto",
            format.width, format.height, format.aspect_ratio
        ));
        self.url(ResourceKind::Image, &components, public_id, None)
    }

    pub fn background_removed(&self, public_id: &str) -> String {
        self.url(
            ResourceKind::Image,
            &["e_background_removal".to_string(), "f_png".to_string()],
            public_id,
            None,
        )
    }
}
