use super::signature;
use crate::config::{MediaCredentials, MediaServiceConfig};
use crate::domain::media::{IngestedAsset, MediaAsset, ResourceKind};
use crate::ports::ingestion::{IngestionError, MediaIngestionPort};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Upload API client. Every call is a single signed multipart request.
#[derive(Clone)]
pub struct CloudinaryClient {
    http: reqwest::Client,
    credentials: MediaCredentials,
    api_base: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(default)]
    public_id: String,
    #[serde(default)]
    bytes: u64,
    duration: Option<f64>,
    secure_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

impl CloudinaryClient {
    pub fn new(
        credentials: MediaCredentials,
        config: &MediaServiceConfig,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            credentials,
            api_base: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, kind: ResourceKind, action: &str) -> String {
        format!(
            "{}/v1_1/{}/{}/{}",
            self.api_base, self.credentials.cloud_name, kind, action
        )
    }

    /// Adds `timestamp`, `api_key` and `signature` to the given parameters.
    fn signed_params(&self, mut params: BTreeMap<&'static str, String>) -> BTreeMap<&'static str, String> {
        params.insert("timestamp", chrono::Utc::now().timestamp().to_string());
        let signature = signature::sign(&params, &self.credentials.api_secret);
        params.insert("api_key", self.credentials.api_key.clone());
        params.insert("signature", signature);
        params
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<String, IngestionError> {
        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(IngestionError::Rejected {
                status: status.as_u16(),
                message,
            });
        }
        Ok(body)
    }
}

fn transport_error(err: reqwest::Error) -> IngestionError {
    if err.is_timeout() {
        IngestionError::Transport("request timed out".to_string())
    } else {
        IngestionError::Transport(err.to_string())
    }
}

fn upload_params(asset: &MediaAsset) -> BTreeMap<&'static str, String> {
    let mut params = BTreeMap::new();
    params.insert("folder", asset.directive.folder.clone());
    if let Some(transformation) = &asset.directive.transformation {
        if !transformation.is_empty() {
            params.insert("transformation", transformation.to_component());
        }
    }
    params
}

fn parse_upload_response(body: &str, kind: ResourceKind) -> Result<IngestedAsset, IngestionError> {
    let response: UploadResponse = serde_json::from_str(body)
        .map_err(|e| IngestionError::InvalidResponse(e.to_string()))?;

    if response.public_id.is_empty() {
        return Err(IngestionError::InvalidResponse(
            "missing public_id".to_string(),
        ));
    }

    Ok(IngestedAsset {
        public_id: response.public_id,
        bytes: response.bytes,
        duration: response.duration,
        secure_url: response.secure_url,
        kind,
    })
}

#[async_trait]
impl MediaIngestionPort for CloudinaryClient {
    async fn ingest(&self, asset: MediaAsset) -> Result<IngestedAsset, IngestionError> {
        let kind = asset.directive.kind;
        let size = asset.len();
        let params = self.signed_params(upload_params(&asset));

        let mut file = Part::stream(asset.data)
            .file_name(asset.file_name.unwrap_or_else(|| String::from("upload")));
        if let Some(content_type) = asset.content_type.as_deref() {
            file = file
                .mime_str(content_type)
                .map_err(|e| IngestionError::Transport(e.to_string()))?;
        }

        let form = params
            .into_iter()
            .fold(Form::new(), |form, (key, value)| form.text(key, value))
            .part("file", file);

        tracing::debug!(%kind, size, endpoint = %self.endpoint(kind, "upload"), "sending upload");
        let body = self
            .send(self.http.post(self.endpoint(kind, "upload")).multipart(form))
            .await?;

        parse_upload_response(&body, kind)
    }

    async fn destroy(&self, public_id: &str, kind: ResourceKind) -> Result<(), IngestionError> {
        let mut params = BTreeMap::new();
        params.insert("public_id", public_id.to_string());
        params.insert("invalidate", "true".to_string());
        let params = self.signed_params(params);

        let body = self
            .send(self.http.post(self.endpoint(kind, "destroy")).form(&params))
            .await?;

        let response: DestroyResponse = serde_json::from_str(&body)
            .map_err(|e| IngestionError::InvalidResponse(e.to_string()))?;
        match response.result.as_str() {
            "ok" | "not found" => Ok(()),
            other => Err(IngestionError::InvalidResponse(format!(
                "destroy returned {:?}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::media::UploadDirective;
    use bytes::Bytes;
    use std::time::Duration;

    fn client() -> CloudinaryClient {
        let config = MediaServiceConfig {
            credentials: None,
            api_base: "https://api.cloudinary.com/".to_string(),
            delivery_base: "https://res.cloudinary.com".to_string(),
            timeout: Duration::from_secs(5),
        };
        let credentials = MediaCredentials {
            cloud_name: "demo".to_string(),
            api_key: "1234".to_string(),
            api_secret: "shh".to_string(),
        };
        CloudinaryClient::new(credentials, &config).unwrap()
    }

    #[test]
    fn test_endpoints() {
        let client = client();
        assert_eq!(
            client.endpoint(ResourceKind::Video, "upload"),
            "https://api.cloudinary.com/v1_1/demo/video/upload"
        );
        assert_eq!(
            client.endpoint(ResourceKind::Image, "destroy"),
            "https://api.cloudinary.com/v1_1/demo/image/destroy"
        );
    }

    #[test]
    fn test_video_upload_params_carry_transformation() {
        let asset = MediaAsset {
            file_name: Some("clip.mov".to_string()),
            content_type: None,
            data: Bytes::from_static(b"frames"),
            directive: UploadDirective::video(),
        };
        let params = upload_params(&asset);
        assert_eq!(params["folder"], "video-uploads");
        assert_eq!(params["transformation"], "q_auto,f_mp4");
    }

    #[test]
    fn test_signed_params_verify() {
        let client = client();
        let mut params = BTreeMap::new();
        params.insert("folder", "image-uploads".to_string());
        let signed = client.signed_params(params);

        assert_eq!(signed["api_key"], "1234");
        assert!(signed.contains_key("timestamp"));
        assert_eq!(signed["signature"], signature::sign(&signed, "shh"));
    }

    #[test]
    fn test_parse_video_response_without_duration() {
        let body = r#"{"public_id":"video-uploads/x1","bytes":2048,"format":"mp4","resource_type":"video"}"#;
        let asset = parse_upload_response(body, ResourceKind::Video).unwrap();
        assert_eq!(asset.public_id, "video-uploads/x1");
        assert_eq!(asset.bytes, 2048);
        assert_eq!(asset.duration, None);
        assert_eq!(asset.secure_url, None);
    }

    #[test]
    fn test_parse_response_requires_public_id() {
        let err = parse_upload_response(r#"{"bytes":1}"#, ResourceKind::Image).unwrap_err();
        assert!(matches!(err, IngestionError::InvalidResponse(_)));

        let err = parse_upload_response("<html>", ResourceKind::Image).unwrap_err();
        assert!(matches!(err, IngestionError::InvalidResponse(_)));
    }
}
