//! Cloudinary-backed media storage adapter.
//!
//! Uploads files through the signed upload API: a SHA-256 signature over the
//! sorted request parameters plus the API secret, sent as a multipart POST.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use cultiva_application::{MediaStorage, MediaUpload, StoredMedia, is_supported_media_type};
use cultiva_core::{AppError, AppResult};

const UPLOAD_BASE_URL: &str = "https://api.cloudinary.com/v1_1";
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Credentials and destination folder for the Cloudinary account.
#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    /// Cloud name the account lives under.
    pub cloud_name: String,
    /// API key.
    pub api_key: String,
    /// API secret used for request signing.
    pub api_secret: String,
    /// Folder every upload is placed in.
    pub folder: String,
}

impl CloudinaryConfig {
    fn validate(&self) -> AppResult<()> {
        for (value, name) in [
            (&self.cloud_name, "cloud name"),
            (&self.api_key, "api key"),
            (&self.api_secret, "api secret"),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::Validation(format!(
                    "cloudinary {name} must not be empty"
                )));
            }
        }
        Ok(())
    }
}

/// Media storage adapter for the Cloudinary upload API.
pub struct CloudinaryMediaStorage {
    config: CloudinaryConfig,
    http_client: reqwest::Client,
}

impl CloudinaryMediaStorage {
    /// Creates an adapter after validating the account configuration.
    pub fn new(config: CloudinaryConfig) -> AppResult<Self> {
        config.validate()?;

        let http_client = reqwest::Client::builder()
            .timeout(UPLOAD_TIMEOUT)
            .build()
            .map_err(|error| {
                AppError::Internal(format!("failed to build upload HTTP client: {error}"))
            })?;

        Ok(Self {
            config,
            http_client,
        })
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

/// Signs the upload parameters: sorted `key=value` pairs joined with `&`,
/// followed by the API secret, hashed with SHA-256.
fn sign_upload(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted: Vec<&(&str, &str)> = params.iter().collect();
    sorted.sort_by_key(|(key, _)| *key);

    let joined = sorted
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<String>>()
        .join("&");

    let digest = Sha256::digest(format!("{joined}{api_secret}").as_bytes());
    hex::encode(digest)
}

/// Maps a MIME type onto the provider resource type.
fn resource_type_for(content_type: &str) -> &'static str {
    if content_type.starts_with("video/") {
        "video"
    } else {
        "image"
    }
}

/// Derives the provider public id from the uploaded file name: everything
/// before the first dot.
fn public_id_for(file_name: &str) -> &str {
    file_name.split('.').next().unwrap_or(file_name)
}

#[async_trait]
impl MediaStorage for CloudinaryMediaStorage {
    async fn upload(&self, file: MediaUpload) -> AppResult<StoredMedia> {
        if !is_supported_media_type(&file.content_type) {
            return Err(AppError::Validation(
                "file not supported: only images and videos are allowed".to_owned(),
            ));
        }

        let resource_type = resource_type_for(&file.content_type);
        let public_id = public_id_for(&file.file_name).to_owned();
        let timestamp = Utc::now().timestamp().to_string();

        let signature = sign_upload(
            &[
                ("folder", self.config.folder.as_str()),
                ("public_id", public_id.as_str()),
                ("timestamp", timestamp.as_str()),
            ],
            &self.config.api_secret,
        );

        let part = Part::bytes(file.data)
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)
            .map_err(|error| {
                AppError::Validation(format!("unrecognized content type: {error}"))
            })?;

        let form = Form::new()
            .part("file", part)
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("signature", signature)
            .text("signature_algorithm", "sha256")
            .text("folder", self.config.folder.clone())
            .text("public_id", public_id);

        let endpoint = format!(
            "{UPLOAD_BASE_URL}/{}/{resource_type}/upload",
            self.config.cloud_name
        );

        let response = self
            .http_client
            .post(endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to call media upload endpoint: {error}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_owned());
            return Err(AppError::Internal(format!(
                "media upload endpoint returned status {}: {body}",
                status.as_u16()
            )));
        }

        let body = response.json::<UploadResponse>().await.map_err(|error| {
            AppError::Internal(format!("failed to parse media upload response: {error}"))
        })?;

        Ok(StoredMedia {
            url: body.secure_url,
            public_id: body.public_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{public_id_for, resource_type_for, sign_upload};

    #[test]
    fn signature_is_deterministic_and_order_independent() {
        let forward = sign_upload(
            &[("folder", "cultiva"), ("public_id", "npk"), ("timestamp", "1700000000")],
            "secret",
        );
        let shuffled = sign_upload(
            &[("timestamp", "1700000000"), ("folder", "cultiva"), ("public_id", "npk")],
            "secret",
        );
        assert_eq!(forward, shuffled);
        assert_eq!(forward.len(), 64);
        assert!(forward.bytes().all(|byte| byte.is_ascii_hexdigit()));
    }

    #[test]
    fn signature_depends_on_the_secret() {
        let params = [("timestamp", "1700000000")];
        assert_ne!(sign_upload(&params, "first"), sign_upload(&params, "second"));
    }

    #[test]
    fn videos_use_the_video_resource_type() {
        assert_eq!(resource_type_for("video/mp4"), "video");
        assert_eq!(resource_type_for("image/webp"), "image");
    }

    #[test]
    fn public_id_drops_the_file_extension() {
        assert_eq!(public_id_for("concime-npk.jpg"), "concime-npk");
        assert_eq!(public_id_for("no-extension"), "no-extension");
    }
}
