//! Port for the external media storage provider.

use async_trait::async_trait;
use cultiva_core::AppResult;

/// Maximum number of files accepted by a single multi-upload request.
pub const MAX_UPLOAD_FILES: usize = 10;

/// One file received from a client, ready for upload.
#[derive(Debug, Clone)]
pub struct MediaUpload {
    /// Original file name as sent by the client.
    pub file_name: String,
    /// MIME type as sent by the client.
    pub content_type: String,
    /// Raw file bytes.
    pub data: Vec<u8>,
}

/// A file stored at the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMedia {
    /// Public URL of the stored file.
    pub url: String,
    /// Provider-side identifier of the stored file.
    pub public_id: String,
}

/// Returns true for the MIME types the catalog accepts.
#[must_use]
pub fn is_supported_media_type(content_type: &str) -> bool {
    content_type.starts_with("image/") || content_type.starts_with("video/")
}

/// Port for the third-party file storage provider.
#[async_trait]
pub trait MediaStorage: Send + Sync {
    /// Uploads one file and returns its stored location.
    async fn upload(&self, file: MediaUpload) -> AppResult<StoredMedia>;
}

#[cfg(test)]
mod tests {
    use super::is_supported_media_type;

    #[test]
    fn images_and_videos_are_supported() {
        assert!(is_supported_media_type("image/png"));
        assert!(is_supported_media_type("video/mp4"));
    }

    #[test]
    fn other_types_are_rejected() {
        assert!(!is_supported_media_type("application/pdf"));
        assert!(!is_supported_media_type("text/html"));
    }
}
