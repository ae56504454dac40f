use axum::Json;
use axum::extract::{Multipart, State};
use cultiva_application::{MAX_UPLOAD_FILES, MediaUpload, StoredMedia};
use cultiva_core::AppError;
use serde::Serialize;

use crate::error::ApiResult;
use crate::state::AppState;

/// Response for a single uploaded file.
#[derive(Debug, Serialize)]
pub struct UploadImageResponse {
    pub message: String,
    pub url: String,
    pub public_id: String,
}

/// One stored file in a multi-upload response.
#[derive(Debug, Serialize)]
pub struct StoredFileResponse {
    pub url: String,
    pub public_id: String,
}

impl From<StoredMedia> for StoredFileResponse {
    fn from(media: StoredMedia) -> Self {
        Self {
            url: media.url,
            public_id: media.public_id,
        }
    }
}

/// Response for a multi-file upload.
#[derive(Debug, Serialize)]
pub struct UploadImagesResponse {
    pub message: String,
    pub files: Vec<StoredFileResponse>,
}

/// POST /api/products/upload-image - Store one file at the media provider.
pub async fn upload_product_image_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<UploadImageResponse>> {
    let mut files = collect_files(multipart, "file", 1).await?;
    let file = files
        .pop()
        .ok_or_else(|| AppError::Validation("no file provided".to_owned()))?;

    let stored = state.media_storage.upload(file).await?;

    Ok(Json(UploadImageResponse {
        message: "Image uploaded successfully".to_owned(),
        url: stored.url,
        public_id: stored.public_id,
    }))
}

/// POST /api/products/upload-images - Store up to ten files.
pub async fn upload_product_images_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<UploadImagesResponse>> {
    let files = collect_files(multipart, "files", MAX_UPLOAD_FILES).await?;
    if files.is_empty() {
        return Err(AppError::Validation("no files provided".to_owned()).into());
    }

    let mut stored = Vec::with_capacity(files.len());
    for file in files {
        stored.push(state.media_storage.upload(file).await?.into());
    }

    Ok(Json(UploadImagesResponse {
        message: "Images uploaded successfully".to_owned(),
        files: stored,
    }))
}

/// Drains the multipart body, keeping fields named `field_name`.
async fn collect_files(
    mut multipart: Multipart,
    field_name: &str,
    max_files: usize,
) -> ApiResult<Vec<MediaUpload>> {
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|error| {
        AppError::Validation(format!("malformed multipart request: {error}"))
    })? {
        if field.name() != Some(field_name) {
            continue;
        }

        if files.len() == max_files {
            return Err(AppError::Validation(format!(
                "too many files: the limit is {max_files}"
            ))
            .into());
        }

        let file_name = field.file_name().unwrap_or("upload").to_owned();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_owned();
        let data = field
            .bytes()
            .await
            .map_err(|error| {
                AppError::Validation(format!("failed to read uploaded file: {error}"))
            })?
            .to_vec();

        files.push(MediaUpload {
            file_name,
            content_type,
            data,
        });
    }

    Ok(files)
}
