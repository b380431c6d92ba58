use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    routing::post,
    Json, Router,
};
use rand::Rng;
use serde::Serialize;
use tracing::info;

use super::AppState;
use crate::auth::{Capability, Principal};
use crate::error::ApiError;

/// Form field carrying the images
const FIELD_NAME: &str = "images";
const MAX_FILES: usize = 10;
const MAX_FILE_BYTES: usize = 5 * 1024 * 1024;
/// Room for every file at the limit plus multipart framing
const MAX_BODY_BYTES: usize = MAX_FILES * MAX_FILE_BYTES + 1024 * 1024;

/// Where uploads are written and how they are addressed publicly
#[derive(Debug, Clone)]
pub struct UploadSettings {
    pub dir: PathBuf,
    pub public_base_url: String,
}

impl UploadSettings {
    fn url_for(&self, file_name: &str) -> String {
        format!("{}/uploads/{}", self.public_base_url, file_name)
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/upload-images", post(upload_images))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
}

#[derive(Serialize)]
struct UploadResponse {
    message: &'static str,
    images: Vec<String>,
}

struct PendingImage {
    file_name: String,
    bytes: Vec<u8>,
}

async fn upload_images(
    principal: Principal,
    State(settings): State<Arc<UploadSettings>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    principal.require(Capability::UploadImages)?;

    let mut multipart = multipart.map_err(|e| ApiError::Validation(e.body_text()))?;
    let mut pending = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(e.body_text()))?
    {
        if field.name() != Some(FIELD_NAME) {
            continue;
        }
        if pending.len() == MAX_FILES {
            return Err(ApiError::Validation(format!(
                "At most {} images per upload",
                MAX_FILES
            )));
        }

        let is_image = field
            .content_type()
            .is_some_and(|mime| mime.starts_with("image/"));
        if !is_image {
            return Err(ApiError::Validation(
                "Only image files are allowed!".to_string(),
            ));
        }

        let extension = field.file_name().and_then(extension_of);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::Validation(e.body_text()))?;
        if bytes.len() > MAX_FILE_BYTES {
            return Err(ApiError::Validation(
                "Image exceeds the 5MB limit".to_string(),
            ));
        }

        pending.push(PendingImage {
            file_name: stored_file_name(extension.as_deref()),
            bytes: bytes.to_vec(),
        });
    }

    if pending.is_empty() {
        return Err(ApiError::Validation("No images uploaded".to_string()));
    }

    tokio::fs::create_dir_all(&settings.dir)
        .await
        .with_context(|| format!("Failed to create {}", settings.dir.display()))?;

    let mut urls = Vec::with_capacity(pending.len());
    for image in pending {
        let path = settings.dir.join(&image.file_name);
        tokio::fs::write(&path, &image.bytes)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        urls.push(settings.url_for(&image.file_name));
    }

    info!("🖼️ {} uploaded {} images", principal.email, urls.len());
    Ok(Json(UploadResponse {
        message: "Images uploaded successfully",
        images: urls,
    }))
}

/// Lowercased extension of a client file name, alphanumerics only
fn extension_of(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(str::to_ascii_lowercase)
}

/// `images-<unix millis>-<random>[.ext]`
fn stored_file_name(extension: Option<&str>) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
    match extension {
        Some(ext) => format!("{}-{}-{}.{}", FIELD_NAME, millis, suffix, ext),
        None => format!("{}-{}-{}", FIELD_NAME, millis, suffix),
    }
}
