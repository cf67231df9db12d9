//! Acceptance rules and storage for uploaded crop images.

use crate::error::{Result, UploadError};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

pub const ALLOWED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "webp"];

/// Default size limit, 10 MiB.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Checks name and size of an upload. Returns the lower-cased extension.
pub fn validate(file_name: &str, size: usize, limit: usize) -> std::result::Result<String, UploadError> {
    if file_name.trim().is_empty() {
        return Err(UploadError::EmptyFileName);
    }

    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
        .ok_or(UploadError::UnsupportedType)?;

    if size > limit {
        return Err(UploadError::TooLarge { size, limit });
    }

    Ok(extension)
}

/// Strips directories and anything outside `[A-Za-z0-9._-]`.
pub fn sanitize_file_name(file_name: &str) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    let cleaned: String = base
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '.' | '-' | '_' => c,
            _ => '_',
        })
        .collect();

    let trimmed = cleaned.trim_start_matches(['.', '_']);
    if trimmed.is_empty() {
        "image".to_string()
    } else {
        trimmed.to_string()
    }
}

/// An image written to the upload directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub path: PathBuf,
    /// Name under the upload directory, `<uuid>_<sanitised name>`.
    pub file_name: String,
}

/// Writes the image under a unique name, creating the directory if needed.
pub async fn store(dir: &Path, original_name: &str, bytes: &[u8]) -> Result<StoredImage> {
    tokio::fs::create_dir_all(dir).await?;

    let file_name = format!("{}_{}", Uuid::new_v4(), sanitize_file_name(original_name));
    let path = dir.join(&file_name);
    tokio::fs::write(&path, bytes).await?;
    debug!("Stored upload at {}", path.display());

    Ok(StoredImage { path, file_name })
}

/// Best effort removal of a stored image.
pub async fn remove(image: &StoredImage) {
    if let Err(e) = tokio::fs::remove_file(&image.path).await {
        warn!("Failed to remove stored upload {}: {}", image.path.display(), e);
    }
}
