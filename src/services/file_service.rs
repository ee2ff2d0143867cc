use std::path::PathBuf;

use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// Stores uploaded files on local disk under the configured upload directory.
/// Stored keys are relative paths like `rooms/1724500000000_<uuid>.jpg`; the
/// router serves them statically at `/uploads/<key>`.
pub struct FileService {
    upload_dir: PathBuf,
    public_url: String,
}

impl FileService {
    pub fn new(config: &Config) -> Self {
        Self {
            upload_dir: PathBuf::from(&config.upload_dir),
            public_url: config.public_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn save_file(
        &self,
        folder: &str,
        file_name: &str,
        data: Vec<u8>,
    ) -> AppResult<String> {
        let extension = file_name.rsplit('.').next().unwrap_or("bin");

        let key = format!(
            "{}/{}_{}.{}",
            folder,
            chrono::Utc::now().timestamp_millis(),
            Uuid::new_v4(),
            extension
        );

        let path = self.upload_dir.join(&key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::File(e.to_string()))?;
        }

        tokio::fs::write(&path, &data)
            .await
            .map_err(|e| AppError::File(e.to_string()))?;

        Ok(key)
    }

    pub async fn delete_file(&self, key: &str) -> AppResult<()> {
        let path = self.upload_dir.join(key);
        if path.exists() {
            tokio::fs::remove_file(&path)
                .await
                .map_err(|e| AppError::File(e.to_string()))?;
        }
        Ok(())
    }

    pub fn public_url(&self, key: &str) -> String {
        format!("{}/uploads/{}", self.public_url, key)
    }
}

pub fn validate_image_content_type(content_type: &str) -> bool {
    matches!(
        content_type,
        "image/jpeg" | "image/png" | "image/gif" | "image/webp"
    )
}

pub fn validate_document_content_type(content_type: &str) -> bool {
    matches!(
        content_type,
        "application/pdf"
            | "application/msword"
            | "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            | "image/jpeg"
            | "image/png"
    )
}

pub const MAX_IMAGE_SIZE: usize = 10 * 1024 * 1024; // 10MB
pub const MAX_DOCUMENT_SIZE: usize = 50 * 1024 * 1024; // 50MB
