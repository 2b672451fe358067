use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

use crate::config::DEFAULT_MAX_UPLOAD_BYTES;
use crate::media::MediaType;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("File type not allowed! Upload PDF, DOCX, JPG, or PNG. (got {0})")]
    UnsupportedType(String),
    #[error("File too large! Max size is {}.", human_size(*.max))]
    TooLarge { size: u64, max: u64 },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type UploadResult<T> = Result<T, UploadError>;

/// Metadata supplied by the uploader alongside the file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerMetadata {
    pub email: String,
    pub phone: String,
    pub date: String,
    pub username: String,
    pub address: String,
    pub age: u32,
    pub gender: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A stored upload, as handed to the extraction pipeline by storage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadRecord {
    pub id: Uuid,
    pub original_name: String,
    pub stored_path: PathBuf,
    pub declared_media_type: String,
    pub size: u64,
    pub uploaded_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<OwnerMetadata>,
}

impl UploadRecord {
    #[must_use]
    pub fn new(stored_path: impl Into<PathBuf>, declared_media_type: impl Into<String>) -> Self {
        let stored_path = stored_path.into();
        let original_name = stored_path
            .file_name()
            .map_or_else(|| "unnamed".to_string(), |n| n.to_string_lossy().to_string());

        Self {
            id: Uuid::new_v4(),
            original_name,
            stored_path,
            declared_media_type: declared_media_type.into(),
            size: 0,
            uploaded_at: Utc::now(),
            owner: None,
        }
    }

    #[must_use]
    pub const fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    #[must_use]
    pub fn with_original_name(mut self, name: impl Into<String>) -> Self {
        self.original_name = name.into();
        self
    }

    #[must_use]
    pub const fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    #[must_use]
    pub fn with_owner(mut self, owner: OwnerMetadata) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn media_type(&self) -> Option<MediaType> {
        MediaType::from_mime(&self.declared_media_type)
    }
}

/// Accepted-type and size checks applied before a file reaches extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadPolicy {
    max_bytes: u64,
}

impl UploadPolicy {
    #[must_use]
    pub const fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }

    #[must_use]
    pub const fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    pub fn validate(&self, declared_media_type: &str, size: u64) -> UploadResult<MediaType> {
        let media = MediaType::from_mime(declared_media_type)
            .ok_or_else(|| UploadError::UnsupportedType(declared_media_type.to_string()))?;

        if size > self.max_bytes {
            return Err(UploadError::TooLarge {
                size,
                max: self.max_bytes,
            });
        }

        Ok(media)
    }

    /// Validate a file that is already on disk and describe it as an upload.
    pub async fn inspect(&self, path: &Path, declared_media_type: &str) -> UploadResult<UploadRecord> {
        let meta = tokio::fs::metadata(path).await?;
        if !meta.is_file() {
            return Err(UploadError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("not a regular file: {}", path.display()),
            )));
        }

        let media = self.validate(declared_media_type, meta.len())?;

        Ok(UploadRecord::new(path, media.as_mime()).with_size(meta.len()))
    }
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_UPLOAD_BYTES)
    }
}

/// File name used when storing an upload: `<id>_<original name>`
#[must_use]
pub fn stored_file_name(id: Uuid, original_name: &str) -> String {
    format!("{id}_{original_name}")
}

/// Full storage path for an upload under `root`, grouped by media type folder
#[must_use]
pub fn storage_path(root: &Path, media: MediaType, id: Uuid, original_name: &str) -> PathBuf {
    root.join(media.storage_folder())
        .join(stored_file_name(id, original_name))
}

fn human_size(bytes: u64) -> String {
    const MIB: u64 = 1024 * 1024;
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{} MB", bytes / MIB)
    } else {
        format!("{bytes} bytes")
    }
}
