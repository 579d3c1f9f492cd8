use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sha2::{Sha256, Digest};
use tracing::{debug, warn};

use crate::{FileTypeDetector, RawUpload, StorageError, UploadedAsset};
use super::naming::{generate_stored_name, is_valid_stored_name, sanitized_extension};
use super::retry::{with_retry, RetryConfig};

pub const STAGING_DIR: &str = ".incoming";

#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Persists every file or none of them. Input order is preserved.
    async fn store_batch(&self, files: &[RawUpload]) -> Result<Vec<UploadedAsset>, StorageError>;
    async fn stat(&self, stored_name: &str) -> Result<UploadedAsset, StorageError>;
    async fn list_assets(&self) -> Result<Vec<UploadedAsset>, StorageError>;
}

pub struct DiskStorage {
    base_path: PathBuf,
    staging_path: PathBuf,
    public_base_url: String,
    retry: RetryConfig,
}

struct StagedFile<'a> {
    stored_name: String,
    extension: String,
    staging_path: PathBuf,
    source: &'a RawUpload,
}

impl DiskStorage {
    pub async fn new<P: AsRef<Path>>(base_path: P, public_base_url: &str) -> Result<Self, StorageError> {
        let base_path = base_path.as_ref().to_owned();
        let staging_path = base_path.join(STAGING_DIR);

        fs::create_dir_all(&base_path).await?;
        fs::create_dir_all(&staging_path).await?;

        Ok(Self {
            base_path,
            staging_path,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            retry: RetryConfig::default(),
        })
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn location_uri(&self, stored_name: &str) -> String {
        format!("{}/{}", self.public_base_url, stored_name)
    }

    fn asset_path(&self, stored_name: &str) -> PathBuf {
        self.base_path.join(stored_name)
    }

    fn calculate_checksum(data: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(data);
        hex::encode(hasher.finalize())
    }

    async fn write_staged(path: &Path, data: &[u8]) -> Result<(), StorageError> {
        // A failed earlier attempt may have left a partial file behind.
        if let Err(e) = fs::remove_file(path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                return Err(e.into());
            }
        }

        let mut file = OpenOptions::new().write(true).create_new(true).open(path).await?;
        file.write_all(data).await?;
        file.sync_all().await?;
        Ok(())
    }

    async fn remove_quietly(path: &Path) {
        if let Err(e) = fs::remove_file(path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %path.display(), error = %e, "failed to remove file during rollback");
            }
        }
    }

    async fn stage<'a>(&self, files: &'a [RawUpload]) -> Result<Vec<StagedFile<'a>>, StorageError> {
        let mut staged: Vec<StagedFile<'a>> = Vec::with_capacity(files.len());

        for source in files {
            let extension = sanitized_extension(&source.file_name);
            let stored_name = generate_stored_name(&extension);
            let staging_path = self.staging_path.join(&stored_name);

            let written = with_retry(&self.retry, || Self::write_staged(&staging_path, &source.data)).await;
            if let Err(e) = written {
                Self::remove_quietly(&staging_path).await;
                for file in &staged {
                    Self::remove_quietly(&file.staging_path).await;
                }
                return Err(e);
            }

            staged.push(StagedFile { stored_name, extension, staging_path, source });
        }

        Ok(staged)
    }

    async fn publish(&self, staged: &[StagedFile<'_>]) -> Result<(), StorageError> {
        for (index, file) in staged.iter().enumerate() {
            if let Err(e) = fs::rename(&file.staging_path, self.asset_path(&file.stored_name)).await {
                warn!(stored_name = %file.stored_name, error = %e, "publishing batch failed, rolling back");
                for published in &staged[..index] {
                    Self::remove_quietly(&self.asset_path(&published.stored_name)).await;
                }
                for pending in &staged[index..] {
                    Self::remove_quietly(&pending.staging_path).await;
                }
                return Err(e.into());
            }
        }
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for DiskStorage {
    async fn store_batch(&self, files: &[RawUpload]) -> Result<Vec<UploadedAsset>, StorageError> {
        let staged = self.stage(files).await?;
        self.publish(&staged).await?;

        let created_at = Utc::now();
        let assets = staged
            .into_iter()
            .map(|file| {
                debug!(stored_name = %file.stored_name, size = file.source.size(), "asset stored");
                UploadedAsset {
                    location_uri: self.location_uri(&file.stored_name),
                    stored_name: file.stored_name,
                    original_extension: file.extension,
                    mime_type: file.source.mime_type.clone(),
                    size_bytes: file.source.size(),
                    checksum: Self::calculate_checksum(&file.source.data),
                    created_at,
                }
            })
            .collect();

        Ok(assets)
    }

    async fn stat(&self, stored_name: &str) -> Result<UploadedAsset, StorageError> {
        if !is_valid_stored_name(stored_name) {
            return Err(StorageError::NotFound(stored_name.to_string()));
        }

        let path = self.asset_path(stored_name);
        let metadata = match fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => metadata,
            Ok(_) => return Err(StorageError::NotFound(stored_name.to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(stored_name.to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        let data = fs::read(&path).await?;
        let created: SystemTime = metadata.created().or_else(|_| metadata.modified())?;

        Ok(UploadedAsset {
            stored_name: stored_name.to_string(),
            original_extension: sanitized_extension(stored_name),
            mime_type: FileTypeDetector::detect(&data).mime_type().to_string(),
            size_bytes: metadata.len(),
            location_uri: self.location_uri(stored_name),
            checksum: Self::calculate_checksum(&data),
            created_at: DateTime::<Utc>::from(created),
        })
    }

    async fn list_assets(&self) -> Result<Vec<UploadedAsset>, StorageError> {
        let mut names = Vec::new();

        let mut entries = fs::read_dir(&self.base_path).await?;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if is_valid_stored_name(name) {
                    names.push(name.to_string());
                }
            }
        }

        names.sort();

        let mut assets = Vec::with_capacity(names.len());
        for name in names {
            assets.push(self.stat(&name).await?);
        }
        Ok(assets)
    }
}
