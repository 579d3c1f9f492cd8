use std::sync::Arc;

use tracing::{info, warn};

use crate::{AppConfig, IngestError, IngestPolicy, RawUpload, StorageError, UploadedAsset};
use super::disk::{DiskStorage, StorageBackend};
use super::validation::ValidationManager;

/// Validates an upload batch and hands it to a storage backend.
///
/// Holds no mutable state, so a single instance can serve any number of
/// concurrent requests.
#[derive(Clone)]
pub struct Ingestor {
    validator: Arc<ValidationManager>,
    backend: Arc<dyn StorageBackend>,
}

impl Ingestor {
    pub fn new(policy: IngestPolicy, backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            validator: Arc::new(ValidationManager::new(policy)),
            backend,
        }
    }

    pub async fn from_config(config: &AppConfig) -> Result<Self, StorageError> {
        let storage = DiskStorage::new(&config.storage_root, &config.public_base_url)
            .await?
            .with_retry(config.retry());
        Ok(Self::new(config.ingest.clone(), Arc::new(storage)))
    }

    pub fn policy(&self) -> &IngestPolicy {
        self.validator.policy()
    }

    pub fn backend(&self) -> &dyn StorageBackend {
        self.backend.as_ref()
    }

    /// All files are validated before any byte is written; one bad file
    /// rejects the whole batch.
    pub async fn ingest(&self, files: &[RawUpload]) -> Result<Vec<UploadedAsset>, IngestError> {
        if let Err(e) = self.validator.validate_batch(files) {
            info!(files = files.len(), reason = %e, "upload batch rejected");
            return Err(e);
        }

        let assets = self.backend.store_batch(files).await.map_err(|e| {
            warn!(files = files.len(), error = %e, "failed to persist upload batch");
            IngestError::from(e)
        })?;

        info!(
            files = assets.len(),
            bytes = assets.iter().map(|a| a.size_bytes).sum::<u64>(),
            "upload batch stored"
        );
        Ok(assets)
    }
}

pub fn location_uris(assets: &[UploadedAsset]) -> Vec<String> {
    assets.iter().map(|asset| asset.location_uri.clone()).collect()
}
