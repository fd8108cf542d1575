#[cfg(feature = "storage-s3")]
use crate::S3Storage;
use crate::{EphemeralRegistry, InlineStorage, LocalStorage};
use crate::{Storage, StorageBackend, StorageError, StorageResult};
use std::sync::Arc;
use tubely_core::Config;

/// The active backend, plus the registry handle when the backend is in-process.
#[derive(Clone)]
pub struct ConfiguredStorage {
    pub storage: Arc<dyn Storage>,
    /// Set only for `StorageBackend::Ephemeral`; the serving route reads from it.
    pub registry: Option<Arc<EphemeralRegistry>>,
}

impl ConfiguredStorage {
    fn plain(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            registry: None,
        }
    }
}

/// Create a storage backend based on configuration
pub async fn create_storage(config: &Config) -> StorageResult<ConfiguredStorage> {
    let base_url = config.public_base_url.trim_end_matches('/').to_string();

    match config.storage_backend {
        StorageBackend::Local => {
            let storage =
                LocalStorage::new(config.assets_root.clone(), format!("{}/assets", base_url))
                    .await?;
            Ok(ConfiguredStorage::plain(Arc::new(storage)))
        }

        StorageBackend::Inline => Ok(ConfiguredStorage::plain(Arc::new(InlineStorage::new(
            config.inline_max_bytes,
        )))),

        StorageBackend::Ephemeral => {
            let registry = Arc::new(EphemeralRegistry::new(base_url));
            Ok(ConfiguredStorage {
                storage: registry.clone(),
                registry: Some(registry),
            })
        }

        #[cfg(feature = "storage-s3")]
        StorageBackend::S3 => {
            let bucket = config
                .s3_bucket
                .clone()
                .ok_or_else(|| StorageError::ConfigError("S3_BUCKET not configured".to_string()))?;
            let region = config.s3_region.clone().ok_or_else(|| {
                StorageError::ConfigError("S3_REGION or AWS_REGION not configured".to_string())
            })?;

            let storage = S3Storage::new(bucket, region, config.s3_endpoint.clone())?;
            Ok(ConfiguredStorage::plain(Arc::new(storage)))
        }

        #[cfg(not(feature = "storage-s3"))]
        StorageBackend::S3 => Err(StorageError::ConfigError(
            "S3 storage backend not available (storage-s3 feature not enabled)".to_string(),
        )),
    }
}
