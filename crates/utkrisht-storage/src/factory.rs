#[cfg(feature = "storage-cloudinary")]
use crate::CloudinaryStore;
#[cfg(feature = "storage-local")]
use crate::LocalStorage;
use crate::{MediaStore, StorageBackend, StorageError, StorageResult};
use std::sync::Arc;
#[cfg(feature = "storage-cloudinary")]
use std::time::Duration;
use utkrisht_core::Config;

/// Create a media store backend based on configuration
pub async fn create_storage(config: &Config) -> StorageResult<Arc<dyn MediaStore>> {
    match config.storage_backend() {
        #[cfg(feature = "storage-cloudinary")]
        StorageBackend::Cloudinary => {
            if !config.cloudinary().is_configured() {
                tracing::warn!("Cloudinary credentials missing; uploads will fail until CLOUDINARY_* is set");
            }
            let timeout = Duration::from_secs(config.upload_retry().attempt_timeout_secs);
            let store = CloudinaryStore::new(config.cloudinary(), timeout)?;
            Ok(Arc::new(store))
        }

        #[cfg(not(feature = "storage-cloudinary"))]
        StorageBackend::Cloudinary => Err(StorageError::ConfigError(
            "Cloudinary backend not available (storage-cloudinary feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let base_path = config
                .local_storage_path()
                .map(String::from)
                .ok_or_else(|| {
                    StorageError::ConfigError("LOCAL_STORAGE_PATH not configured".to_string())
                })?;
            let base_url = config
                .local_storage_base_url()
                .map(String::from)
                .ok_or_else(|| {
                    StorageError::ConfigError("LOCAL_STORAGE_BASE_URL not configured".to_string())
                })?;

            let storage = LocalStorage::new(base_path, base_url).await?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(StorageError::ConfigError(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),
    }
}
