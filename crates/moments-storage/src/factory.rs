use crate::memory::MemoryObjectStore;
use crate::{LocalObjectStore, ObjectStore, StorageError, StorageResult};
use moments_core::{Config, StorageBackend};
use std::sync::Arc;

/// Create an object storage backend based on configuration
pub async fn create_object_store(config: &Config) -> StorageResult<Arc<dyn ObjectStore>> {
    match config.storage_backend {
        StorageBackend::Local => {
            let base_path = config.local_storage_path.clone().ok_or_else(|| {
                StorageError::ConfigError("LOCAL_STORAGE_PATH not configured".to_string())
            })?;

            let store = LocalObjectStore::new(base_path).await?;
            Ok(Arc::new(store))
        }

        StorageBackend::Memory => Ok(Arc::new(MemoryObjectStore::new())),
    }
}
