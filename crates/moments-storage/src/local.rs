use crate::traits::{ObjectMetadata, ObjectStore, ProgressFn, StorageError, StorageResult};
use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Bytes written between progress callbacks.
const WRITE_CHUNK_SIZE: usize = 64 * 1024;

/// Sidecar carrying the metadata the platform would advertise via headers.
#[derive(Debug, Serialize, Deserialize)]
struct ObjectSidecar {
    filename: Option<String>,
    content_type: Option<String>,
    content_length: u64,
}

/// Local filesystem object storage implementation
#[derive(Clone)]
pub struct LocalObjectStore {
    base_path: PathBuf,
}

impl LocalObjectStore {
    /// Create a new LocalObjectStore instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for object storage (e.g., "/var/lib/moments/objects")
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalObjectStore { base_path })
    }

    /// Convert object id to filesystem path with security validation.
    /// Object ids must not contain path separators or traversal sequences.
    fn id_to_path(&self, object_id: &str) -> StorageResult<PathBuf> {
        if object_id.is_empty()
            || object_id.contains("..")
            || object_id.contains('/')
            || object_id.contains('\\')
        {
            return Err(StorageError::InvalidKey(
                "Object id contains invalid characters".to_string(),
            ));
        }
        Ok(self.base_path.join("objects").join(object_id))
    }

    fn sidecar_path(path: &Path) -> PathBuf {
        let mut name = path.as_os_str().to_owned();
        name.push(".meta.json");
        PathBuf::from(name)
    }

    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    async fn read_sidecar(&self, path: &Path) -> StorageResult<ObjectSidecar> {
        let raw = fs::read(Self::sidecar_path(path)).await.map_err(|e| {
            StorageError::BackendError(format!(
                "Failed to read object metadata {}: {}",
                path.display(),
                e
            ))
        })?;
        serde_json::from_slice(&raw).map_err(|e| {
            StorageError::BackendError(format!(
                "Corrupt object metadata {}: {}",
                path.display(),
                e
            ))
        })
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put(
        &self,
        filename: &str,
        content_type: &str,
        data: Bytes,
        progress: Option<ProgressFn>,
    ) -> StorageResult<String> {
        let object_id = Uuid::new_v4().to_string();
        let path = self.id_to_path(&object_id)?;
        let total = data.len();

        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        let mut written = 0usize;
        for chunk in data.chunks(WRITE_CHUNK_SIZE) {
            file.write_all(chunk).await.map_err(|e| {
                StorageError::UploadFailed(format!(
                    "Failed to write file {}: {}",
                    path.display(),
                    e
                ))
            })?;
            written += chunk.len();
            if let Some(ref progress) = progress {
                progress(written as u64);
            }
        }
        if total == 0 {
            if let Some(ref progress) = progress {
                progress(0);
            }
        }

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        let sidecar = ObjectSidecar {
            filename: Some(filename.to_string()),
            content_type: Some(content_type.to_string()),
            content_length: total as u64,
        };
        let sidecar_bytes = serde_json::to_vec(&sidecar)
            .map_err(|e| StorageError::UploadFailed(format!("Failed to encode metadata: {}", e)))?;
        fs::write(Self::sidecar_path(&path), sidecar_bytes)
            .await
            .map_err(|e| {
                StorageError::UploadFailed(format!(
                    "Failed to write metadata {}: {}",
                    path.display(),
                    e
                ))
            })?;

        tracing::info!(
            object_id = %object_id,
            filename = %filename,
            size_bytes = total,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(object_id)
    }

    async fn get(&self, object_id: &str) -> StorageResult<Bytes> {
        let path = self.id_to_path(object_id)?;
        let start = std::time::Instant::now();

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(object_id.to_string()));
        }

        let data = fs::read(&path).await.map_err(|e| {
            StorageError::DownloadFailed(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        tracing::debug!(
            object_id = %object_id,
            size_bytes = data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage download successful"
        );

        Ok(Bytes::from(data))
    }

    async fn metadata(&self, object_id: &str) -> StorageResult<ObjectMetadata> {
        let path = self.id_to_path(object_id)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(object_id.to_string()));
        }

        let sidecar = self.read_sidecar(&path).await?;
        Ok(ObjectMetadata {
            filename: sidecar.filename,
            content_type: sidecar.content_type,
            content_length: sidecar.content_length,
        })
    }

    async fn exists(&self, object_id: &str) -> StorageResult<bool> {
        let path = self.id_to_path(object_id)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }

    async fn delete(&self, object_id: &str) -> StorageResult<()> {
        let path = self.id_to_path(object_id)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(object_id.to_string()));
        }

        fs::remove_file(&path).await.map_err(|e| {
            StorageError::DeleteFailed(format!("Failed to delete file {}: {}", path.display(), e))
        })?;
        // Sidecar is best-effort; the object itself is gone.
        let _ = fs::remove_file(Self::sidecar_path(&path)).await;

        tracing::info!(object_id = %object_id, "Local storage delete successful");
        Ok(())
    }
}
