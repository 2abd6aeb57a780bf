//! Object storage abstraction trait
//!
//! This module defines the ObjectStore trait that all storage backends must
//! implement. The rest of the system treats storage as an external platform:
//! opaque object ids in, bytes and advertised metadata out.

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid object id: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Upload progress callback. Receives monotonically increasing cumulative
/// bytes-transferred counts; the final call equals the total byte length.
pub type ProgressFn = Arc<dyn Fn(u64) + Send + Sync>;

/// Metadata the storage platform advertises for an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectMetadata {
    /// Original filename, as carried in the platform's content-disposition.
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub content_length: u64,
}

/// Object storage abstraction trait
///
/// Backends (local filesystem, in-memory) must implement this. Object ids are
/// opaque to callers; only the backend knows how they map to bytes on disk.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload an object and return its opaque id.
    ///
    /// `progress` (if given) is invoked with cumulative bytes written as the
    /// transfer proceeds; counts never decrease within one call.
    async fn put(
        &self,
        filename: &str,
        content_type: &str,
        data: Bytes,
        progress: Option<ProgressFn>,
    ) -> StorageResult<String>;

    /// Download an object's bytes by id.
    async fn get(&self, object_id: &str) -> StorageResult<Bytes>;

    /// Fetch the metadata advertised for an object.
    async fn metadata(&self, object_id: &str) -> StorageResult<ObjectMetadata>;

    /// Check if an object exists.
    async fn exists(&self, object_id: &str) -> StorageResult<bool>;

    /// Delete an object by id.
    async fn delete(&self, object_id: &str) -> StorageResult<()>;
}
