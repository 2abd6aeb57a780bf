//! Upload input types.

use std::path::PathBuf;

use bytes::Bytes;
use chrono::{DateTime, Utc};

/// Where a local file's bytes come from.
///
/// Reading a path can fail; that failure is permanent for the task (there is
/// nothing to retry) and fails it immediately.
#[derive(Debug, Clone)]
pub enum FileSource {
    Memory(Bytes),
    Path(PathBuf),
}

impl FileSource {
    pub async fn read(&self) -> std::io::Result<Bytes> {
        match self {
            FileSource::Memory(bytes) => Ok(bytes.clone()),
            FileSource::Path(path) => tokio::fs::read(path).await.map(Bytes::from),
        }
    }
}

/// A user-selected file handed to the upload scheduler. Owned exclusively by
/// the scheduler for the duration of an attempt; immutable.
#[derive(Debug, Clone)]
pub struct LocalFile {
    pub name: String,
    pub content_type: String,
    pub source: FileSource,
    pub last_modified: Option<DateTime<Utc>>,
}

impl LocalFile {
    pub fn from_bytes(
        name: impl Into<String>,
        content_type: impl Into<String>,
        data: Bytes,
    ) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            source: FileSource::Memory(data),
            last_modified: None,
        }
    }

    pub fn from_path(
        name: impl Into<String>,
        content_type: impl Into<String>,
        path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            source: FileSource::Path(path.into()),
            last_modified: None,
        }
    }
}
