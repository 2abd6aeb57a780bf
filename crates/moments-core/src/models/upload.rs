use serde::Serialize;
use utoipa::ToSchema;

/// Per-file upload state. Progress lives only inside `Uploading`, so states
/// like "done at 40%" cannot be represented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum UploadTaskState {
    Pending,
    Uploading {
        /// 1-based attempt number.
        attempt: u32,
        /// 0-100, non-decreasing within one attempt, reset at attempt start.
        progress: u8,
    },
    Done {
        object_id: String,
    },
    Failed {
        attempts: u32,
    },
}

impl UploadTaskState {
    pub fn is_done(&self) -> bool {
        matches!(self, UploadTaskState::Done { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, UploadTaskState::Failed { .. })
    }
}

/// Placeholder metadata derived from an image before upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub hash: String,
    pub width: u32,
    pub height: u32,
}

/// A successfully uploaded file, ready for the finalizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedAsset {
    pub object_id: String,
    pub placeholder_hash: String,
    pub width: i32,
    pub height: i32,
}

impl UploadedAsset {
    pub fn new(object_id: impl Into<String>, placeholder: &Placeholder) -> Self {
        Self {
            object_id: object_id.into(),
            placeholder_hash: placeholder.hash.clone(),
            width: placeholder.width as i32,
            height: placeholder.height as i32,
        }
    }
}
