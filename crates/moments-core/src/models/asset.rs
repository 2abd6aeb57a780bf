use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// One media item attached to a gallery. Immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct AssetRecord {
    pub id: Uuid,
    pub gallery_id: Uuid,
    /// Opaque identifier of the object in storage.
    pub object_id: String,
    /// Compact lossy placeholder hash painted while the full asset loads.
    pub placeholder_hash: String,
    pub width: i32,
    pub height: i32,
    pub created_at: DateTime<Utc>,
}

/// Fields for creating an asset record (id and timestamp assigned by the store).
#[derive(Debug, Clone)]
pub struct NewAssetRecord {
    pub gallery_id: Uuid,
    pub object_id: String,
    pub placeholder_hash: String,
    pub width: i32,
    pub height: i32,
}

/// One entry of the finalize request body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssetInput {
    pub object_id: String,
    pub placeholder_hash: String,
    pub width: i32,
    pub height: i32,
}

/// Finalize request: attach uploaded objects to a gallery.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AttachAssetsRequest {
    pub assets: Vec<AssetInput>,
}

/// Finalize response.
#[derive(Debug, Serialize, ToSchema)]
pub struct AttachAssetsResponse {
    pub created: usize,
}

/// One page of a gallery's assets, newest first.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AssetPageResponse {
    pub assets: Vec<AssetRecord>,
    /// Cursor to pass as `cursor` for the next page, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<Uuid>,
    pub has_more: bool,
}
