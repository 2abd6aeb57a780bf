//! Document-store boundary traits.
//!
//! The rest of the system talks to galleries and asset records through these
//! traits; backends are Postgres (production) and in-memory (tests, dev).

use async_trait::async_trait;
use moments_core::models::{AssetRecord, Gallery, NewAssetRecord, NewGallery};
use uuid::Uuid;

#[async_trait]
pub trait GalleryStore: Send + Sync {
    async fn create(&self, gallery: NewGallery) -> anyhow::Result<Gallery>;

    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Gallery>>;

    /// Adjust the gallery's asset counter by `delta`. Best-effort from the
    /// caller's perspective: a failure here never rolls back created records.
    async fn increment_total_assets(&self, id: Uuid, delta: i64) -> anyhow::Result<()>;
}

#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Create one record per entry in a single write. Callers chunk batches
    /// to respect platform write limits before calling this.
    async fn create_many(&self, rows: Vec<NewAssetRecord>) -> anyhow::Result<Vec<AssetRecord>>;

    /// One page of a gallery's records, ordered by (created_at DESC, id DESC),
    /// starting strictly after the record identified by `cursor_after`.
    async fn list_page(
        &self,
        gallery_id: Uuid,
        cursor_after: Option<Uuid>,
        limit: i64,
    ) -> anyhow::Result<Vec<AssetRecord>>;
}
