//! Cursor walk over a gallery's asset records.
//!
//! A restartable, finite, lazy sequence of pages: each call to
//! [`AssetWalker::next_page`] fetches up to `page_size` records ordered by
//! creation time descending, using the last-seen record id as the cursor. A
//! short page ends the walk. The walker is resumable between pages, which is
//! what the incremental UI path (infinite scroll) uses; `collect_all` drives
//! it to completion for the archive path.

use std::sync::Arc;

use moments_core::models::AssetRecord;
use moments_core::AppError;
use moments_db::AssetStore;
use uuid::Uuid;

pub struct AssetWalker {
    assets: Arc<dyn AssetStore>,
    gallery_id: Uuid,
    page_size: i64,
    cursor: Option<Uuid>,
    exhausted: bool,
}

impl AssetWalker {
    pub fn new(assets: Arc<dyn AssetStore>, gallery_id: Uuid, page_size: i64) -> Self {
        Self {
            assets,
            gallery_id,
            page_size,
            cursor: None,
            exhausted: false,
        }
    }

    /// Resume a walk after a previously returned cursor.
    pub fn resume_after(
        assets: Arc<dyn AssetStore>,
        gallery_id: Uuid,
        page_size: i64,
        cursor: Uuid,
    ) -> Self {
        Self {
            assets,
            gallery_id,
            page_size,
            cursor: Some(cursor),
            exhausted: false,
        }
    }

    /// The cursor after the last returned page, if any. Passing it to
    /// [`AssetWalker::resume_after`] continues the walk where it stopped.
    pub fn cursor(&self) -> Option<Uuid> {
        self.cursor
    }

    /// Whether the walk has seen its short page.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Fetch the next page, or `None` once the walk is exhausted.
    pub async fn next_page(&mut self) -> Result<Option<Vec<AssetRecord>>, AppError> {
        if self.exhausted {
            return Ok(None);
        }

        let rows = self
            .assets
            .list_page(self.gallery_id, self.cursor, self.page_size)
            .await
            .map_err(AppError::from)?;

        if (rows.len() as i64) < self.page_size {
            self.exhausted = true;
        }
        if rows.is_empty() {
            return Ok(None);
        }

        self.cursor = rows.last().map(|r| r.id);
        Ok(Some(rows))
    }

    /// Drive the walk to completion and return every record.
    pub async fn collect_all(mut self) -> Result<Vec<AssetRecord>, AppError> {
        let mut all = Vec::new();
        while let Some(page) = self.next_page().await? {
            all.extend(page);
        }
        tracing::debug!(
            gallery_id = %self.gallery_id,
            record_count = all.len(),
            "Asset walk complete"
        );
        Ok(all)
    }
}
