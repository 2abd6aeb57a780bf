//! In-memory gallery and asset repositories.
//!
//! Back the services in tests and local development. Call counters let tests
//! assert how many platform requests an operation issued; the increment
//! failure switch exercises the finalizer's counter-drift tolerance.

use async_trait::async_trait;
use chrono::Utc;
use moments_core::models::{AssetRecord, Gallery, NewAssetRecord, NewGallery};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

use crate::traits::{AssetStore, GalleryStore};

#[derive(Default)]
pub struct MemoryGalleryStore {
    galleries: Mutex<HashMap<Uuid, Gallery>>,
    fail_increments: AtomicBool,
    increment_calls: AtomicUsize,
}

impl MemoryGalleryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent counter increment fail.
    pub fn fail_increments(&self, fail: bool) {
        self.fail_increments.store(fail, Ordering::SeqCst);
    }

    /// Seed a gallery with a caller-chosen id (e.g. the sample gallery).
    pub fn insert(&self, gallery: Gallery) {
        self.galleries
            .lock()
            .expect("lock poisoned")
            .insert(gallery.id, gallery);
    }

    pub fn increment_calls(&self) -> usize {
        self.increment_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GalleryStore for MemoryGalleryStore {
    async fn create(&self, gallery: NewGallery) -> anyhow::Result<Gallery> {
        let now = Utc::now();
        let gallery = Gallery {
            id: Uuid::new_v4(),
            name: gallery.name,
            description: gallery.description,
            expiry_at: gallery.expiry_at,
            total_assets: 0,
            created_at: now,
            updated_at: now,
        };
        self.galleries
            .lock()
            .expect("lock poisoned")
            .insert(gallery.id, gallery.clone());
        Ok(gallery)
    }

    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Gallery>> {
        Ok(self
            .galleries
            .lock()
            .expect("lock poisoned")
            .get(&id)
            .cloned())
    }

    async fn increment_total_assets(&self, id: Uuid, delta: i64) -> anyhow::Result<()> {
        self.increment_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_increments.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!("injected counter failure"));
        }
        let mut galleries = self.galleries.lock().expect("lock poisoned");
        let gallery = galleries
            .get_mut(&id)
            .ok_or_else(|| anyhow::anyhow!("Gallery not found: {}", id))?;
        gallery.total_assets += delta;
        gallery.updated_at = Utc::now();
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryAssetStore {
    rows: Mutex<Vec<AssetRecord>>,
    create_many_calls: AtomicUsize,
    list_page_calls: AtomicUsize,
}

impl MemoryAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_many_calls(&self) -> usize {
        self.create_many_calls.load(Ordering::SeqCst)
    }

    pub fn list_page_calls(&self) -> usize {
        self.list_page_calls.load(Ordering::SeqCst)
    }

    pub fn row_count(&self) -> usize {
        self.rows.lock().expect("lock poisoned").len()
    }

    fn sorted_for(&self, gallery_id: Uuid) -> Vec<AssetRecord> {
        let mut rows: Vec<AssetRecord> = self
            .rows
            .lock()
            .expect("lock poisoned")
            .iter()
            .filter(|r| r.gallery_id == gallery_id)
            .cloned()
            .collect();
        // Same total order as the Postgres backend: created_at DESC, id DESC.
        rows.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        rows
    }
}

#[async_trait]
impl AssetStore for MemoryAssetStore {
    async fn create_many(&self, rows: Vec<NewAssetRecord>) -> anyhow::Result<Vec<AssetRecord>> {
        self.create_many_calls.fetch_add(1, Ordering::SeqCst);
        let created_at = Utc::now();
        let records: Vec<AssetRecord> = rows
            .into_iter()
            .map(|row| AssetRecord {
                id: Uuid::new_v4(),
                gallery_id: row.gallery_id,
                object_id: row.object_id,
                placeholder_hash: row.placeholder_hash,
                width: row.width,
                height: row.height,
                created_at,
            })
            .collect();
        self.rows
            .lock()
            .expect("lock poisoned")
            .extend(records.iter().cloned());
        Ok(records)
    }

    async fn list_page(
        &self,
        gallery_id: Uuid,
        cursor_after: Option<Uuid>,
        limit: i64,
    ) -> anyhow::Result<Vec<AssetRecord>> {
        self.list_page_calls.fetch_add(1, Ordering::SeqCst);
        let rows = self.sorted_for(gallery_id);
        let start = match cursor_after {
            None => 0,
            Some(cursor) => {
                rows.iter()
                    .position(|r| r.id == cursor)
                    .ok_or_else(|| anyhow::anyhow!("Cursor not found: {}", cursor))?
                    + 1
            }
        };
        Ok(rows
            .into_iter()
            .skip(start)
            .take(limit.max(0) as usize)
            .collect())
    }
}
