use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use moments_core::models::{Gallery, NewGallery};
use sqlx::PgPool;
use uuid::Uuid;

use crate::traits::GalleryStore;

#[derive(Clone)]
pub struct PgGalleryRepository {
    pool: PgPool,
}

impl PgGalleryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GalleryStore for PgGalleryRepository {
    #[tracing::instrument(skip(self, gallery), fields(db.table = "galleries", db.operation = "insert"))]
    async fn create(&self, gallery: NewGallery) -> anyhow::Result<Gallery> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO galleries (id, name, description, expiry_at, total_assets, created_at, updated_at)
            VALUES ($1, $2, $3, $4, 0, $5, $5)
            "#,
        )
        .bind(id)
        .bind(&gallery.name)
        .bind(&gallery.description)
        .bind(gallery.expiry_at)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create gallery")?;

        Ok(Gallery {
            id,
            name: gallery.name,
            description: gallery.description,
            expiry_at: gallery.expiry_at,
            total_assets: 0,
            created_at: now,
            updated_at: now,
        })
    }

    #[tracing::instrument(skip(self), fields(db.table = "galleries", db.operation = "select", db.record_id = %id))]
    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Gallery>> {
        let gallery = sqlx::query_as::<_, Gallery>(
            r#"
            SELECT id, name, description, expiry_at, total_assets, created_at, updated_at
            FROM galleries
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to load gallery")?;

        Ok(gallery)
    }

    #[tracing::instrument(skip(self), fields(db.table = "galleries", db.operation = "update", db.record_id = %id))]
    async fn increment_total_assets(&self, id: Uuid, delta: i64) -> anyhow::Result<()> {
        let result = sqlx::query(
            "UPDATE galleries SET total_assets = total_assets + $2, updated_at = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(delta)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .context("Failed to increment gallery counter")?;

        if result.rows_affected() == 0 {
            return Err(anyhow::anyhow!("Gallery not found: {}", id));
        }

        Ok(())
    }
}
