use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use moments_core::models::{AssetRecord, NewAssetRecord};
use sqlx::{PgPool, QueryBuilder};
use uuid::Uuid;

use crate::traits::AssetStore;

#[derive(Clone)]
pub struct PgAssetRepository {
    pool: PgPool,
}

impl PgAssetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AssetStore for PgAssetRepository {
    #[tracing::instrument(skip(self, rows), fields(db.table = "gallery_assets", db.operation = "insert", row_count = rows.len()))]
    async fn create_many(&self, rows: Vec<NewAssetRecord>) -> anyhow::Result<Vec<AssetRecord>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

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

        let mut builder = QueryBuilder::new(
            "INSERT INTO gallery_assets (id, gallery_id, object_id, placeholder_hash, width, height, created_at) ",
        );
        builder.push_values(records.iter(), |mut b, record| {
            b.push_bind(record.id)
                .push_bind(record.gallery_id)
                .push_bind(&record.object_id)
                .push_bind(&record.placeholder_hash)
                .push_bind(record.width)
                .push_bind(record.height)
                .push_bind(record.created_at);
        });

        builder
            .build()
            .execute(&self.pool)
            .await
            .context("Failed to create asset records")?;

        Ok(records)
    }

    #[tracing::instrument(skip(self), fields(db.table = "gallery_assets", db.operation = "select", db.record_id = %gallery_id))]
    async fn list_page(
        &self,
        gallery_id: Uuid,
        cursor_after: Option<Uuid>,
        limit: i64,
    ) -> anyhow::Result<Vec<AssetRecord>> {
        let records = match cursor_after {
            None => {
                sqlx::query_as::<_, AssetRecord>(
                    r#"
                    SELECT id, gallery_id, object_id, placeholder_hash, width, height, created_at
                    FROM gallery_assets
                    WHERE gallery_id = $1
                    ORDER BY created_at DESC, id DESC
                    LIMIT $2
                    "#,
                )
                .bind(gallery_id)
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
            Some(cursor) => {
                // Row comparison keeps the walk strictly forward even when
                // many records share one created_at.
                sqlx::query_as::<_, AssetRecord>(
                    r#"
                    SELECT a.id, a.gallery_id, a.object_id, a.placeholder_hash, a.width, a.height, a.created_at
                    FROM gallery_assets a
                    WHERE a.gallery_id = $1
                      AND (a.created_at, a.id) < (
                        SELECT c.created_at, c.id FROM gallery_assets c WHERE c.id = $2
                      )
                    ORDER BY a.created_at DESC, a.id DESC
                    LIMIT $3
                    "#,
                )
                .bind(gallery_id)
                .bind(cursor)
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
        }
        .context("Failed to list asset page")?;

        Ok(records)
    }
}
