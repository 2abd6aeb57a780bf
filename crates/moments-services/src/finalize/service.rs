//! Metadata finalizer: attach uploaded objects to a gallery.
//!
//! Turns a batch of uploaded object references into durable asset records.
//! Fail-closed on missing objects (no partial batch can point at nothing);
//! best-effort on the gallery counter (drift is tolerated, never rolled back).

use std::collections::HashSet;
use std::sync::Arc;

use moments_core::models::{NewAssetRecord, UploadedAsset};
use moments_core::validation::{
    validate_dimensions, validate_object_id, validate_placeholder_hash,
};
use moments_core::AppError;
use moments_db::{AssetStore, GalleryStore};
use moments_storage::ObjectStore;
use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct FinalizeConfig {
    /// Rows per document-store write.
    pub chunk_size: usize,
    /// Maximum entries accepted per call.
    pub max_batch: usize,
    /// Gallery that rejects all writes (the public demo gallery).
    pub sample_gallery_id: Option<Uuid>,
}

impl Default for FinalizeConfig {
    fn default() -> Self {
        Self {
            chunk_size: 100,
            max_batch: 1000,
            sample_gallery_id: None,
        }
    }
}

pub struct FinalizeService {
    galleries: Arc<dyn GalleryStore>,
    assets: Arc<dyn AssetStore>,
    objects: Arc<dyn ObjectStore>,
    config: FinalizeConfig,
}

impl FinalizeService {
    pub fn new(
        galleries: Arc<dyn GalleryStore>,
        assets: Arc<dyn AssetStore>,
        objects: Arc<dyn ObjectStore>,
        config: FinalizeConfig,
    ) -> Self {
        Self {
            galleries,
            assets,
            objects,
            config,
        }
    }

    /// Attach a batch of uploaded objects to `gallery_id` and return the
    /// number of records created.
    ///
    /// Duplicate object ids within the batch are collapsed (first occurrence
    /// wins). Two calls with the same batch create two independent record
    /// sets; no cross-call idempotence is provided.
    #[tracing::instrument(skip(self, uploads), fields(gallery_id = %gallery_id, batch_size = uploads.len()))]
    pub async fn attach_assets(
        &self,
        gallery_id: Uuid,
        uploads: Vec<UploadedAsset>,
    ) -> Result<usize, AppError> {
        let gallery = self
            .galleries
            .get(gallery_id)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::NotFound(format!("Gallery not found: {}", gallery_id)))?;

        if self.config.sample_gallery_id == Some(gallery_id) {
            return Err(AppError::BadRequest(
                "The sample gallery is read-only.".to_string(),
            ));
        }

        if gallery.is_expired() {
            return Err(AppError::Expired(gallery_id.to_string()));
        }

        if uploads.len() > self.config.max_batch {
            return Err(AppError::BadRequest(format!(
                "Batch size exceeds maximum of {}",
                self.config.max_batch
            )));
        }

        for upload in &uploads {
            validate_object_id(&upload.object_id)?;
            validate_placeholder_hash(&upload.placeholder_hash)?;
            validate_dimensions(upload.width, upload.height)?;
        }

        // Deduplicate by object id, first occurrence wins.
        let mut seen = HashSet::new();
        let uploads: Vec<UploadedAsset> = uploads
            .into_iter()
            .filter(|u| seen.insert(u.object_id.clone()))
            .collect();

        if uploads.is_empty() {
            return Ok(0);
        }

        // Fail closed: every referenced object must exist before any record
        // is written, so no record can point at a missing object.
        let checks = futures::future::join_all(
            uploads.iter().map(|u| self.objects.exists(&u.object_id)),
        )
        .await;

        let mut missing = Vec::new();
        for (upload, check) in uploads.iter().zip(checks) {
            match check {
                Ok(true) => {}
                Ok(false) => missing.push(upload.object_id.clone()),
                Err(e) => return Err(AppError::Storage(e.to_string())),
            }
        }
        if !missing.is_empty() {
            return Err(AppError::MissingObjects { ids: missing });
        }

        // Chunked writes respect the platform's batch-size limit. A chunk
        // failure propagates to the caller; chunks already written stay.
        let mut created = 0usize;
        for chunk in uploads.chunks(self.config.chunk_size) {
            let rows: Vec<NewAssetRecord> = chunk
                .iter()
                .map(|u| NewAssetRecord {
                    gallery_id,
                    object_id: u.object_id.clone(),
                    placeholder_hash: u.placeholder_hash.clone(),
                    width: u.width,
                    height: u.height,
                })
                .collect();
            created += self
                .assets
                .create_many(rows)
                .await
                .map_err(AppError::from)?
                .len();
        }

        // Counter increment is best-effort; records already exist either way.
        if let Err(e) = self
            .galleries
            .increment_total_assets(gallery_id, created as i64)
            .await
        {
            tracing::warn!(
                gallery_id = %gallery_id,
                delta = created,
                error = %e,
                "Failed to increment gallery counter; counter may drift"
            );
        }

        tracing::info!(gallery_id = %gallery_id, created, "Assets attached to gallery");
        Ok(created)
    }
}
