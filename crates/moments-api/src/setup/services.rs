//! Service and repository wiring.

use crate::state::AppState;
use anyhow::Result;
use moments_core::Config;
use moments_db::{PgAssetRepository, PgGalleryRepository};
use moments_services::{
    ArchiveConfig, ArchiveService, FinalizeConfig, FinalizeService, SchedulerConfig,
    UploadScheduler,
};
use moments_storage::ObjectStore;
use sqlx::PgPool;
use std::sync::Arc;

pub fn initialize_services(
    config: &Config,
    pool: PgPool,
    objects: Arc<dyn ObjectStore>,
) -> Result<Arc<AppState>> {
    let galleries = Arc::new(PgGalleryRepository::new(pool.clone()));
    let assets = Arc::new(PgAssetRepository::new(pool));

    Ok(build_state(config.clone(), objects, galleries, assets))
}

/// Assemble the state from already-constructed stores. Tests use this with
/// in-memory backends.
pub fn build_state(
    config: Config,
    objects: Arc<dyn ObjectStore>,
    galleries: Arc<dyn moments_db::GalleryStore>,
    assets: Arc<dyn moments_db::AssetStore>,
) -> Arc<AppState> {
    let finalize = FinalizeService::new(
        galleries.clone(),
        assets.clone(),
        objects.clone(),
        FinalizeConfig {
            chunk_size: config.finalize_chunk_size,
            max_batch: moments_core::constants::MAX_FINALIZE_BATCH,
            sample_gallery_id: config.sample_gallery_id,
        },
    );

    let archive = ArchiveService::new(
        objects.clone(),
        ArchiveConfig {
            fetch_concurrency: config.archive_fetch_concurrency,
            name_max_len: moments_core::constants::ARCHIVE_NAME_MAX_LEN,
        },
    );

    let scheduler = UploadScheduler::new(
        objects.clone(),
        SchedulerConfig {
            concurrency: config.upload_concurrency,
            max_attempts: config.upload_max_attempts,
        },
    );

    Arc::new(AppState {
        config,
        objects,
        galleries,
        assets,
        finalize,
        archive,
        scheduler,
    })
}
