//! Application state shared by all handlers.

use moments_core::Config;
use moments_db::{AssetStore, GalleryStore};
use moments_services::{ArchiveService, FinalizeService, UploadScheduler};
use moments_storage::ObjectStore;
use std::sync::Arc;

pub struct AppState {
    pub config: Config,
    pub objects: Arc<dyn ObjectStore>,
    pub galleries: Arc<dyn GalleryStore>,
    pub assets: Arc<dyn AssetStore>,
    pub finalize: FinalizeService,
    pub archive: ArchiveService,
    pub scheduler: UploadScheduler,
}
