//! Test helpers: build AppState and router against in-memory backends.
//!
//! Run from workspace root: `cargo test -p moments-api` (no external services
//! required; storage and the document store are in-memory doubles).

use axum_test::TestServer;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use moments_api::constants;
use moments_api::setup::{routes, services};
use moments_core::models::{Gallery, NewGallery};
use moments_core::{BaseConfig, Config, StorageBackend};
use moments_db::{GalleryStore, MemoryAssetStore, MemoryGalleryStore};
use moments_storage::{MemoryObjectStore, ObjectStore};
use std::sync::Arc;

/// API path prefix for tests (e.g. `/api/v1`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

/// Test application: server plus the backing in-memory stores.
pub struct TestApp {
    pub server: TestServer,
    pub galleries: Arc<MemoryGalleryStore>,
    pub assets: Arc<MemoryAssetStore>,
    pub objects: Arc<MemoryObjectStore>,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub async fn create_gallery(&self, name: &str, expiry_at: Option<DateTime<Utc>>) -> Gallery {
        self.galleries
            .create(NewGallery {
                name: name.to_string(),
                description: None,
                expiry_at,
            })
            .await
            .expect("create gallery")
    }

    /// Put an object into storage directly, as a finished client-side upload.
    pub async fn put_object(&self, filename: &str, data: &'static [u8]) -> String {
        self.objects
            .put(filename, "image/jpeg", Bytes::from_static(data), None)
            .await
            .expect("put object")
    }
}

pub fn test_config() -> Config {
    Config {
        base: BaseConfig {
            server_port: 0,
            cors_origins: vec!["*".to_string()],
            db_max_connections: 5,
            db_timeout_seconds: 5,
            environment: "test".to_string(),
        },
        database_url: "postgres://unused-in-tests".to_string(),
        storage_backend: StorageBackend::Memory,
        local_storage_path: None,
        local_storage_base_url: None,
        upload_concurrency: 5,
        upload_max_attempts: 3,
        max_file_size_bytes: 10 * 1024 * 1024,
        allowed_extensions: ["jpg", "jpeg", "png", "webp", "heic", "mp4", "mov"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        allowed_content_types: ["image/jpeg", "image/png", "video/mp4"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        finalize_chunk_size: 100,
        assets_page_size: 100,
        archive_fetch_concurrency: 15,
        sample_gallery_id: None,
    }
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(test_config()).await
}

pub async fn setup_test_app_with(config: Config) -> TestApp {
    let galleries = Arc::new(MemoryGalleryStore::new());
    let assets = Arc::new(MemoryAssetStore::new());
    let objects = Arc::new(MemoryObjectStore::new());

    let state = services::build_state(
        config.clone(),
        objects.clone(),
        galleries.clone(),
        assets.clone(),
    );
    let router = routes::setup_routes(&config, state).expect("router");
    let server = TestServer::new(router).expect("test server");

    TestApp {
        server,
        galleries,
        assets,
        objects,
    }
}

/// A well-formed placeholder hash for request bodies.
pub fn placeholder_hash() -> String {
    "LEHV6nWB2yk8pyo0adR*.7kCMdnj".to_string()
}

/// Finalize request body for a set of object ids.
pub fn attach_body(object_ids: &[String]) -> serde_json::Value {
    serde_json::json!({
        "assets": object_ids
            .iter()
            .map(|id| serde_json::json!({
                "objectId": id,
                "placeholderHash": placeholder_hash(),
                "width": 800,
                "height": 600,
            }))
            .collect::<Vec<_>>()
    })
}
