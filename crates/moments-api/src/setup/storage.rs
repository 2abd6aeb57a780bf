//! Object storage setup.

use anyhow::{Context, Result};
use moments_core::Config;
use moments_storage::{create_object_store, ObjectStore};
use std::sync::Arc;

pub async fn setup_storage(config: &Config) -> Result<Arc<dyn ObjectStore>> {
    let store = create_object_store(config)
        .await
        .context("Failed to initialize object storage")?;

    tracing::info!(backend = %config.storage_backend, "Object storage ready");
    Ok(store)
}
