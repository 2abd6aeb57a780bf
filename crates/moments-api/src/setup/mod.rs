//! Application setup and initialization
//!
//! All application initialization logic lives here, out of main.rs.

pub mod database;
pub mod routes;
pub mod server;
pub mod services;
pub mod storage;

use crate::state::AppState;
use anyhow::{Context, Result};
use moments_core::Config;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    config
        .validate()
        .context("Configuration validation failed")?;

    crate::telemetry::init_telemetry()
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!("Configuration loaded and validated successfully");

    let pool = database::setup_database(&config).await?;

    let objects = storage::setup_storage(&config).await?;

    let state = services::initialize_services(&config, pool, objects)?;

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
