//! Database pool setup and migrations.

use anyhow::{Context, Result};
use moments_core::Config;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

pub async fn setup_database(config: &Config) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.base.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.base.db_timeout_seconds))
        .connect(config.database_url())
        .await
        .context("Failed to connect to database")?;

    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!("Database ready");
    Ok(pool)
}
