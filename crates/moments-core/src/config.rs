//! Configuration module
//!
//! Configuration for the API and the transfer pipeline, loaded from the
//! environment with sensible defaults for everything except `DATABASE_URL`.

use std::env;

use uuid::Uuid;

use crate::storage_types::StorageBackend;

// Common constants
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;

/// Base configuration shared by server and services
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub environment: String,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub base: BaseConfig,
    pub database_url: String,
    // Storage configuration
    pub storage_backend: StorageBackend,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    // Upload pipeline
    pub upload_concurrency: usize,
    pub upload_max_attempts: u32,
    pub max_file_size_bytes: usize,
    pub allowed_extensions: Vec<String>,
    pub allowed_content_types: Vec<String>,
    // Finalize / listing / archive
    pub finalize_chunk_size: usize,
    pub assets_page_size: i64,
    pub archive_fetch_concurrency: usize,
    /// Gallery that rejects all writes (the public demo gallery), if configured.
    pub sample_gallery_id: Option<Uuid>,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        const MAX_FILE_SIZE_MB: usize = 100;
        const UPLOAD_CONCURRENCY: usize = 5;
        const UPLOAD_MAX_ATTEMPTS: u32 = 3;
        const FINALIZE_CHUNK_SIZE: usize = 100;
        const ASSETS_PAGE_SIZE: i64 = 100;
        const ARCHIVE_FETCH_CONCURRENCY: usize = 15;

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let is_production =
            environment.to_lowercase() == "production" || environment.to_lowercase() == "prod";
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let max_file_size_mb = env::var("MAX_FILE_SIZE_MB")
            .unwrap_or_else(|_| MAX_FILE_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_FILE_SIZE_MB);

        let allowed_extensions = env::var("ALLOWED_EXTENSIONS")
            .unwrap_or_else(|_| "jpg,jpeg,png,webp,heic,mp4,mov".to_string())
            .split(',')
            .map(|s| s.trim().trim_start_matches('.').to_lowercase())
            .collect();

        let allowed_content_types = env::var("ALLOWED_CONTENT_TYPES")
            .unwrap_or_else(|_| {
                "image/jpeg,image/png,image/webp,image/heic,video/mp4,video/quicktime".to_string()
            })
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .collect();

        let base = BaseConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| "4000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            environment,
        };

        let storage_backend = env::var("STORAGE_BACKEND")
            .ok()
            .and_then(|s| match s.to_lowercase().as_str() {
                "local" => Some(StorageBackend::Local),
                "memory" => Some(StorageBackend::Memory),
                _ => None,
            })
            .unwrap_or(StorageBackend::Local);

        let sample_gallery_id = env::var("SAMPLE_GALLERY_ID")
            .ok()
            .and_then(|s| Uuid::parse_str(s.trim()).ok());

        Ok(Config {
            base,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            storage_backend,
            local_storage_path: env::var("LOCAL_STORAGE_PATH").ok(),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL").ok(),
            upload_concurrency: env::var("UPLOAD_CONCURRENCY")
                .unwrap_or_else(|_| UPLOAD_CONCURRENCY.to_string())
                .parse()
                .unwrap_or(UPLOAD_CONCURRENCY),
            upload_max_attempts: env::var("UPLOAD_MAX_ATTEMPTS")
                .unwrap_or_else(|_| UPLOAD_MAX_ATTEMPTS.to_string())
                .parse()
                .unwrap_or(UPLOAD_MAX_ATTEMPTS),
            max_file_size_bytes: max_file_size_mb * 1024 * 1024,
            allowed_extensions,
            allowed_content_types,
            finalize_chunk_size: env::var("FINALIZE_CHUNK_SIZE")
                .unwrap_or_else(|_| FINALIZE_CHUNK_SIZE.to_string())
                .parse()
                .unwrap_or(FINALIZE_CHUNK_SIZE),
            assets_page_size: env::var("ASSETS_PAGE_SIZE")
                .unwrap_or_else(|_| ASSETS_PAGE_SIZE.to_string())
                .parse()
                .unwrap_or(ASSETS_PAGE_SIZE),
            archive_fetch_concurrency: env::var("ARCHIVE_FETCH_CONCURRENCY")
                .unwrap_or_else(|_| ARCHIVE_FETCH_CONCURRENCY.to_string())
                .parse()
                .unwrap_or(ARCHIVE_FETCH_CONCURRENCY),
            sample_gallery_id,
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.upload_concurrency == 0 {
            return Err(anyhow::anyhow!("UPLOAD_CONCURRENCY must be at least 1"));
        }
        if self.upload_max_attempts == 0 {
            return Err(anyhow::anyhow!("UPLOAD_MAX_ATTEMPTS must be at least 1"));
        }
        if self.archive_fetch_concurrency == 0 {
            return Err(anyhow::anyhow!(
                "ARCHIVE_FETCH_CONCURRENCY must be at least 1"
            ));
        }
        if self.assets_page_size <= 0 {
            return Err(anyhow::anyhow!("ASSETS_PAGE_SIZE must be positive"));
        }
        if self.finalize_chunk_size == 0 {
            return Err(anyhow::anyhow!("FINALIZE_CHUNK_SIZE must be at least 1"));
        }
        if self.storage_backend == StorageBackend::Local && self.local_storage_path.is_none() {
            return Err(anyhow::anyhow!(
                "LOCAL_STORAGE_PATH must be set when STORAGE_BACKEND=local"
            ));
        }
        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    // Convenience getters for common fields
    pub fn server_port(&self) -> u16 {
        self.base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.base.cors_origins
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn environment(&self) -> &str {
        &self.base.environment
    }
}
