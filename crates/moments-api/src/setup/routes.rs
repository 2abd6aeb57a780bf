//! Route configuration and setup.

use crate::api_doc::ApiDoc;
use crate::constants;
use crate::handlers::{
    archive_download, asset_finalize, asset_list, asset_upload, gallery_get,
};
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Json, Router,
};
use moments_core::Config;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router, anyhow::Error> {
    let cors = setup_cors(config)?;

    // Multipart batches carry several files per request.
    let body_limit = config.max_file_size_bytes.saturating_mul(10);

    let api = Router::new()
        .route("/galleries/{gallery_id}", get(gallery_get::get_gallery))
        .route(
            "/galleries/{gallery_id}/assets",
            get(asset_list::list_assets).post(asset_finalize::attach_assets),
        )
        .route(
            "/galleries/{gallery_id}/uploads",
            post(asset_upload::upload_batch),
        )
        .route(
            "/galleries/{gallery_id}/archive",
            get(archive_download::download_archive),
        )
        .with_state(state);

    let app = Router::new()
        .nest(constants::API_PREFIX, api)
        .route("/health", get(health))
        .route("/api/openapi.json", get(openapi_json))
        .nest(
            "/docs",
            utoipa_rapidoc::RapiDoc::new("/api/openapi.json")
                .path("/docs")
                .into(),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    Ok(app)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let origins = config.cors_origins();

    if origins.iter().any(|o| o == "*") {
        return Ok(CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any));
    }

    let parsed: Result<Vec<HeaderValue>, _> =
        origins.iter().map(|o| o.parse::<HeaderValue>()).collect();
    let parsed = parsed.map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;

    Ok(CorsLayer::new()
        .allow_origin(parsed)
        .allow_methods(Any)
        .allow_headers(Any))
}
