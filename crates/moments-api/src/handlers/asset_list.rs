//! Incremental asset listing: one cursor page per request (infinite scroll).

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use moments_core::models::AssetPageResponse;
use moments_core::AppError;
use moments_db::GalleryStore;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;
use uuid::Uuid;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListAssetsQuery {
    /// Cursor returned by the previous page.
    pub cursor: Option<Uuid>,
    /// Page size; capped at the configured maximum.
    pub limit: Option<i64>,
}

#[utoipa::path(
    get,
    path = "/api/v1/galleries/{gallery_id}/assets",
    tag = "assets",
    params(
        ("gallery_id" = Uuid, Path, description = "Gallery ID"),
        ListAssetsQuery
    ),
    responses(
        (status = 200, description = "One page of assets, newest first", body = AssetPageResponse),
        (status = 404, description = "Gallery not found", body = ErrorResponse),
        (status = 410, description = "Gallery expired", body = ErrorResponse)
    )
)]
pub async fn list_assets(
    State(state): State<Arc<AppState>>,
    Path(gallery_id): Path<Uuid>,
    Query(query): Query<ListAssetsQuery>,
) -> Result<Json<AssetPageResponse>, HttpAppError> {
    let gallery = state
        .galleries
        .get(gallery_id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::NotFound(format!("Gallery not found: {}", gallery_id)))?;
    if gallery.is_expired() {
        return Err(AppError::Expired(gallery_id.to_string()).into());
    }

    let max = state.config.assets_page_size;
    let page_size = query.limit.unwrap_or(max).clamp(1, max);

    let mut walker = match query.cursor {
        Some(cursor) => moments_services::AssetWalker::resume_after(
            state.assets.clone(),
            gallery_id,
            page_size,
            cursor,
        ),
        None => moments_services::AssetWalker::new(state.assets.clone(), gallery_id, page_size),
    };

    let assets = walker.next_page().await?.unwrap_or_default();
    let has_more = !walker.is_exhausted();

    Ok(Json(AssetPageResponse {
        next_cursor: if has_more { walker.cursor() } else { None },
        has_more,
        assets,
    }))
}
