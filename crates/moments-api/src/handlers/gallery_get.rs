//! Gallery fetch: the client's entry point for a shared gallery link.

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use moments_core::models::Gallery;
use moments_core::AppError;
use moments_db::GalleryStore;
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/v1/galleries/{gallery_id}",
    tag = "galleries",
    params(("gallery_id" = Uuid, Path, description = "Gallery ID")),
    responses(
        (status = 200, description = "Gallery", body = Gallery),
        (status = 404, description = "Gallery not found", body = ErrorResponse),
        (status = 410, description = "Gallery expired (body carries the gallery)", body = Gallery)
    )
)]
pub async fn get_gallery(
    State(state): State<Arc<AppState>>,
    Path(gallery_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let gallery = state
        .galleries
        .get(gallery_id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::NotFound(format!("Gallery not found: {}", gallery_id)))?;

    // Expired galleries still return their document so the client can render
    // an expiry screen, but with 410 semantics.
    if gallery.is_expired() {
        return Ok((StatusCode::GONE, Json(gallery)));
    }

    Ok((StatusCode::OK, Json(gallery)))
}
