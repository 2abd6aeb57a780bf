//! Bulk download: walk the full gallery and stream back one ZIP.

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
};
use moments_core::AppError;
use moments_db::GalleryStore;
use moments_services::{AssetWalker, NoopArchiveObserver};
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/v1/galleries/{gallery_id}/archive",
    tag = "assets",
    params(("gallery_id" = Uuid, Path, description = "Gallery ID")),
    responses(
        (status = 200, description = "ZIP archive of every asset", content_type = "application/zip"),
        (status = 204, description = "Gallery has no assets"),
        (status = 404, description = "Gallery not found", body = ErrorResponse),
        (status = 410, description = "Gallery expired", body = ErrorResponse),
        (status = 500, description = "Archive incomplete; names the true counts", body = ErrorResponse)
    )
)]
pub async fn download_archive(
    State(state): State<Arc<AppState>>,
    Path(gallery_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let gallery = state
        .galleries
        .get(gallery_id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::NotFound(format!("Gallery not found: {}", gallery_id)))?;
    if gallery.is_expired() {
        return Err(AppError::Expired(gallery_id.to_string()).into());
    }

    // Full membership first, then fan-out; the assembler gates on the count.
    let records = AssetWalker::new(
        state.assets.clone(),
        gallery_id,
        state.config.assets_page_size,
    )
    .collect_all()
    .await?;

    let bundle = state
        .archive
        .build(&gallery.name, &records, Arc::new(NoopArchiveObserver))
        .await?;

    let Some(bundle) = bundle else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };

    tracing::info!(
        gallery_id = %gallery_id,
        files = bundle.files_added,
        size_bytes = bundle.data.len(),
        "Serving gallery archive"
    );

    let headers = [
        (header::CONTENT_TYPE, "application/zip".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", bundle.filename),
        ),
    ];

    Ok((StatusCode::OK, headers, bundle.data).into_response())
}
