//! Batch upload: drive the full pipeline server-side.
//!
//! Multipart files run through the upload scheduler (bounded pool, per-file
//! retry, placeholder generation) and the completed set is finalized onto the
//! gallery in one call.

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::upload::{extract_multipart_files, validate_file_extension, validate_file_size};
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use moments_core::AppError;
use moments_db::GalleryStore;
use moments_services::NoopUploadObserver;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
pub struct BatchUploadResponse {
    /// Files uploaded to storage.
    pub uploaded: usize,
    /// Input indices that exhausted every attempt.
    pub failed: Vec<usize>,
    /// Asset records created on the gallery.
    pub created: usize,
}

#[utoipa::path(
    post,
    path = "/api/v1/galleries/{gallery_id}/uploads",
    tag = "assets",
    params(("gallery_id" = Uuid, Path, description = "Gallery ID")),
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Batch processed", body = BatchUploadResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 404, description = "Gallery not found", body = ErrorResponse),
        (status = 410, description = "Gallery expired", body = ErrorResponse),
        (status = 413, description = "A file exceeds the size limit", body = ErrorResponse)
    )
)]
pub async fn upload_batch(
    State(state): State<Arc<AppState>>,
    Path(gallery_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<BatchUploadResponse>), HttpAppError> {
    // Reject before moving any bytes: unknown or expired galleries never
    // receive uploads.
    let gallery = state
        .galleries
        .get(gallery_id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::NotFound(format!("Gallery not found: {}", gallery_id)))?;
    if gallery.is_expired() {
        return Err(AppError::Expired(gallery_id.to_string()).into());
    }

    let files = extract_multipart_files(multipart).await?;

    for file in &files {
        validate_file_extension(&file.name, &state.config.allowed_extensions)?;
        if let Ok(data) = file.source.read().await {
            validate_file_size(data.len(), state.config.max_file_size_bytes)?;
        }
    }

    tracing::info!(
        gallery_id = %gallery_id,
        file_count = files.len(),
        "Processing upload batch"
    );

    let outcome = state
        .scheduler
        .run(files, Arc::new(NoopUploadObserver))
        .await;

    let uploaded = outcome.completed.len();
    let failed: Vec<usize> = outcome.failed.iter().copied().collect();

    let created = state
        .finalize
        .attach_assets(gallery_id, outcome.completed_assets())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(BatchUploadResponse {
            uploaded,
            failed,
            created,
        }),
    ))
}
