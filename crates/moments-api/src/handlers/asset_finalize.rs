//! Finalize endpoint: attach uploaded objects to a gallery.

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use moments_core::models::{AttachAssetsRequest, AttachAssetsResponse, UploadedAsset};
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    post,
    path = "/api/v1/galleries/{gallery_id}/assets",
    tag = "assets",
    params(("gallery_id" = Uuid, Path, description = "Gallery ID")),
    request_body = AttachAssetsRequest,
    responses(
        (status = 201, description = "Asset records created", body = AttachAssetsResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 404, description = "Gallery or referenced objects not found", body = ErrorResponse),
        (status = 410, description = "Gallery expired", body = ErrorResponse),
        (status = 500, description = "Partial persistence failure", body = ErrorResponse)
    )
)]
pub async fn attach_assets(
    State(state): State<Arc<AppState>>,
    Path(gallery_id): Path<Uuid>,
    ValidatedJson(body): ValidatedJson<AttachAssetsRequest>,
) -> Result<(StatusCode, Json<AttachAssetsResponse>), HttpAppError> {
    let uploads: Vec<UploadedAsset> = body
        .assets
        .into_iter()
        .map(|a| UploadedAsset {
            object_id: a.object_id,
            placeholder_hash: a.placeholder_hash,
            width: a.width,
            height: a.height,
        })
        .collect();

    let created = state.finalize.attach_assets(gallery_id, uploads).await?;

    Ok((StatusCode::CREATED, Json(AttachAssetsResponse { created })))
}
