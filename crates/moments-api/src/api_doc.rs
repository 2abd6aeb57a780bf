//! OpenAPI document.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::gallery_get::get_gallery,
        crate::handlers::asset_list::list_assets,
        crate::handlers::asset_finalize::attach_assets,
        crate::handlers::asset_upload::upload_batch,
        crate::handlers::archive_download::download_archive,
    ),
    components(schemas(
        moments_core::models::Gallery,
        moments_core::models::AssetRecord,
        moments_core::models::AssetInput,
        moments_core::models::AttachAssetsRequest,
        moments_core::models::AttachAssetsResponse,
        moments_core::models::AssetPageResponse,
        crate::handlers::asset_upload::BatchUploadResponse,
        crate::error::ErrorResponse,
    )),
    tags(
        (name = "galleries", description = "Gallery access"),
        (name = "assets", description = "Asset upload, finalization, listing, and bulk download")
    ),
    info(
        title = "Moments API",
        description = "Shared event gallery: guest uploads, cursor-paged listing, bulk export"
    )
)]
pub struct ApiDoc;
