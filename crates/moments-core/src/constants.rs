//! Shared constants for the upload and archive pipeline.

/// Fallback placeholder hash used for videos and undecodable images.
pub const FALLBACK_PLACEHOLDER_HASH: &str = "LEHV6nWB2yk8pyo0adR*.7kCMdnj";

/// Fallback dimension (square) reported when an image cannot be decoded.
pub const FALLBACK_DIMENSION: u32 = 800;

/// Long edge of the downscaled raster fed to the placeholder encoder.
pub const PLACEHOLDER_RASTER_SIZE: u32 = 32;

/// Placeholder component grid (x, y).
pub const PLACEHOLDER_COMPONENTS_X: u32 = 4;
pub const PLACEHOLDER_COMPONENTS_Y: u32 = 3;

/// Maximum number of asset references accepted by one finalize call.
pub const MAX_FINALIZE_BATCH: usize = 1000;

/// Rows per document-store write when attaching assets to a gallery.
pub const FINALIZE_CHUNK_SIZE: usize = 100;

/// Records per page when walking a gallery's assets.
pub const ASSETS_PAGE_SIZE: i64 = 100;

/// Maximum length of a generated archive filename (before the extension).
pub const ARCHIVE_NAME_MAX_LEN: usize = 100;

/// File extensions treated as video for the placeholder fallback.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov"];
