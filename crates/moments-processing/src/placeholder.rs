//! Placeholder generation: blur hash + native dimensions before upload.
//!
//! The placeholder is painted as an instant low-bandwidth preview while the
//! full asset streams in. It is not used for deduplication or integrity, so
//! every failure path collapses to a fixed fallback instead of failing the
//! upload.

use std::io::Cursor;

use image::{GenericImageView, ImageReader};
use moments_core::constants::{
    FALLBACK_DIMENSION, FALLBACK_PLACEHOLDER_HASH, PLACEHOLDER_COMPONENTS_X,
    PLACEHOLDER_COMPONENTS_Y, PLACEHOLDER_RASTER_SIZE, VIDEO_EXTENSIONS,
};
use moments_core::models::Placeholder;

/// Whether a filename looks like a video (placeholder fallback applies).
pub fn is_video_filename(name: &str) -> bool {
    name.rsplit('.')
        .next()
        .map(|ext| ext.to_lowercase())
        .is_some_and(|ext| VIDEO_EXTENSIONS.contains(&ext.as_str()))
}

/// Derives placeholder metadata from raw file bytes.
pub struct PlaceholderGenerator;

impl PlaceholderGenerator {
    fn fallback() -> Placeholder {
        Placeholder {
            hash: FALLBACK_PLACEHOLDER_HASH.to_string(),
            width: FALLBACK_DIMENSION,
            height: FALLBACK_DIMENSION,
        }
    }

    /// Compute the placeholder for one file. Never fails: videos and
    /// undecodable bytes produce the fallback.
    pub async fn generate(data: &[u8], is_video: bool) -> Placeholder {
        if is_video {
            return Self::fallback();
        }

        let data = data.to_vec();
        // Image decode is CPU-bound; run off the async pool to avoid blocking other tasks.
        let result = tokio::task::spawn_blocking(move || Self::encode(&data)).await;

        match result {
            Ok(Ok(placeholder)) => placeholder,
            Ok(Err(e)) => {
                tracing::debug!(error = %e, "Placeholder generation failed, using fallback");
                Self::fallback()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Placeholder task panicked, using fallback");
                Self::fallback()
            }
        }
    }

    fn encode(data: &[u8]) -> anyhow::Result<Placeholder> {
        let reader = ImageReader::new(Cursor::new(data)).with_guessed_format()?;
        let img = reader.decode()?;
        let (width, height) = img.dimensions();

        let thumb = img.thumbnail(PLACEHOLDER_RASTER_SIZE, PLACEHOLDER_RASTER_SIZE);
        let (tw, th) = thumb.dimensions();
        let rgba = thumb.to_rgba8();

        let hash = blurhash::encode(
            PLACEHOLDER_COMPONENTS_X,
            PLACEHOLDER_COMPONENTS_Y,
            tw,
            th,
            rgba.as_raw(),
        )
        .map_err(|e| anyhow::anyhow!("Blurhash encoding failed: {}", e))?;

        Ok(Placeholder {
            hash,
            width,
            height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, RgbImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        }));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).expect("encode png");
        out.into_inner()
    }

    #[tokio::test]
    async fn test_image_records_native_dimensions() {
        let placeholder = PlaceholderGenerator::generate(&png_bytes(64, 48), false).await;
        assert_eq!(placeholder.width, 64);
        assert_eq!(placeholder.height, 48);
        assert_ne!(placeholder.hash, FALLBACK_PLACEHOLDER_HASH);
        assert!(!placeholder.hash.is_empty());
    }

    #[tokio::test]
    async fn test_video_uses_fallback() {
        let placeholder = PlaceholderGenerator::generate(&png_bytes(10, 10), true).await;
        assert_eq!(placeholder.hash, FALLBACK_PLACEHOLDER_HASH);
        assert_eq!(placeholder.width, FALLBACK_DIMENSION);
        assert_eq!(placeholder.height, FALLBACK_DIMENSION);
    }

    #[tokio::test]
    async fn test_undecodable_bytes_use_fallback() {
        let placeholder = PlaceholderGenerator::generate(b"not an image at all", false).await;
        assert_eq!(placeholder.hash, FALLBACK_PLACEHOLDER_HASH);
        assert_eq!(placeholder.width, FALLBACK_DIMENSION);
    }

    #[tokio::test]
    async fn test_deterministic_for_same_input() {
        let bytes = png_bytes(32, 32);
        let a = PlaceholderGenerator::generate(&bytes, false).await;
        let b = PlaceholderGenerator::generate(&bytes, false).await;
        assert_eq!(a, b);
    }

    #[test]
    fn test_is_video_filename() {
        assert!(is_video_filename("clip.mp4"));
        assert!(is_video_filename("CLIP.MOV"));
        assert!(!is_video_filename("photo.jpg"));
        assert!(!is_video_filename("noext"));
    }
}
