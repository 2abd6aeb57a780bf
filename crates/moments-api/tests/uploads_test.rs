//! Batch upload integration tests (multipart, full pipeline).
//!
//! Run with: `cargo test -p moments-api --test uploads_test`

mod helpers;

use axum_test::multipart::{MultipartForm, Part};
use chrono::{Duration, Utc};
use helpers::{api_path, setup_test_app};
use moments_db::AssetStore;
use std::io::Cursor;

/// Encode a small real PNG so the placeholder pipeline has pixels to hash.
fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    use image::{DynamicImage, ImageFormat, RgbImage};
    let img = DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x * 40 % 256) as u8, (y * 40 % 256) as u8, 200])
    }));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).expect("encode png");
    out.into_inner()
}

fn form_with_files(files: Vec<(String, Vec<u8>)>) -> MultipartForm {
    let mut form = MultipartForm::new();
    for (name, data) in files {
        form = form.add_part(
            "files",
            Part::bytes(data).file_name(name).mime_type("image/png"),
        );
    }
    form
}

#[tokio::test]
async fn test_batch_upload_creates_assets() {
    let app = setup_test_app().await;
    let gallery = app.create_gallery("Hiking Trip", None).await;

    let files = (0..3)
        .map(|i| (format!("trail-{}.png", i), png_bytes(16, 12)))
        .collect();

    let response = app
        .client()
        .post(&api_path(&format!("/galleries/{}/uploads", gallery.id)))
        .multipart(form_with_files(files))
        .await;

    assert_eq!(response.status_code(), 201);
    let body: serde_json::Value = response.json();
    assert_eq!(body["uploaded"], 3);
    assert_eq!(body["created"], 3);
    assert!(body["failed"].as_array().unwrap().is_empty());

    // Records landed with real dimensions from the preprocessor.
    assert_eq!(app.assets.row_count(), 3);
    let page = app
        .assets
        .list_page(gallery.id, None, 10)
        .await
        .expect("list");
    assert!(page.iter().all(|r| r.width == 16 && r.height == 12));
    assert!(page.iter().all(|r| !r.placeholder_hash.is_empty()));
}

#[tokio::test]
async fn test_batch_upload_with_remote_failures_reports_failed_indices() {
    let app = setup_test_app().await;
    let gallery = app.create_gallery("Flaky", None).await;
    app.objects.fail_uploads_matching("bad.png");

    let files = vec![
        ("ok-0.png".to_string(), png_bytes(8, 8)),
        ("bad.png".to_string(), png_bytes(8, 8)),
        ("ok-1.png".to_string(), png_bytes(8, 8)),
    ];

    let response = app
        .client()
        .post(&api_path(&format!("/galleries/{}/uploads", gallery.id)))
        .multipart(form_with_files(files))
        .await;

    assert_eq!(response.status_code(), 201);
    let body: serde_json::Value = response.json();
    assert_eq!(body["uploaded"], 2);
    assert_eq!(body["created"], 2);
    assert_eq!(body["failed"], serde_json::json!([1]));
}

#[tokio::test]
async fn test_upload_to_expired_gallery_is_410_before_any_transfer() {
    let app = setup_test_app().await;
    let gallery = app
        .create_gallery("Expired", Some(Utc::now() - Duration::hours(1)))
        .await;

    let response = app
        .client()
        .post(&api_path(&format!("/galleries/{}/uploads", gallery.id)))
        .multipart(form_with_files(vec![(
            "a.png".to_string(),
            png_bytes(8, 8),
        )]))
        .await;

    assert_eq!(response.status_code(), 410);
    assert_eq!(app.objects.put_calls(), 0);
}

#[tokio::test]
async fn test_upload_with_disallowed_extension_is_400() {
    let app = setup_test_app().await;
    let gallery = app.create_gallery("Strict", None).await;

    let response = app
        .client()
        .post(&api_path(&format!("/galleries/{}/uploads", gallery.id)))
        .multipart(form_with_files(vec![(
            "malware.exe".to_string(),
            vec![0u8; 10],
        )]))
        .await;

    assert_eq!(response.status_code(), 400);
    assert_eq!(app.objects.put_calls(), 0);
}

#[tokio::test]
async fn test_upload_without_files_is_400() {
    let app = setup_test_app().await;
    let gallery = app.create_gallery("Empty", None).await;

    let response = app
        .client()
        .post(&api_path(&format!("/galleries/{}/uploads", gallery.id)))
        .multipart(MultipartForm::new().add_text("note", "no files here"))
        .await;

    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_video_upload_gets_fallback_placeholder() {
    let app = setup_test_app().await;
    let gallery = app.create_gallery("Videos", None).await;

    let response = app
        .client()
        .post(&api_path(&format!("/galleries/{}/uploads", gallery.id)))
        .multipart(
            MultipartForm::new().add_part(
                "files",
                Part::bytes(vec![0u8; 64])
                    .file_name("clip.mp4")
                    .mime_type("video/mp4"),
            ),
        )
        .await;

    assert_eq!(response.status_code(), 201);
    let page = app
        .assets
        .list_page(gallery.id, None, 10)
        .await
        .expect("list");
    assert_eq!(page.len(), 1);
    assert_eq!(
        page[0].placeholder_hash,
        moments_core::constants::FALLBACK_PLACEHOLDER_HASH
    );
    assert_eq!(
        page[0].width,
        moments_core::constants::FALLBACK_DIMENSION as i32
    );
}
