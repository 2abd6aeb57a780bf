//! Archive download integration tests.
//!
//! Run with: `cargo test -p moments-api --test archive_test`

mod helpers;

use helpers::{api_path, attach_body, setup_test_app};
use std::io::Read;

#[tokio::test]
async fn test_archive_contains_every_asset_with_gallery_derived_name() {
    let app = setup_test_app().await;
    let gallery = app.create_gallery("Summer Party 2026!", None).await;

    let mut ids = Vec::new();
    for i in 0..4 {
        ids.push(app.put_object(&format!("photo-{}.jpg", i), b"jpeg-bytes").await);
    }
    app.client()
        .post(&api_path(&format!("/galleries/{}/assets", gallery.id)))
        .json(&attach_body(&ids))
        .await;

    let response = app
        .client()
        .get(&api_path(&format!("/galleries/{}/archive", gallery.id)))
        .await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(
        response
            .headers()
            .get("content-disposition")
            .unwrap()
            .to_str()
            .unwrap(),
        "attachment; filename=\"summer-party-2026.zip\""
    );

    let data = response.as_bytes().to_vec();
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(data)).expect("open zip");
    assert_eq!(archive.len(), 4);

    let mut contents = String::new();
    archive
        .by_name("photo-0.jpg")
        .expect("entry present")
        .read_to_string(&mut contents)
        .unwrap();
    assert_eq!(contents, "jpeg-bytes");
}

#[tokio::test]
async fn test_duplicate_filenames_renamed_in_archive() {
    let app = setup_test_app().await;
    let gallery = app.create_gallery("Party", None).await;

    let ids = vec![
        app.put_object("photo.jpg", b"one").await,
        app.put_object("photo.jpg", b"two").await,
    ];
    app.client()
        .post(&api_path(&format!("/galleries/{}/assets", gallery.id)))
        .json(&attach_body(&ids))
        .await;

    let response = app
        .client()
        .get(&api_path(&format!("/galleries/{}/archive", gallery.id)))
        .await;
    assert_eq!(response.status_code(), 200);

    let data = response.as_bytes().to_vec();
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(data)).unwrap();
    let mut names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect();
    names.sort();
    assert_eq!(names, vec!["photo (1).jpg", "photo.jpg"]);
}

#[tokio::test]
async fn test_empty_gallery_archive_is_204() {
    let app = setup_test_app().await;
    let gallery = app.create_gallery("Empty", None).await;

    let response = app
        .client()
        .get(&api_path(&format!("/galleries/{}/archive", gallery.id)))
        .await;

    assert_eq!(response.status_code(), 204);
}

#[tokio::test]
async fn test_incomplete_archive_is_withheld_with_true_counts() {
    let app = setup_test_app().await;
    let gallery = app.create_gallery("Party", None).await;

    let ids = vec![
        app.put_object("a.jpg", b"a").await,
        app.put_object("b.jpg", b"b").await,
        app.put_object("c.jpg", b"c").await,
    ];
    app.client()
        .post(&api_path(&format!("/galleries/{}/assets", gallery.id)))
        .json(&attach_body(&ids))
        .await;

    // One asset becomes unfetchable after finalization.
    app.objects.fail_downloads_for(ids[1].clone());

    let response = app
        .client()
        .get(&api_path(&format!("/galleries/{}/archive", gallery.id)))
        .await;

    assert_eq!(response.status_code(), 500);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "ARCHIVE_INCOMPLETE");
    // The user is told the true counts.
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("2"), "message: {}", message);
    assert!(message.contains("3"), "message: {}", message);
}

#[tokio::test]
async fn test_archive_of_unknown_gallery_is_404() {
    let app = setup_test_app().await;
    let response = app
        .client()
        .get(&api_path(&format!("/galleries/{}/archive", uuid::Uuid::new_v4())))
        .await;
    assert_eq!(response.status_code(), 404);
}
