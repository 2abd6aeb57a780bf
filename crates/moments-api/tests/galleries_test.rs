//! Gallery fetch, finalize, and asset listing integration tests.
//!
//! Run with: `cargo test -p moments-api --test galleries_test`

mod helpers;

use chrono::{Duration, Utc};
use helpers::{api_path, attach_body, setup_test_app, setup_test_app_with, test_config};
use moments_core::models::AssetPageResponse;
use uuid::Uuid;

#[tokio::test]
async fn test_get_gallery() {
    let app = setup_test_app().await;
    let gallery = app.create_gallery("Birthday", None).await;

    let response = app
        .client()
        .get(&api_path(&format!("/galleries/{}", gallery.id)))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["name"], "Birthday");
    assert_eq!(body["total_assets"], 0);
}

#[tokio::test]
async fn test_get_unknown_gallery_is_404() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .get(&api_path(&format!("/galleries/{}", Uuid::new_v4())))
        .await;

    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_get_expired_gallery_is_410_with_body() {
    let app = setup_test_app().await;
    let gallery = app
        .create_gallery("Old Party", Some(Utc::now() - Duration::hours(2)))
        .await;

    let response = app
        .client()
        .get(&api_path(&format!("/galleries/{}", gallery.id)))
        .await;

    assert_eq!(response.status_code(), 410);
    // The body still carries the gallery so the client can render an
    // expiry screen.
    let body: serde_json::Value = response.json();
    assert_eq!(body["name"], "Old Party");
}

#[tokio::test]
async fn test_finalize_creates_records_and_increments_counter() {
    let app = setup_test_app().await;
    let gallery = app.create_gallery("Wedding", None).await;

    let mut ids = Vec::new();
    for i in 0..3 {
        ids.push(app.put_object(&format!("p{}.jpg", i), b"img").await);
    }

    let response = app
        .client()
        .post(&api_path(&format!("/galleries/{}/assets", gallery.id)))
        .json(&attach_body(&ids))
        .await;

    assert_eq!(response.status_code(), 201);
    let body: serde_json::Value = response.json();
    assert_eq!(body["created"], 3);

    let gallery_response = app
        .client()
        .get(&api_path(&format!("/galleries/{}", gallery.id)))
        .await;
    let gallery_body: serde_json::Value = gallery_response.json();
    assert_eq!(gallery_body["total_assets"], 3);
}

#[tokio::test]
async fn test_finalize_with_missing_object_names_ids() {
    let app = setup_test_app().await;
    let gallery = app.create_gallery("Wedding", None).await;

    let mut ids = vec![app.put_object("p.jpg", b"img").await];
    ids.push("never-uploaded".to_string());

    let response = app
        .client()
        .post(&api_path(&format!("/galleries/{}/assets", gallery.id)))
        .json(&attach_body(&ids))
        .await;

    assert_eq!(response.status_code(), 404);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "OBJECTS_NOT_FOUND");
    assert_eq!(body["missing_ids"][0], "never-uploaded");
    // Fail closed: no records were written.
    assert_eq!(app.assets.row_count(), 0);
}

#[tokio::test]
async fn test_finalize_expired_gallery_is_410() {
    let app = setup_test_app().await;
    let gallery = app
        .create_gallery("Expired", Some(Utc::now() - Duration::minutes(1)))
        .await;
    let ids = vec![app.put_object("p.jpg", b"img").await];

    let response = app
        .client()
        .post(&api_path(&format!("/galleries/{}/assets", gallery.id)))
        .json(&attach_body(&ids))
        .await;

    assert_eq!(response.status_code(), 410);
}

#[tokio::test]
async fn test_finalize_sample_gallery_is_rejected() {
    let sample_id = Uuid::new_v4();
    let mut config = test_config();
    config.sample_gallery_id = Some(sample_id);
    let app = setup_test_app_with(config).await;

    let now = Utc::now();
    app.galleries.insert(moments_core::models::Gallery {
        id: sample_id,
        name: "Sample Gallery".to_string(),
        description: None,
        expiry_at: None,
        total_assets: 0,
        created_at: now,
        updated_at: now,
    });

    let ids = vec![app.put_object("p.jpg", b"img").await];
    let response = app
        .client()
        .post(&api_path(&format!("/galleries/{}/assets", sample_id)))
        .json(&attach_body(&ids))
        .await;

    assert_eq!(response.status_code(), 400);
    assert_eq!(app.assets.row_count(), 0);
}

#[tokio::test]
async fn test_finalize_invalid_body_is_400() {
    let app = setup_test_app().await;
    let gallery = app.create_gallery("Wedding", None).await;

    let response = app
        .client()
        .post(&api_path(&format!("/galleries/{}/assets", gallery.id)))
        .json(&serde_json::json!({ "assets": [{ "objectId": 42 }] }))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_finalize_rejects_invalid_placeholder_hash() {
    let app = setup_test_app().await;
    let gallery = app.create_gallery("Wedding", None).await;
    let id = app.put_object("p.jpg", b"img").await;

    let response = app
        .client()
        .post(&api_path(&format!("/galleries/{}/assets", gallery.id)))
        .json(&serde_json::json!({
            "assets": [{
                "objectId": id,
                "placeholderHash": "no!",
                "width": 800,
                "height": 600,
            }]
        }))
        .await;

    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_asset_listing_pages_through_all_records() {
    let app = setup_test_app().await;
    let gallery = app.create_gallery("Big Event", None).await;

    let mut ids = Vec::new();
    for i in 0..250 {
        ids.push(app.put_object(&format!("p{}.jpg", i), b"img").await);
    }
    let response = app
        .client()
        .post(&api_path(&format!("/galleries/{}/assets", gallery.id)))
        .json(&attach_body(&ids))
        .await;
    assert_eq!(response.status_code(), 201);

    // Walk the listing endpoint like an infinite-scroll client would.
    let mut collected = Vec::new();
    let mut cursor: Option<Uuid> = None;
    loop {
        let path = match cursor {
            Some(c) => api_path(&format!("/galleries/{}/assets?cursor={}", gallery.id, c)),
            None => api_path(&format!("/galleries/{}/assets", gallery.id)),
        };
        let page: AssetPageResponse = app.client().get(&path).await.json();
        collected.extend(page.assets.into_iter().map(|a| a.id));
        if !page.has_more {
            break;
        }
        cursor = page.next_cursor;
    }

    assert_eq!(collected.len(), 250);
    let mut unique = collected.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), 250);
}

#[tokio::test]
async fn test_asset_listing_respects_limit() {
    let app = setup_test_app().await;
    let gallery = app.create_gallery("Small", None).await;

    let mut ids = Vec::new();
    for i in 0..5 {
        ids.push(app.put_object(&format!("p{}.jpg", i), b"img").await);
    }
    app.client()
        .post(&api_path(&format!("/galleries/{}/assets", gallery.id)))
        .json(&attach_body(&ids))
        .await;

    let page: AssetPageResponse = app
        .client()
        .get(&api_path(&format!(
            "/galleries/{}/assets?limit=2",
            gallery.id
        )))
        .await
        .json();

    assert_eq!(page.assets.len(), 2);
    assert!(page.has_more);
    assert!(page.next_cursor.is_some());
}
