//! Upload API integration tests.
//!
//! Run with: `cargo test -p tubely-api --test uploads_test`

mod helpers;

use helpers::{media_form, png_bytes, setup_test_app, video_bytes, TestOptions, BASE_URL};
use tubely_core::{StorageBackend, VideoRecord};
use tubely_db::RecordStore;
use tubely_processing::StreamGeometry;
use uuid::Uuid;

#[tokio::test]
async fn test_health() {
    let app = setup_test_app(TestOptions::default()).await;

    let response = app.client().get("/health").await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "alive");
    assert_eq!(body["environment"], "test");
    assert_eq!(body["storage"], "ephemeral");
}

#[tokio::test]
async fn test_thumbnail_upload_served_from_registry() {
    let app = setup_test_app(TestOptions::default()).await;
    let (token, video_id) = app.create_video().await;
    let image = png_bytes();

    let response = app
        .client()
        .post(&format!("/api/thumbnail_upload/{}", video_id))
        .add_header("Authorization", format!("Bearer {}", token))
        .multipart(media_form("thumbnail", "image/png", image.clone()))
        .await;

    assert_eq!(response.status_code(), 200);
    let record: VideoRecord = response.json();
    assert_eq!(
        record.thumbnail_url.as_deref(),
        Some(format!("{}/api/thumbnails/{}", BASE_URL, video_id).as_str())
    );
    assert_eq!(record.video_url, None);

    let served = app
        .client()
        .get(&format!("/api/thumbnails/{}", video_id))
        .await;
    assert_eq!(served.status_code(), 200);
    assert_eq!(served.header("content-type"), "image/png");
    assert_eq!(served.as_bytes().as_ref(), image.as_slice());
}

#[tokio::test]
async fn test_video_upload_to_local_assets() {
    let app = setup_test_app(TestOptions {
        backend: StorageBackend::Local,
        ..TestOptions::default()
    })
    .await;
    let (token, video_id) = app.create_video().await;
    let video = video_bytes(256 * 1024);

    let response = app
        .client()
        .post(&format!("/api/video_upload/{}", video_id))
        .add_header("Authorization", format!("Bearer {}", token))
        .multipart(media_form("video", "video/mp4", video.clone()))
        .await;

    assert_eq!(response.status_code(), 200);
    let record: VideoRecord = response.json();
    let url = record.video_url.expect("video url recorded");
    let asset_path = url
        .strip_prefix(BASE_URL)
        .expect("url points at this server")
        .to_string();
    assert!(asset_path.starts_with("/assets/landscape/"));
    assert!(asset_path.ends_with(".mp4"));
    assert_eq!(app.staged_files(), 0);

    let served = app.client().get(&asset_path).await;
    assert_eq!(served.status_code(), 200);
    assert_eq!(served.as_bytes().as_ref(), video.as_slice());
}

#[tokio::test]
async fn test_portrait_video_namespace() {
    let app = setup_test_app(TestOptions {
        backend: StorageBackend::Local,
        streams: vec![StreamGeometry::new(1080, 1920)],
        ..TestOptions::default()
    })
    .await;
    let (token, video_id) = app.create_video().await;

    let response = app
        .client()
        .post(&format!("/api/video_upload/{}", video_id))
        .add_header("Authorization", format!("Bearer {}", token))
        .multipart(media_form("video", "video/mp4", video_bytes(4096)))
        .await;

    assert_eq!(response.status_code(), 200);
    let record: VideoRecord = response.json();
    assert!(record
        .video_url
        .unwrap()
        .starts_with(&format!("{}/assets/portrait/", BASE_URL)));
}

#[tokio::test]
async fn test_inline_thumbnail_is_data_url() {
    let app = setup_test_app(TestOptions {
        backend: StorageBackend::Inline,
        ..TestOptions::default()
    })
    .await;
    let (token, video_id) = app.create_video().await;

    let response = app
        .client()
        .post(&format!("/api/thumbnail_upload/{}", video_id))
        .add_header("Authorization", format!("Bearer {}", token))
        .multipart(media_form("thumbnail", "image/jpeg", vec![0xFF, 0xD8, 0xFF, 0xE0]))
        .await;

    assert_eq!(response.status_code(), 200);
    let record: VideoRecord = response.json();
    assert_eq!(
        record.thumbnail_url.as_deref(),
        Some("data:image/jpeg;base64,/9j/4A==")
    );
}

#[tokio::test]
async fn test_upload_by_non_owner_is_unauthorized() {
    let app = setup_test_app(TestOptions::default()).await;
    let (_owner_token, video_id) = app.create_video().await;
    let intruder = app.token_for(Uuid::new_v4());

    let response = app
        .client()
        .post(&format!("/api/thumbnail_upload/{}", video_id))
        .add_header("Authorization", format!("Bearer {}", intruder))
        .multipart(media_form("thumbnail", "image/png", png_bytes()))
        .await;

    assert_eq!(response.status_code(), 401);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "UNAUTHORIZED");

    let record = app.state.records.get(video_id).await.unwrap();
    assert_eq!(record.thumbnail_url, None);
    assert!(app
        .state
        .registry
        .as_ref()
        .unwrap()
        .is_empty()
        .await);
}

#[tokio::test]
async fn test_upload_without_token_is_unauthorized() {
    let app = setup_test_app(TestOptions::default()).await;
    let (_token, video_id) = app.create_video().await;

    let response = app
        .client()
        .post(&format!("/api/video_upload/{}", video_id))
        .multipart(media_form("video", "video/mp4", video_bytes(1024)))
        .await;

    assert_eq!(response.status_code(), 401);
}

#[tokio::test]
async fn test_invalid_video_id() {
    let app = setup_test_app(TestOptions::default()).await;
    let token = app.token_for(Uuid::new_v4());

    let response = app
        .client()
        .post("/api/thumbnail_upload/not-a-uuid")
        .add_header("Authorization", format!("Bearer {}", token))
        .multipart(media_form("thumbnail", "image/png", png_bytes()))
        .await;

    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_unknown_video() {
    let app = setup_test_app(TestOptions::default()).await;
    let token = app.token_for(Uuid::new_v4());

    let response = app
        .client()
        .post(&format!("/api/thumbnail_upload/{}", Uuid::new_v4()))
        .add_header("Authorization", format!("Bearer {}", token))
        .multipart(media_form("thumbnail", "image/png", png_bytes()))
        .await;

    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_unsupported_media_types() {
    let app = setup_test_app(TestOptions::default()).await;
    let (token, video_id) = app.create_video().await;

    let cases = [
        ("thumbnail_upload", "thumbnail", "image/gif"),
        ("video_upload", "video", "video/webm"),
    ];
    for (route, field, content_type) in cases {
        let response = app
            .client()
            .post(&format!("/api/{}/{}", route, video_id))
            .add_header("Authorization", format!("Bearer {}", token))
            .multipart(media_form(field, content_type, video_bytes(64)))
            .await;

        assert_eq!(response.status_code(), 400, "{}", content_type);
        let body: serde_json::Value = response.json();
        assert_eq!(body["code"], "UNSUPPORTED_MEDIA_TYPE");
    }

    assert_eq!(app.staged_files(), 0);
}

#[tokio::test]
async fn test_oversized_video() {
    let app = setup_test_app(TestOptions {
        max_video_size_bytes: 1024,
        ..TestOptions::default()
    })
    .await;
    let (token, video_id) = app.create_video().await;

    let response = app
        .client()
        .post(&format!("/api/video_upload/{}", video_id))
        .add_header("Authorization", format!("Bearer {}", token))
        .multipart(media_form("video", "video/mp4", video_bytes(4096)))
        .await;

    assert_eq!(response.status_code(), 413);
    assert_eq!(app.staged_files(), 0);

    let record = app.state.records.get(video_id).await.unwrap();
    assert_eq!(record.video_url, None);
}

#[tokio::test]
async fn test_missing_multipart_field() {
    let app = setup_test_app(TestOptions::default()).await;
    let (token, video_id) = app.create_video().await;

    let response = app
        .client()
        .post(&format!("/api/thumbnail_upload/{}", video_id))
        .add_header("Authorization", format!("Bearer {}", token))
        .multipart(media_form("file", "image/png", png_bytes()))
        .await;

    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_no_video_streams_fails_closed() {
    let app = setup_test_app(TestOptions {
        streams: Vec::new(),
        ..TestOptions::default()
    })
    .await;
    let (token, video_id) = app.create_video().await;

    let response = app
        .client()
        .post(&format!("/api/video_upload/{}", video_id))
        .add_header("Authorization", format!("Bearer {}", token))
        .multipart(media_form("video", "video/mp4", video_bytes(2048)))
        .await;

    assert_eq!(response.status_code(), 500);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "MEDIA_PROBE_ERROR");
    assert!(body.get("details").is_none());
    assert_eq!(app.staged_files(), 0);
}

#[tokio::test]
async fn test_registry_miss_is_not_found() {
    let app = setup_test_app(TestOptions::default()).await;

    let response = app
        .client()
        .get(&format!("/api/thumbnails/{}", Uuid::new_v4()))
        .await;

    assert_eq!(response.status_code(), 404);
}
