//! Test helpers: build AppState and router for integration tests.
//!
//! Everything runs in process: in-memory record store, a fixed-output frame
//! probe, and the local, inline or ephemeral storage backend.

use async_trait::async_trait;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use chrono::Duration;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tubely_api::auth::JwtIdentityProvider;
use tubely_api::setup::{routes, services};
use tubely_api::AppState;
use tubely_core::{Config, StorageBackend};
use tubely_db::InMemoryRecordStore;
use tubely_processing::{FrameProbe, ProbeError, StreamGeometry};
use tubely_storage::create_storage;
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "test-jwt-secret-at-least-32-characters-long";
pub const BASE_URL: &str = "http://localhost:8091";

/// Reports the same streams for every file.
pub struct FixedProbe(pub Vec<StreamGeometry>);

#[async_trait]
impl FrameProbe for FixedProbe {
    async fn streams(&self, _path: &Path) -> Result<Vec<StreamGeometry>, ProbeError> {
        Ok(self.0.clone())
    }
}

/// Test application: server plus the resources it borrows from.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub tokens: JwtIdentityProvider,
    pub staging_dir: TempDir,
    pub _assets_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn token_for(&self, user_id: Uuid) -> String {
        self.tokens
            .issue(user_id, Duration::hours(1))
            .expect("Failed to sign test token")
    }

    /// Create a video owned by a fresh user; returns (owner token, video id).
    pub async fn create_video(&self) -> (String, Uuid) {
        let token = self.token_for(Uuid::new_v4());
        let response = self
            .server
            .post("/api/videos")
            .add_header("Authorization", format!("Bearer {}", token))
            .json(&serde_json::json!({ "title": "boots", "description": "a pair of boots" }))
            .await;
        assert_eq!(response.status_code(), 201);

        let record: tubely_core::VideoRecord = response.json();
        (token, record.id)
    }

    pub fn staged_files(&self) -> usize {
        std::fs::read_dir(self.staging_dir.path())
            .expect("staging dir readable")
            .count()
    }
}

pub struct TestOptions {
    pub backend: StorageBackend,
    pub streams: Vec<StreamGeometry>,
    pub max_video_size_bytes: u64,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Ephemeral,
            streams: vec![StreamGeometry::new(1920, 1080)],
            max_video_size_bytes: 1 << 30,
        }
    }
}

pub fn test_config(backend: StorageBackend, assets: &Path, staging: &Path) -> Config {
    Config {
        server_port: 8091,
        public_base_url: BASE_URL.to_string(),
        environment: "test".to_string(),
        cors_origins: vec!["*".to_string()],
        jwt_secret: TEST_JWT_SECRET.to_string(),
        database_url: None,
        db_max_connections: 10,
        db_timeout_seconds: 30,
        storage_backend: backend,
        assets_root: assets.to_path_buf(),
        s3_bucket: None,
        s3_region: None,
        s3_endpoint: None,
        inline_max_bytes: 10 << 20,
        max_thumbnail_memory_bytes: 10 << 20,
        max_video_size_bytes: 1 << 30,
        ffprobe_path: "ffprobe".to_string(),
        probe_timeout_secs: 30,
        staging_dir: Some(staging.to_path_buf()),
    }
}

pub async fn setup_test_app(options: TestOptions) -> TestApp {
    let assets_dir = tempfile::tempdir().expect("Failed to create assets dir");
    let staging_dir = tempfile::tempdir().expect("Failed to create staging dir");

    let mut config = test_config(options.backend, assets_dir.path(), staging_dir.path());
    config.max_video_size_bytes = options.max_video_size_bytes;
    config.validate().expect("test config must be valid");

    let tokens = JwtIdentityProvider::new(TEST_JWT_SECRET);
    let storage = create_storage(&config)
        .await
        .expect("Failed to create storage");

    let state = services::build_state(
        config.clone(),
        Arc::new(tokens.clone()),
        Arc::new(InMemoryRecordStore::new()),
        storage,
        Arc::new(FixedProbe(options.streams)),
    );
    let router = routes::setup_routes(&config, state.clone()).expect("Failed to build routes");
    let server = TestServer::new(router).expect("Failed to start test server");

    TestApp {
        server,
        state,
        tokens,
        staging_dir,
        _assets_dir: assets_dir,
    }
}

/// Single-part multipart body.
pub fn media_form(field: &str, content_type: &str, data: Vec<u8>) -> MultipartForm {
    MultipartForm::new().add_part(
        field.to_string(),
        Part::bytes(data)
            .file_name("upload.bin")
            .mime_type(content_type),
    )
}

/// Bytes that look enough like a PNG for a test.
pub fn png_bytes() -> Vec<u8> {
    let mut data = b"\x89PNG\r\n\x1a\n".to_vec();
    data.extend((0..512u32).map(|i| (i % 256) as u8));
    data
}

/// A deterministic payload of `len` bytes.
pub fn video_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 241) as u8).collect()
}
