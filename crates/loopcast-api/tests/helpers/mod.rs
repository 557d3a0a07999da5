//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p loopcast-api`.
#![allow(dead_code)]

use axum_test::TestServer;
use loopcast_api::setup::routes::setup_routes;
use loopcast_api::state::AppState;
use loopcast_core::Config;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Test application: server plus owned resources.
pub struct TestApp {
    pub server: TestServer,
    storage_dir: PathBuf,
    _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Flat storage directory backing this app instance.
    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    /// Drop a file into storage directly, bypassing the upload endpoint.
    pub fn seed_file(&self, name: &str, data: &[u8]) {
        std::fs::write(self.storage_dir.join(name), data).unwrap();
    }
}

/// Setup a test app whose relay would shell out to the real `ffmpeg`.
/// Fine for tests that never reach a successful spawn.
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with_relay("ffmpeg").await
}

/// Setup a test app with a custom relay binary (e.g. a fake shell script).
pub async fn setup_test_app_with_relay(ffmpeg_path: &str) -> TestApp {
    let temp_dir = TempDir::new().unwrap();
    let storage_dir = temp_dir.path().join("uploads");

    let config = Config {
        server_port: 0,
        cors_origins: Vec::new(),
        storage_path: storage_dir.to_string_lossy().to_string(),
        // Small blocks so tests exercise chunk boundaries with little data.
        upload_chunk_size_bytes: 8 * 1024,
        ffmpeg_path: ffmpeg_path.to_string(),
        rtmp_ingest_url: "rtmp://localhost/live".to_string(),
        video_bitrate_kbps: 2500,
        audio_bitrate_kbps: 128,
        keyframe_interval: 60,
        ffmpeg_preset: "veryfast".to_string(),
        relay_log_capacity: 100,
    };

    let state: Arc<AppState> = AppState::from_config(config.clone()).await.unwrap();
    let router = setup_routes(&config, state).unwrap();

    TestApp {
        server: TestServer::new(router).unwrap(),
        storage_dir,
        _temp_dir: temp_dir,
    }
}

/// Write an executable fake relay script and return its path.
#[cfg(unix)]
pub fn fake_relay_script(dir: &Path, body: &str) -> String {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake-relay.sh");
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path.to_string_lossy().to_string()
}
