//! Relay control integration tests.
//!
//! Run with: `cargo test -p loopcast-api --test stream_test`
//! The relay binary is replaced with a small shell script where a live
//! process is needed, so no ffmpeg install is required.

mod helpers;

use helpers::{setup_test_app, setup_test_app_with_relay};
use loopcast_core::models::StopStreamResponse;
use loopcast_relay::{RelayState, RelayStatus};
use serde_json::json;

#[tokio::test]
async fn test_status_initially_idle() {
    let app = setup_test_app().await;

    let response = app.client().get("/stream/status").await;
    assert_eq!(response.status_code(), 200);
    let status = response.json::<RelayStatus>();
    assert_eq!(status.state, RelayState::Idle);
    assert!(status.source.is_none());
}

#[tokio::test]
async fn test_stop_without_session_is_noop() {
    let app = setup_test_app().await;

    let response = app.client().post("/stream/stop").await;
    assert_eq!(response.status_code(), 200);
    let body = response.json::<StopStreamResponse>();
    assert!(!body.stopped);
}

#[tokio::test]
async fn test_start_unknown_file_is_404() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/stream/start")
        .json(&json!({"filename": "missing.mp4", "stream_key": "key"}))
        .await;

    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_start_empty_stream_key_is_400() {
    let app = setup_test_app().await;
    app.seed_file("loop.mp4", b"data");

    let response = app
        .client()
        .post("/stream/start")
        .json(&json!({"filename": "loop.mp4", "stream_key": "  "}))
        .await;

    assert_eq!(response.status_code(), 400);
}

#[cfg(unix)]
mod with_fake_relay {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_start_status_stop_roundtrip() {
        let script_dir = TempDir::new().unwrap();
        let relay_bin =
            helpers::fake_relay_script(script_dir.path(), "while true; do sleep 1; done");
        let app = setup_test_app_with_relay(&relay_bin).await;
        app.seed_file("loop.mp4", b"data");

        let response = app
            .client()
            .post("/stream/start")
            .json(&json!({"filename": "loop.mp4", "stream_key": "key", "vertical": true}))
            .await;
        assert_eq!(response.status_code(), 200);
        let status = response.json::<RelayStatus>();
        assert_eq!(status.state, RelayState::Running);
        assert_eq!(status.source.as_deref(), Some("loop.mp4"));

        // Second start is refused as a conflict while the session lives.
        let response = app
            .client()
            .post("/stream/start")
            .json(&json!({"filename": "loop.mp4", "stream_key": "key"}))
            .await;
        assert_eq!(response.status_code(), 409);

        let response = app.client().post("/stream/stop").await;
        assert_eq!(response.status_code(), 200);
        assert!(response.json::<StopStreamResponse>().stopped);

        let status = app.client().get("/stream/status").await.json::<RelayStatus>();
        assert_eq!(status.state, RelayState::Stopped);

        // Stop is a no-op again until a new start.
        let response = app.client().post("/stream/stop").await;
        assert!(!response.json::<StopStreamResponse>().stopped);
    }

    #[tokio::test]
    async fn test_self_exiting_process_reported_stopped() {
        let script_dir = TempDir::new().unwrap();
        let relay_bin = helpers::fake_relay_script(script_dir.path(), "echo boom; exit 1");
        let app = setup_test_app_with_relay(&relay_bin).await;
        app.seed_file("loop.mp4", b"data");

        let response = app
            .client()
            .post("/stream/start")
            .json(&json!({"filename": "loop.mp4", "stream_key": "key"}))
            .await;
        assert_eq!(response.status_code(), 200);

        let mut status = app.client().get("/stream/status").await.json::<RelayStatus>();
        for _ in 0..100 {
            if status.state == RelayState::Stopped {
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
            status = app.client().get("/stream/status").await.json::<RelayStatus>();
        }

        assert_eq!(status.state, RelayState::Stopped);
        assert!(status.log.iter().any(|l| l.contains("boom")));
    }

    #[tokio::test]
    async fn test_status_log_tail_parameter() {
        let script_dir = TempDir::new().unwrap();
        let relay_bin = helpers::fake_relay_script(
            script_dir.path(),
            "for i in 1 2 3 4 5; do echo line-$i; done; sleep 30",
        );
        let app = setup_test_app_with_relay(&relay_bin).await;
        app.seed_file("loop.mp4", b"data");

        let response = app
            .client()
            .post("/stream/start")
            .json(&json!({"filename": "loop.mp4", "stream_key": "key"}))
            .await;
        assert_eq!(response.status_code(), 200);

        // Wait for the drain task to capture the script's output.
        let mut seen = false;
        for _ in 0..100 {
            let status = app.client().get("/stream/status").await.json::<RelayStatus>();
            if status.log.iter().any(|l| l.contains("line-5")) {
                seen = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        assert!(seen, "relay output never appeared in the status log");

        let status = app
            .client()
            .get("/stream/status")
            .add_query_param("lines", 2)
            .await
            .json::<RelayStatus>();
        assert_eq!(status.log.len(), 2);

        app.client().post("/stream/stop").await;
    }
}
