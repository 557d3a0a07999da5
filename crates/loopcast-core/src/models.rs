//! Shared response models for the HTTP surface.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Response for a completed upload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    /// Final stored filename (possibly disambiguated with a counter)
    pub filename: String,
    /// Total bytes written to disk
    pub size_bytes: u64,
}

/// Response for the liveness check.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PingResponse {
    pub ok: bool,
}

/// Sorted listing of stored files.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FileListResponse {
    pub files: Vec<String>,
}

/// Request to start relaying a stored file to the configured ingest endpoint.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StartStreamRequest {
    /// Filename within the storage directory
    pub filename: String,
    /// Opaque stream key appended to the ingest URL
    pub stream_key: String,
    /// Apply the fixed 720x1280 vertical transform
    #[serde(default)]
    pub vertical: bool,
}

/// Outcome of a stop request. Stopping with nothing running is a no-op.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StopStreamResponse {
    pub stopped: bool,
    pub message: String,
}
