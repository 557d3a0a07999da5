//! Streaming multipart upload handler.
//!
//! The file part is drained chunk-by-chunk into the storage writer, so the
//! request body never accumulates in memory and multi-gigabyte uploads are
//! bounded by one write block. A broken transfer (I/O failure or the client
//! disconnecting mid-body) aborts the writer, which removes the partial file.

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Multipart, State},
    Json,
};
use loopcast_core::models::UploadResponse;
use loopcast_core::AppError;
use std::sync::Arc;
use std::time::Instant;

#[utoipa::path(
    post,
    path = "/upload",
    tag = "files",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "File stored", body = UploadResponse),
        (status = 400, description = "Missing file field or filename", body = ErrorResponse),
        (status = 500, description = "I/O failure while writing", body = ErrorResponse)
    )
)]
pub async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, HttpAppError> {
    let request_id = uuid::Uuid::new_v4();
    let start = Instant::now();

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read multipart: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .map(|s| s.to_string())
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| AppError::InvalidInput("Missing filename".to_string()))?;

        let mut writer = state.storage.begin_upload(&filename).await?;

        loop {
            match field.chunk().await {
                Ok(Some(chunk)) => {
                    if let Err(e) = writer.write_chunk(&chunk).await {
                        writer.abort().await;
                        return Err(e.into());
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    // Covers client disconnects mid-body; same cleanup path
                    // as a write failure.
                    writer.abort().await;
                    return Err(AppError::InvalidInput(format!(
                        "Upload stream interrupted: {}",
                        e
                    ))
                    .into());
                }
            }
        }

        let stored = writer.finish().await?;

        tracing::info!(
            request_id = %request_id,
            filename = %stored.filename,
            size_bytes = stored.size_bytes,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Upload complete"
        );

        return Ok(Json(UploadResponse {
            filename: stored.filename,
            size_bytes: stored.size_bytes,
        }));
    }

    Err(AppError::InvalidInput("No file provided".to_string()).into())
}
