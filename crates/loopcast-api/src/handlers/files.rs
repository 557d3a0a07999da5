//! Stored file listing.

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{extract::State, Json};
use loopcast_core::models::FileListResponse;
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/files",
    tag = "files",
    responses(
        (status = 200, description = "Sorted filenames in the storage directory", body = FileListResponse),
        (status = 500, description = "Storage directory unreadable", body = ErrorResponse)
    )
)]
pub async fn list_files(
    State(state): State<Arc<AppState>>,
) -> Result<Json<FileListResponse>, HttpAppError> {
    let files = state.storage.list_files().await?;
    Ok(Json(FileListResponse { files }))
}
