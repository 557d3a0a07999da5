//! Application setup and initialization
//!
//! Initialization logic extracted from main.rs for better organization and
//! testability.

pub mod routes;
pub mod server;

use crate::state::AppState;
use anyhow::Result;
use loopcast_core::Config;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    let state = AppState::from_config(config.clone()).await?;

    tracing::info!(
        storage_path = %config.storage_path,
        chunk_size_bytes = config.upload_chunk_size_bytes,
        ffmpeg_path = %config.ffmpeg_path,
        "Application state initialized"
    );

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
