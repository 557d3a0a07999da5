//! Shared application state.
//!
//! Ingestion and the relay controller share nothing in memory beyond the
//! storage directory: uploads write there, the relay reads from there. The
//! single controller instance enforces the at-most-one-active-session rule.

use loopcast_core::Config;
use loopcast_relay::{EncoderConfig, RelayController};
use loopcast_storage::LocalStorage;
use std::sync::Arc;

pub struct AppState {
    pub config: Config,
    pub storage: LocalStorage,
    pub relay: RelayController,
}

impl AppState {
    pub async fn from_config(config: Config) -> Result<Arc<Self>, anyhow::Error> {
        let storage = LocalStorage::new(
            config.storage_path.clone(),
            config.upload_chunk_size_bytes,
        )
        .await?;

        let relay = RelayController::new(EncoderConfig::from_config(&config));

        Ok(Arc::new(AppState {
            config,
            storage,
            relay,
        }))
    }
}
