mod command;
mod controller;
mod logbuf;

pub use command::{build_args, stream_url, EncoderConfig, VERTICAL_SCALE};
pub use controller::{RelayController, RelayState, RelayStatus, StopOutcome};
pub use logbuf::LogBuffer;

use loopcast_core::AppError;

pub type RelayResult<T> = Result<T, RelayError>;

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("A relay session is already running")]
    AlreadyRunning,

    #[error("Source file not found: {0}")]
    SourceNotFound(String),

    #[error("Stream key must not be empty")]
    EmptyStreamKey,

    #[error("Failed to launch relay process: {0}")]
    SpawnFailed(String),
}

impl From<RelayError> for AppError {
    fn from(err: RelayError) -> Self {
        match err {
            RelayError::AlreadyRunning => AppError::Conflict(err.to_string()),
            RelayError::SourceNotFound(name) => {
                AppError::NotFound(format!("Source file not found: {}", name))
            }
            RelayError::EmptyStreamKey => AppError::InvalidInput(err.to_string()),
            RelayError::SpawnFailed(msg) => AppError::Relay(msg),
        }
    }
}
