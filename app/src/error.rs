//! Top-level error for the `todo` binary.

use thiserror::Error;
use todo_core::{ApiError, ConfigError, TransportError};

/// Everything that can end a shell session early.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Telemetry(String),
}
