//! Logger error types

use logroll_sinks::RotateError;
use thiserror::Error;

/// Result type for logger operations
pub type Result<T> = std::result::Result<T, LoggerError>;

/// Errors that can occur when building or installing a logger
#[derive(Debug, Error)]
pub enum LoggerError {
    /// Output needs a rotating file but no `[file]` section was given
    #[error("logger '{name}' writes to a file but has no file configuration")]
    MissingFile {
        /// Logger name
        name: String,
    },

    /// The rotating sink could not be opened or closed
    #[error("logger sink error: {0}")]
    Sink(#[from] RotateError),

    /// A global dispatcher was already installed
    #[error("failed to install global logger: {0}")]
    SetGlobal(#[from] tracing::dispatcher::SetGlobalDefaultError),
}
