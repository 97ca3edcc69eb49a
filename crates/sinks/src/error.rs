//! Sink error types

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for sink operations
pub type Result<T> = std::result::Result<T, RotateError>;

/// Errors returned by the rotating file sink
///
/// Nothing here is retried internally. The writer is always left in a state
/// where the next call can make progress: a failed rotation leaves no file
/// open, and the next `write` opens one again.
#[derive(Debug, Error)]
pub enum RotateError {
    /// Creating the parent directory of a log file failed
    #[error("failed to create log directory '{path}': {source}")]
    CreateDir {
        /// Directory that could not be created
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },

    /// Opening a log file failed
    #[error("failed to open log file '{path}': {source}")]
    Open {
        /// File that could not be opened
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },

    /// Renaming the active file to a numbered backup failed
    #[error("failed to archive '{from}' as '{to}': {source}")]
    Archive {
        /// Active file path
        from: PathBuf,
        /// Backup path
        to: PathBuf,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },

    /// Appending to the active file failed
    #[error("failed to write log file: {0}")]
    Write(#[source] io::Error),

    /// Syncing the active file to disk failed
    #[error("failed to sync log file: {0}")]
    Sync(#[source] io::Error),

    /// The writer has been closed
    #[error("rotating writer is closed")]
    Closed,

    /// A rotation left the writer without an open file
    #[error("no log file is open")]
    NotOpen,
}

impl RotateError {
    /// Kind of the underlying IO error, if any
    pub fn io_kind(&self) -> io::ErrorKind {
        match self {
            Self::CreateDir { source, .. }
            | Self::Open { source, .. }
            | Self::Archive { source, .. }
            | Self::Write(source)
            | Self::Sync(source) => source.kind(),
            Self::Closed | Self::NotOpen => io::ErrorKind::Other,
        }
    }
}

impl From<RotateError> for io::Error {
    fn from(err: RotateError) -> Self {
        match err {
            RotateError::Write(source) | RotateError::Sync(source) => source,
            other => io::Error::new(other.io_kind(), other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_error_message() {
        let err = RotateError::Open {
            path: PathBuf::from("/var/log/app.log"),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };
        assert!(err.to_string().contains("/var/log/app.log"));
        assert!(err.to_string().contains("failed to open"));
        assert_eq!(err.io_kind(), io::ErrorKind::PermissionDenied);
    }

    #[test]
    fn test_create_dir_error_message() {
        let err = RotateError::CreateDir {
            path: PathBuf::from("/readonly/logs"),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };
        assert!(err.to_string().contains("/readonly/logs"));
        assert!(err.to_string().contains("directory"));
    }

    #[test]
    fn test_into_io_error_keeps_kind() {
        let err = RotateError::Open {
            path: PathBuf::from("missing/app.log"),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        let io_err: io::Error = err.into();
        assert_eq!(io_err.kind(), io::ErrorKind::NotFound);
        assert!(io_err.to_string().contains("missing/app.log"));
    }

    #[test]
    fn test_write_error_unwraps_to_source() {
        let err = RotateError::Write(io::Error::from(io::ErrorKind::StorageFull));
        let io_err: io::Error = err.into();
        assert_eq!(io_err.kind(), io::ErrorKind::StorageFull);
    }

    #[test]
    fn test_closed_error() {
        let err = RotateError::Closed;
        assert!(err.to_string().contains("closed"));
        assert_eq!(err.io_kind(), io::ErrorKind::Other);
    }
}
