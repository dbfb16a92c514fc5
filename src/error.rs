//! Error types for the drive_service crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while serving a command.
#[derive(Error, Debug)]
pub enum DriveError {
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Cannot read local file {path:?}: {source}")]
    LocalFileError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Missing folder URL or ID: {0:?}")]
    InvalidFolderRef(String),

    #[error("{0}")]
    UsageError(String),
}

impl DriveError {
    /// Whether the error came from bad command-line input.
    pub fn is_usage(&self) -> bool {
        matches!(self, Self::UsageError(_) | Self::InvalidFolderRef(_))
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        if self.is_usage() {
            2
        } else {
            1
        }
    }
}

/// Result type alias for DriveError.
pub type Result<T> = std::result::Result<T, DriveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_errors_exit_with_two() {
        assert_eq!(DriveError::UsageError("missing --i".into()).exit_code(), 2);
        assert_eq!(DriveError::InvalidFolderRef(" ".into()).exit_code(), 2);
    }

    #[test]
    fn test_runtime_errors_exit_with_one() {
        let err = DriveError::ApiError {
            status: 403,
            message: "forbidden".into(),
        };
        assert_eq!(err.exit_code(), 1);
        assert_eq!(DriveError::AuthenticationError("denied".into()).exit_code(), 1);
        assert_eq!(DriveError::ConfigurationError("bad".into()).exit_code(), 1);
    }
}
