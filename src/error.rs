use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading configuration or reconciling locale files
#[derive(Debug, Error)]
pub enum SyncError {
    /// Storage failure while reading or writing a locale file
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Locale file does not exist
    #[error("Locale file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// Locale file content is not a JSON object of strings
    #[error("Malformed locale file '{}': {reason}", path.display())]
    MalformedData { path: PathBuf, reason: String },
    /// Invalid or unreadable run configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl SyncError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SyncError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for sync operations
pub type SyncResult<T> = Result<T, SyncError>;
