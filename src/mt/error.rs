use std::time::Duration;
use thiserror::Error;

/// Error types for the Machine Translation module
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MtError {
    /// The provider rejected or failed the translation request
    #[error("Translation error: {0}")]
    TranslationError(String),
    /// Transport-level failure talking to the provider
    #[error("Network error: {0}")]
    NetworkError(String),
    /// Provider is misconfigured (missing key, client error responses)
    #[error("Configuration error: {0}")]
    ConfigError(String),
    /// Locale code cannot be sent to the provider
    #[error("Invalid locale: {0}")]
    InvalidLocale(String),
    /// The call did not finish within the configured timeout
    #[error("Translation timed out after {0:?}")]
    Timeout(Duration),
}

impl From<reqwest::Error> for MtError {
    fn from(err: reqwest::Error) -> Self {
        let err = err.without_url();
        if err.is_timeout() {
            MtError::NetworkError(format!("Request timed out: {}", err))
        } else {
            MtError::NetworkError(err.to_string())
        }
    }
}

/// Result type for MT operations
pub type MtResult<T> = Result<T, MtError>;
