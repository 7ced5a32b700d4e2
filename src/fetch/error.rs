//! Fetch layer error types

use thiserror::Error;

/// Failure of a single fetch attempt, or of the whole retry budget
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, TLS or timeout failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Non-2xx response
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// Body could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// URL has no host to govern
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Cache record could not be written
    #[error("Cache write failed: {0}")]
    CacheWrite(String),

    /// Every attempt failed
    #[error("Fetch failed after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        #[source]
        last: Box<FetchError>,
    },
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Transport(err.to_string())
    }
}

/// Result type alias for fetch operations
pub type FetchResult<T> = std::result::Result<T, FetchError>;
