use reqwest::{Method, StatusCode};
use url::Url;

/// Errors raised by a cache storage backend
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to (de)serialize cache entry: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Only GET requests can be cached, got {0}")]
    UnsupportedMethod(Method),

    #[error("Invalid cache entry: {0}")]
    InvalidEntry(String),
}

/// Errors raised while talking to the network
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Network unreachable: {0}")]
    Unreachable(String),

    #[error("Request aborted: {0}")]
    Aborted(String),
}

impl NetworkError {
    /// Classify a reqwest failure: timeouts abort, connection failures are
    /// unreachable, everything else stays an HTTP error.
    pub fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            NetworkError::Aborted(error.to_string())
        } else if error.is_connect() {
            NetworkError::Unreachable(error.to_string())
        } else {
            NetworkError::Http(error)
        }
    }
}

// Custom error type for interceptor operations
#[derive(Debug, thiserror::Error)]
pub enum InterceptError {
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Asset {url} was rejected with status code {status}")]
    AssetRejected { url: Url, status: StatusCode },

    #[error("Offline shell {0} is not cached")]
    OfflineShellMissing(Url),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl InterceptError {
    /// Whether the failure originated on the network rather than in storage
    pub fn is_network(&self) -> bool {
        matches!(self, InterceptError::Network(_))
    }
}
