use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SyncError>;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("manifest parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl SyncError {
    /// Classify a reqwest failure into the timeout/network split the
    /// scheduler logs on. The original request timeout is reported because
    /// reqwest's own error loses it.
    pub fn from_request(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            SyncError::Timeout(timeout)
        } else {
            SyncError::Network(err.to_string())
        }
    }
}
