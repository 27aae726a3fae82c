use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API quota exceeded (status {status}): retry after {retry_after_secs:?} seconds")]
    QuotaExceeded {
        status: u16,
        retry_after_secs: Option<u64>,
    },

    #[error("Unexpected response (status {status}): {body}")]
    Protocol { status: u16, body: String },

    #[error("Invalid API URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}
