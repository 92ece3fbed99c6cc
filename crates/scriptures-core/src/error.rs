use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to {url} failed with status {status}: {detail}")]
    Status {
        url: String,
        status: u16,
        detail: String,
    },

    #[error("Malformed response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),
}

/// The two failure classes the UI distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Network failure or non-success status.
    Fetch,
    /// The payload did not match the expected shape.
    Decode,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Decode { .. } => ErrorKind::Decode,
            ApiError::Transport { .. } | ApiError::Status { .. } | ApiError::InvalidUrl(_) => {
                ErrorKind::Fetch
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
