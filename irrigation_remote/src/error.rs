use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("invalid service url {0:?}: must start with http:// or https://")]
    InvalidUrl(String),
    #[error("{endpoint}: request failed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint}: request timed out")]
    Timeout { endpoint: &'static str },
    #[error("{endpoint}: backend answered HTTP {status}")]
    Status { endpoint: &'static str, status: u16 },
    #[error("{endpoint}: malformed response: {message}")]
    Decode {
        endpoint: &'static str,
        message: String,
    },
    #[error("history file: {0}")]
    History(String),
}

pub type Result<T> = std::result::Result<T, RemoteError>;
