use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("request to {url} failed: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP client error: {0}")]
    Client(#[source] reqwest::Error),
}

impl ScanError {
    /// True when the page itself could not be retrieved.
    pub fn is_fetch(&self) -> bool {
        matches!(self, ScanError::Fetch { .. })
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
