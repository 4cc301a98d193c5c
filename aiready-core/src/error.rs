use thiserror::Error;

/// Failures inside a monitoring cycle. None of these stop the loop.
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("failed to fetch site list: {0}")]
    ListSites(#[source] reqwest::Error),

    #[error("scan of {url} rejected with HTTP {status}: {detail}")]
    ScanRejected {
        url: String,
        status: u16,
        detail: String,
    },

    #[error("error scanning {url}: {source}")]
    ScanTransport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP client error: {0}")]
    Client(#[source] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, MonitorError>;
