use crate::error::{Result, ScanError};
use crate::result::FetchedPage;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::debug;
use url::Url;

pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

const USER_AGENT: &str = concat!("aiready/", env!("CARGO_PKG_VERSION"));

/// Retrieves page bodies over HTTP with a bounded total timeout.
#[derive(Clone)]
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_FETCH_TIMEOUT_SECS)
    }

    pub fn with_timeout(timeout_secs: u64) -> Result<Self> {
        let timeout_secs = timeout_secs.max(1);
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_millis(timeout_secs * 500))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(ScanError::Client)?;

        Ok(Self { client })
    }

    /// GET `url` and return its body. Any transport failure or non-2xx status
    /// becomes [`ScanError::Fetch`].
    pub async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        let parsed = validate_url(url)?;
        debug!("Fetching {}", parsed);

        let fetch_error = |source| ScanError::Fetch {
            url: url.to_string(),
            source,
        };

        let start = Instant::now();
        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(fetch_error)?;

        let status_code = response.status().as_u16();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let bytes = response.bytes().await.map_err(fetch_error)?;
        let response_time = start.elapsed();

        debug!(
            "Fetched {} ({} bytes, status {}) in {:?}",
            url,
            bytes.len(),
            status_code,
            response_time
        );

        Ok(FetchedPage {
            url: url.to_string(),
            status_code,
            content_type,
            body: String::from_utf8_lossy(&bytes).into_owned(),
            byte_length: bytes.len(),
            response_time,
        })
    }
}

fn validate_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url).map_err(|e| ScanError::InvalidUrl(format!("{}: {}", url, e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(ScanError::InvalidUrl(format!(
            "{}: unsupported scheme '{}'",
            url, other
        ))),
    }
}
