use aiready_scanner::fetcher::DEFAULT_FETCH_TIMEOUT_SECS;
use std::net::SocketAddr;
use std::time::Duration;

pub const DEFAULT_BIND: &str = "127.0.0.1:8000";
pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_SCAN_INTERVAL_SECS: u64 = 3600;
pub const DEFAULT_MONITOR_REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub fetch_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8000)),
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Base URL of the API exposing `/sites` and `/scan`.
    pub api_url: String,
    /// Pause between the end of one cycle and the start of the next.
    pub interval: Duration,
    /// Upper bound on any single list or scan request.
    pub request_timeout: Duration,
}

impl MonitorConfig {
    pub fn with_interval_secs(mut self, secs: u64) -> Self {
        self.interval = Duration::from_secs(secs);
        self
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            interval: Duration::from_secs(DEFAULT_SCAN_INTERVAL_SECS),
            request_timeout: Duration::from_secs(DEFAULT_MONITOR_REQUEST_TIMEOUT_SECS),
        }
    }
}
