use std::time::Duration;

/// A page body as retrieved from the network.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: String,
    pub status_code: u16,
    pub content_type: Option<String>,
    pub body: String,
    pub byte_length: usize,
    pub response_time: Duration,
}
