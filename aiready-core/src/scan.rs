use crate::registry::SiteRegistry;
use aiready_scanner::error::Result;
use aiready_scanner::{Breakdown, PageFetcher, analyze};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Outcome of one scan as returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    pub url: String,
    pub score: f64,
    pub recommendations: Vec<String>,
    pub details: Breakdown,
    #[serde(skip)]
    pub byte_length: usize,
    #[serde(skip)]
    pub response_time_ms: u64,
}

/// Fetches a page, scores it and records the result in the registry.
#[derive(Clone)]
pub struct Scanner {
    fetcher: PageFetcher,
    registry: Arc<SiteRegistry>,
}

impl Scanner {
    pub fn new(fetcher: PageFetcher, registry: Arc<SiteRegistry>) -> Self {
        Self { fetcher, registry }
    }

    /// Scan `url`. On failure the registry is left untouched.
    pub async fn scan(&self, url: &str) -> Result<ScanReport> {
        let page = match self.fetcher.fetch(url).await {
            Ok(page) => page,
            Err(e) => {
                warn!("Scan of {} failed: {}", url, e);
                return Err(e);
            }
        };

        let analysis = analyze(&page.body, page.byte_length);

        self.registry
            .update(
                url,
                analysis.score,
                analysis.breakdown.clone(),
                analysis.recommendations.clone(),
            )
            .await;

        info!(
            "Scanned {}: score={:.1}, {} recommendation(s)",
            url,
            analysis.score,
            analysis.recommendations.len()
        );

        Ok(ScanReport {
            url: url.to_string(),
            score: analysis.score,
            recommendations: analysis.recommendations,
            details: analysis.breakdown,
            byte_length: page.byte_length,
            response_time_ms: page.response_time.as_millis() as u64,
        })
    }
}
