use aiready_scanner::Breakdown;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteRecord {
    #[serde(default)]
    pub url: String,
    /// Epoch seconds of the most recent completed scan, `0.0` before the first.
    #[serde(rename = "last_scan", default)]
    pub last_scan_time: f64,
    #[serde(default)]
    pub score: f64,
    #[serde(rename = "details", default)]
    pub category_breakdown: Option<Breakdown>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

impl SiteRecord {
    pub fn new(url: String) -> Self {
        Self {
            url,
            last_scan_time: 0.0,
            score: 0.0,
            category_breakdown: None,
            recommendations: Vec::new(),
        }
    }

    pub fn is_scanned(&self) -> bool {
        self.category_breakdown.is_some()
    }

    fn apply_scan(&mut self, score: f64, breakdown: Breakdown, recommendations: Vec<String>) {
        self.last_scan_time = current_timestamp();
        self.score = score;
        self.category_breakdown = Some(breakdown);
        self.recommendations = recommendations;
    }
}

fn current_timestamp() -> f64 {
    Utc::now().timestamp_millis() as f64 / 1000.0
}

#[derive(Debug, Default)]
pub struct SiteRegistry {
    sites: Mutex<HashMap<String, SiteRecord>>,
}

impl SiteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `url`, returning the existing record untouched if it is already known.
    pub async fn add(&self, url: &str) -> SiteRecord {
        let mut sites = self.sites.lock().await;
        sites
            .entry(url.to_string())
            .or_insert_with(|| {
                debug!("Registering {}", url);
                SiteRecord::new(url.to_string())
            })
            .clone()
    }

    /// Overwrite the scan result for `url`, creating the record if needed.
    pub async fn update(
        &self,
        url: &str,
        score: f64,
        breakdown: Breakdown,
        recommendations: Vec<String>,
    ) {
        let mut sites = self.sites.lock().await;
        sites
            .entry(url.to_string())
            .or_insert_with(|| SiteRecord::new(url.to_string()))
            .apply_scan(score, breakdown, recommendations);
        debug!("Stored scan for {} (score {:.1})", url, score);
    }

    /// Snapshot of every record, ordered by URL.
    pub async fn list(&self) -> Vec<SiteRecord> {
        let mut records: Vec<SiteRecord> = {
            let sites = self.sites.lock().await;
            sites.values().cloned().collect()
        };
        records.sort_by(|a, b| a.url.cmp(&b.url));
        records
    }

    pub async fn get(&self, url: &str) -> Option<SiteRecord> {
        self.sites.lock().await.get(url).cloned()
    }

    pub async fn len(&self) -> usize {
        self.sites.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sites.lock().await.is_empty()
    }
}
