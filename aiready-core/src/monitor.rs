use crate::config::MonitorConfig;
use crate::error::{MonitorError, Result};
use crate::registry::SiteRecord;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

#[derive(Debug, Serialize)]
struct ScanRequest<'a> {
    url: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: String,
}

/// What the monitor keeps from a successful `/scan` reply. Anything else in
/// the body is ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ScanAck {
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

/// HTTP client for the `/sites` and `/scan` endpoints.
#[derive(Clone)]
pub struct MonitorClient {
    client: Client,
    base_url: String,
}

impl MonitorClient {
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("aiready-monitor/", env!("CARGO_PKG_VERSION")))
            .timeout(request_timeout)
            .build()
            .map_err(MonitorError::Client)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full registry snapshot as served by `GET /sites`.
    pub async fn list_records(&self) -> Result<Vec<SiteRecord>> {
        self.client
            .get(format!("{}/sites", self.base_url))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(MonitorError::ListSites)?
            .json()
            .await
            .map_err(MonitorError::ListSites)
    }

    /// URLs of every registered site, skipping entries without one.
    pub async fn list_sites(&self) -> Result<Vec<String>> {
        Ok(self
            .list_records()
            .await?
            .into_iter()
            .map(|s| s.url)
            .filter(|url| !url.trim().is_empty())
            .collect())
    }

    /// `POST /scan`. Any 2xx counts as a completed scan, whatever its body.
    pub async fn trigger_scan(&self, url: &str) -> Result<ScanAck> {
        let transport = |source| MonitorError::ScanTransport {
            url: url.to_string(),
            source,
        };

        let response = self
            .client
            .post(format!("{}/scan", self.base_url))
            .json(&ScanRequest { url })
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorBody>(&body)
                .map(|e| e.detail)
                .unwrap_or(body);
            return Err(MonitorError::ScanRejected {
                url: url.to_string(),
                status: status.as_u16(),
                detail,
            });
        }

        let body = response.text().await.map_err(transport)?;
        Ok(serde_json::from_str(&body).unwrap_or_else(|e| {
            debug!("Unparsed scan reply for {}: {}", url, e);
            ScanAck::default()
        }))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleSummary {
    pub listed: usize,
    pub scanned: usize,
    pub failed: usize,
}

pub struct Monitor {
    client: MonitorClient,
    interval: Duration,
}

impl Monitor {
    pub fn new(client: MonitorClient, interval: Duration) -> Self {
        Self { client, interval }
    }

    pub fn from_config(config: &MonitorConfig) -> Result<Self> {
        let client = MonitorClient::new(&config.api_url, config.request_timeout)?;
        Ok(Self::new(client, config.interval))
    }

    /// One pass over the registry. Never fails; problems are logged and counted.
    pub async fn run_cycle(&self) -> CycleSummary {
        let sites = match self.client.list_sites().await {
            Ok(sites) => sites,
            Err(e) => {
                warn!("{}", e);
                Vec::new()
            }
        };

        let mut summary = CycleSummary {
            listed: sites.len(),
            ..Default::default()
        };

        for url in &sites {
            match self.client.trigger_scan(url).await {
                Ok(ack) => {
                    summary.scanned += 1;
                    info!(
                        "Scanned {}: score={:.1}, recommendations={:?}",
                        url, ack.score, ack.recommendations
                    );
                }
                Err(e) => {
                    summary.failed += 1;
                    warn!("{}", e);
                }
            }
        }

        summary
    }

    /// Run cycles until `shutdown` becomes `true`, sleeping `interval` after each.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            "Monitoring {} every {:?}",
            self.client.base_url(),
            self.interval
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            let summary = self.run_cycle().await;
            info!(
                "Cycle complete: {} listed, {} scanned, {} failed",
                summary.listed, summary.scanned, summary.failed
            );

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = stop_requested(&mut shutdown) => break,
            }
        }

        debug!("Monitor stopped");
    }
}

/// Resolves once the flag reads `true`. A dropped sender can never flip it,
/// so in that case this never resolves.
async fn stop_requested(shutdown: &mut watch::Receiver<bool>) {
    while !*shutdown.borrow_and_update() {
        if shutdown.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
