use aiready_core::{ScanReport, Scanner, SiteRecord, SiteRegistry};
use aiready_scanner::PageFetcher;
use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, info};

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<SiteRegistry>,
    pub scanner: Arc<Scanner>,
}

impl AppState {
    pub fn new(registry: Arc<SiteRegistry>, fetcher: PageFetcher) -> Self {
        let scanner = Arc::new(Scanner::new(fetcher, registry.clone()));
        Self { registry, scanner }
    }
}

#[derive(Debug, Deserialize)]
pub struct UrlRequest {
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

type ApiError = (StatusCode, Json<ErrorBody>);

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/sites", get(list_sites).post(add_site))
        .route("/scan", post(scan_site))
        .with_state(state)
}

/// Serve the API on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr().context("listener has no local address")?;
    info!("aiready API listening on http://{}", addr);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .context("server shutdown")
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

async fn add_site(
    State(state): State<AppState>,
    Json(request): Json<UrlRequest>,
) -> Result<Json<SiteRecord>, ApiError> {
    let url = require_url(&request.url)?;
    Ok(Json(state.registry.add(url).await))
}

async fn list_sites(State(state): State<AppState>) -> Json<Vec<SiteRecord>> {
    Json(state.registry.list().await)
}

async fn scan_site(
    State(state): State<AppState>,
    Json(request): Json<UrlRequest>,
) -> Result<Json<ScanReport>, ApiError> {
    let url = require_url(&request.url)?;
    debug!("Scan requested for {}", url);
    state
        .scanner
        .scan(url)
        .await
        .map(Json)
        .map_err(|e| bad_request(format!("Failed to fetch URL: {}", e)))
}

fn require_url(url: &str) -> Result<&str, ApiError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(bad_request("url must not be empty"));
    }
    Ok(url)
}

fn bad_request(detail: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            detail: detail.into(),
        }),
    )
}
