use crate::server::{AppState, serve};
use aiready_core::config::{
    DEFAULT_API_URL, DEFAULT_MONITOR_REQUEST_TIMEOUT_SECS, DEFAULT_SCAN_INTERVAL_SECS,
};
use aiready_core::{
    Monitor, MonitorClient, MonitorConfig, ScanReport, Scanner, ServerConfig, SiteRecord,
    SiteRegistry,
};
use aiready_scanner::PageFetcher;
use aiready_scanner::fetcher::DEFAULT_FETCH_TIMEOUT_SECS;
use anyhow::{Context, Result, bail};
use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{info, warn};
use url::Url;

/// Parse a single line as a URL, trying to add http:// if needed
pub fn parse_url_line(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    // Try to parse as-is
    if let Ok(url) = Url::parse(line)
        && matches!(url.scheme(), "http" | "https")
    {
        return Some(line.to_string());
    }

    // Try adding http://
    let with_scheme = format!("http://{}", line);
    if Url::parse(&with_scheme).is_ok_and(|u| u.host_str().is_some()) {
        return Some(with_scheme);
    }

    None
}

pub fn server_config(args: &ArgMatches) -> ServerConfig {
    let defaults = ServerConfig::default();
    ServerConfig {
        bind: args
            .get_one::<SocketAddr>("bind")
            .copied()
            .unwrap_or(defaults.bind),
        fetch_timeout_secs: fetch_timeout(args),
    }
}

pub fn monitor_config(args: &ArgMatches) -> MonitorConfig {
    let request_timeout = args
        .get_one::<u64>("request-timeout")
        .copied()
        .unwrap_or(DEFAULT_MONITOR_REQUEST_TIMEOUT_SECS);

    MonitorConfig {
        api_url: api_url(args),
        request_timeout: Duration::from_secs(request_timeout),
        ..MonitorConfig::default()
    }
    .with_interval_secs(interval_secs(args))
}

fn api_url(args: &ArgMatches) -> String {
    args.get_one::<String>("api")
        .cloned()
        .unwrap_or_else(|| DEFAULT_API_URL.to_string())
}

fn fetch_timeout(args: &ArgMatches) -> u64 {
    args.get_one::<u64>("fetch-timeout")
        .copied()
        .unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS)
}

fn interval_secs(args: &ArgMatches) -> u64 {
    args.get_one::<u64>("interval")
        .copied()
        .unwrap_or(DEFAULT_SCAN_INTERVAL_SECS)
}

/// Base URL for reaching a server bound to `addr` from the same host.
/// Wildcard binds are dialed on loopback.
pub fn local_api_url(addr: SocketAddr) -> String {
    let ip = match addr.ip() {
        IpAddr::V4(ip) if ip.is_unspecified() => IpAddr::V4(Ipv4Addr::LOCALHOST),
        IpAddr::V6(ip) if ip.is_unspecified() => IpAddr::V6(Ipv6Addr::LOCALHOST),
        ip => ip,
    };
    format!("http://{}", SocketAddr::new(ip, addr.port()))
}

/// Flip `tx` to `true` on Ctrl-C.
async fn shutdown_on_ctrl_c(tx: watch::Sender<bool>) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown requested"),
        Err(e) => {
            warn!("Unable to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    }
    let _ = tx.send(true);
}

pub async fn handle_serve(args: &ArgMatches) -> Result<()> {
    let config = server_config(args);
    let with_monitor = args.get_flag("monitor");

    let registry = Arc::new(SiteRegistry::new());
    let fetcher = PageFetcher::with_timeout(config.fetch_timeout_secs)?;
    let state = AppState::new(registry, fetcher);

    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    let local_addr = listener.local_addr()?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let monitor_task = if with_monitor {
        let monitor_config = MonitorConfig {
            api_url: local_api_url(local_addr),
            ..MonitorConfig::default()
        }
        .with_interval_secs(interval_secs(args));
        let monitor = Monitor::from_config(&monitor_config)?;
        let rx = shutdown_rx.clone();
        Some(tokio::spawn(async move { monitor.run(rx).await }))
    } else {
        None
    };

    let mut server_rx = shutdown_rx;
    let shutdown = async move {
        while !*server_rx.borrow_and_update() {
            if server_rx.changed().await.is_err() {
                break;
            }
        }
    };
    tokio::spawn(shutdown_on_ctrl_c(shutdown_tx));

    serve(listener, state, shutdown).await?;

    if let Some(task) = monitor_task {
        task.await.context("monitor task panicked")?;
    }
    Ok(())
}

pub async fn handle_monitor(args: &ArgMatches) -> Result<()> {
    let config = monitor_config(args);
    let monitor = Monitor::from_config(&config)?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(shutdown_on_ctrl_c(shutdown_tx));

    monitor.run(shutdown_rx).await;
    Ok(())
}

pub async fn handle_scan(args: &ArgMatches) -> Result<()> {
    let raw = args.get_one::<String>("URL").map(String::as_str).unwrap_or("");
    let Some(url) = parse_url_line(raw) else {
        bail!("'{}' is not a valid URL", raw);
    };
    let as_json = args
        .get_one::<String>("format")
        .is_some_and(|f| f == "json");

    let registry = Arc::new(SiteRegistry::new());
    let scanner = Scanner::new(PageFetcher::with_timeout(fetch_timeout(args))?, registry);

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(format!("Scanning {}", url));

    let result = scanner.scan(&url).await;
    spinner.finish_and_clear();

    let report = result.with_context(|| format!("Failed to fetch URL {}", url))?;
    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", format_scan_report(&report));
    }
    Ok(())
}

pub async fn handle_sites(args: &ArgMatches) -> Result<()> {
    let client = MonitorClient::new(
        &api_url(args),
        Duration::from_secs(DEFAULT_MONITOR_REQUEST_TIMEOUT_SECS),
    )?;
    let records = client.list_records().await?;

    if args.get_one::<String>("format").is_some_and(|f| f == "json") {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        print!("{}", format_sites_table(&records));
    }
    Ok(())
}

fn push_divider(report: &mut String) {
    report.push_str(&format!("{}\n", "═".repeat(60).bright_blue().bold()));
}

fn colored_score(score: f64) -> String {
    let text = format!("{:.1}", score);
    if score >= 80.0 {
        text.green().bold().to_string()
    } else if score >= 50.0 {
        text.yellow().bold().to_string()
    } else {
        text.red().bold().to_string()
    }
}

/// Human-readable report for one scan.
pub fn format_scan_report(report: &ScanReport) -> String {
    let mut out = String::new();
    push_divider(&mut out);
    out.push_str(&format!("  {}\n", "AI READINESS REPORT".bright_white().bold()));
    push_divider(&mut out);
    out.push_str(&format!("{} {}\n", "URL:".blue(), report.url.bright_white()));
    out.push_str(&format!("{} {} / 100\n", "Score:".blue(), colored_score(report.score)));
    out.push_str(&format!(
        "{} {} bytes in {} ms\n\n",
        "Fetched:".blue(),
        report.byte_length,
        report.response_time_ms
    ));

    out.push_str(&format!("{}\n", "CATEGORY BREAKDOWN".bright_blue().bold()));
    for (category, points) in &report.details {
        out.push_str(&format!("  {:<20} {:>5.1}\n", category.as_str(), points));
    }
    out.push('\n');

    if report.recommendations.is_empty() {
        out.push_str(&format!("{} No recommendations\n", "✓".green().bold()));
    } else {
        out.push_str(&format!("{}\n", "RECOMMENDATIONS".bright_blue().bold()));
        for rec in &report.recommendations {
            out.push_str(&format!("  {} {}\n", "•".yellow(), rec));
        }
    }
    out
}

/// Table of registered sites, one line each.
pub fn format_sites_table(records: &[SiteRecord]) -> String {
    if records.is_empty() {
        return "No sites registered\n".to_string();
    }

    let mut out = String::new();
    out.push_str(&format!("# Sites: {}\n\n", records.len()));
    for record in records {
        let score = if record.is_scanned() {
            colored_score(record.score)
        } else {
            "-".dimmed().to_string()
        };
        out.push_str(&format!(
            "  {:>6}  {}  ({} recommendation(s))\n",
            score,
            record.url,
            record.recommendations.len()
        ));
    }
    out
}
