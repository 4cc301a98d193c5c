// Tests for the monitoring loop against a mock API

use aiready_core::monitor::{CycleSummary, Monitor, MonitorClient, ScanAck};
use aiready_core::MonitorError;
use serde_json::json;
use std::time::Duration;
use tokio::sync::watch;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, method, path},
};

fn scan_response(url: &str, score: f64) -> serde_json::Value {
    json!({
        "url": url,
        "score": score,
        "recommendations": ["Add a descriptive, non-empty <title> tag."],
        "details": {
            "content_structure": 0.0,
            "metadata_quality": 0.0,
            "performance": 20.0,
            "crawlability": 10.0,
            "ai_friendliness": 0.0
        }
    })
}

async fn mount_sites(server: &MockServer, urls: &[&str]) {
    let sites: Vec<serde_json::Value> = urls
        .iter()
        .map(|u| json!({"url": u, "last_scan": 0.0, "score": 0.0, "recommendations": [], "details": null}))
        .collect();
    Mock::given(method("GET"))
        .and(path("/sites"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sites))
        .mount(server)
        .await;
}

fn monitor_for(server: &MockServer, interval: Duration) -> Monitor {
    let client = MonitorClient::new(&server.uri(), Duration::from_secs(5)).unwrap();
    Monitor::new(client, interval)
}

// ============================================================================
// Single cycle
// ============================================================================

#[tokio::test]
async fn test_cycle_scans_every_site() {
    let mock_server = MockServer::start().await;
    mount_sites(&mock_server, &["https://a.example.com", "https://b.example.com"]).await;

    for url in ["https://a.example.com", "https://b.example.com"] {
        Mock::given(method("POST"))
            .and(path("/scan"))
            .and(body_json(json!({ "url": url })))
            .respond_with(ResponseTemplate::new(200).set_body_json(scan_response(url, 30.0)))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let summary = monitor_for(&mock_server, Duration::from_secs(3600))
        .run_cycle()
        .await;

    assert_eq!(
        summary,
        CycleSummary {
            listed: 2,
            scanned: 2,
            failed: 0
        }
    );
}

#[tokio::test]
async fn test_list_failure_is_an_empty_cycle() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sites"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/scan"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let summary = monitor_for(&mock_server, Duration::from_secs(3600))
        .run_cycle()
        .await;

    assert_eq!(summary, CycleSummary::default());
}

#[tokio::test]
async fn test_unreachable_api_is_an_empty_cycle() {
    let client = MonitorClient::new("http://127.0.0.1:1", Duration::from_secs(1)).unwrap();
    let err = client.list_sites().await.unwrap_err();
    assert!(matches!(err, MonitorError::ListSites(_)));

    let summary = Monitor::new(client, Duration::from_secs(3600))
        .run_cycle()
        .await;
    assert_eq!(summary, CycleSummary::default());
}

#[tokio::test]
async fn test_one_failing_site_does_not_stop_the_cycle() {
    let mock_server = MockServer::start().await;
    mount_sites(
        &mock_server,
        &["https://down.example.com", "https://up.example.com"],
    )
    .await;

    Mock::given(method("POST"))
        .and(path("/scan"))
        .and(body_json(json!({ "url": "https://down.example.com" })))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({ "detail": "Failed to fetch URL: connection refused" })),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/scan"))
        .and(body_json(json!({ "url": "https://up.example.com" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(scan_response("https://up.example.com", 30.0)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let summary = monitor_for(&mock_server, Duration::from_secs(3600))
        .run_cycle()
        .await;

    assert_eq!(summary.listed, 2);
    assert_eq!(summary.scanned, 1);
    assert_eq!(summary.failed, 1);
}

#[tokio::test]
async fn test_rejected_scan_carries_detail() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/scan"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "detail": "Failed to fetch URL: boom" })),
        )
        .mount(&mock_server)
        .await;

    let client = MonitorClient::new(&mock_server.uri(), Duration::from_secs(5)).unwrap();
    let err = client.trigger_scan("https://x.example.com").await.unwrap_err();

    match err {
        MonitorError::ScanRejected { status, detail, .. } => {
            assert_eq!(status, 400);
            assert_eq!(detail, "Failed to fetch URL: boom");
        }
        other => panic!("expected rejected scan, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unknown_detail_keys_still_count_as_scanned() {
    let mock_server = MockServer::start().await;
    mount_sites(&mock_server, &["https://a.example.com"]).await;
    Mock::given(method("POST"))
        .and(path("/scan"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "url": "https://a.example.com",
            "score": 30.0,
            "recommendations": ["Add a descriptive, non-empty <title> tag."],
            "details": { "performance": 20.0, "crawlability": 10.0, "freshness": 0.0 }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let summary = monitor_for(&mock_server, Duration::from_secs(3600))
        .run_cycle()
        .await;

    assert_eq!(
        summary,
        CycleSummary {
            listed: 1,
            scanned: 1,
            failed: 0
        }
    );
}

#[tokio::test]
async fn test_trigger_scan_reads_score_and_recommendations() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/scan"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(scan_response("https://x.example.com", 42.0)),
        )
        .mount(&mock_server)
        .await;

    let client = MonitorClient::new(&mock_server.uri(), Duration::from_secs(5)).unwrap();
    let ack = client.trigger_scan("https://x.example.com").await.unwrap();

    assert_eq!(
        ack,
        ScanAck {
            score: 42.0,
            recommendations: vec!["Add a descriptive, non-empty <title> tag.".to_string()],
        }
    );
}

#[tokio::test]
async fn test_success_without_json_body_counts_as_scanned() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/scan"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&mock_server)
        .await;

    let client = MonitorClient::new(&mock_server.uri(), Duration::from_secs(5)).unwrap();
    let ack = client.trigger_scan("https://x.example.com").await.unwrap();

    assert_eq!(ack, ScanAck::default());
}

#[tokio::test]
async fn test_entries_without_url_are_skipped() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sites"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{ "url": "" }, { "score": 1.0 }, { "url": "https://ok.example.com" }])),
        )
        .mount(&mock_server)
        .await;

    let client = MonitorClient::new(&mock_server.uri(), Duration::from_secs(5)).unwrap();
    let sites = client.list_sites().await.unwrap();

    assert_eq!(sites, vec!["https://ok.example.com".to_string()]);
}

// ============================================================================
// Loop control
// ============================================================================

#[tokio::test]
async fn test_run_stops_on_shutdown_signal() {
    let mock_server = MockServer::start().await;
    mount_sites(&mock_server, &[]).await;

    let monitor = monitor_for(&mock_server, Duration::from_secs(3600));
    let (tx, rx) = watch::channel(false);
    let handle = tokio::spawn(async move { monitor.run(rx).await });

    // Give the first cycle time to list sites, then ask it to stop mid-sleep.
    tokio::time::sleep(Duration::from_millis(200)).await;
    tx.send(true).unwrap();

    tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("monitor did not stop")
        .unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
}

#[tokio::test]
async fn test_run_repeats_cycles_after_interval() {
    let mock_server = MockServer::start().await;
    mount_sites(&mock_server, &[]).await;

    let monitor = monitor_for(&mock_server, Duration::from_millis(50));
    let (tx, rx) = watch::channel(false);
    let handle = tokio::spawn(async move { monitor.run(rx).await });

    tokio::time::sleep(Duration::from_millis(400)).await;
    tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("monitor did not stop")
        .unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert!(requests.len() >= 2, "only {} cycle(s) ran", requests.len());
}

#[tokio::test]
async fn test_run_does_nothing_when_already_stopped() {
    let mock_server = MockServer::start().await;
    mount_sites(&mock_server, &[]).await;

    let (_tx, rx) = watch::channel(true);
    monitor_for(&mock_server, Duration::from_secs(3600))
        .run(rx)
        .await;

    assert!(mock_server.received_requests().await.unwrap().is_empty());
}
