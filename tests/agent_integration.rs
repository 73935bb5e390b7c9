//! End-to-end tests for the health-check agent.
//!
//! Cycles run against a throwaway HTTP server bound to an ephemeral
//! loopback port, with one healthy and one broken endpoint.

use std::io::Write;
use std::time::Duration;

use axum::{Router, http::StatusCode, routing::get};
use healthwatch::{
    AgentConfig, App, MetricsStore, ProbeStatus, Prober, ReloadPolicy, Scheduler, Topology,
    run_cycle,
};
use tokio::net::TcpListener;

// =============================================================================
// Test Helpers
// =============================================================================

/// Start a test server and return its host:port.
async fn start_health_server() -> String {
    let router = Router::new()
        .route("/health", get(|| async { StatusCode::OK }))
        .route("/broken", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }));

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let addr = listener.local_addr().expect("Failed to get local addr");

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    // Give server time to start
    tokio::time::sleep(Duration::from_millis(50)).await;

    addr.to_string()
}

fn app(domain: &str, endpoint: &str) -> App {
    App {
        domain: domain.to_string(),
        health_endpoint: endpoint.to_string(),
    }
}

fn prober(store: &MetricsStore) -> Prober {
    Prober::new(Duration::from_secs(2), store.clone()).expect("Failed to build prober")
}

// =============================================================================
// Probe Classification
// =============================================================================

#[tokio::test]
async fn test_healthy_endpoint_reports_up() {
    let host = start_health_server().await;
    let store = MetricsStore::new();

    let (status, metrics) = prober(&store)
        .probe(&host, &app("svc1", "/health"))
        .await;

    assert_eq!(status, ProbeStatus::Up);
    assert_eq!(metrics.last_success, metrics.last_request);
    assert!(metrics.last_failure.is_none());
}

#[tokio::test]
async fn test_non_200_reports_down_and_keeps_success_history() {
    let host = start_health_server().await;
    let store = MetricsStore::new();
    let prober = prober(&store);

    // First observe a success, then the endpoint breaks.
    let (_, healthy) = prober.probe(&host, &app("svc1", "/health")).await;
    let (status, broken) = prober.probe(&host, &app("svc1", "/broken")).await;

    assert_eq!(status, ProbeStatus::Down);
    assert_eq!(broken.last_failure, broken.last_request);
    // Success history survives the failure.
    assert_eq!(broken.last_success, healthy.last_success);
    assert!(broken.last_request >= healthy.last_request);
}

#[tokio::test]
async fn test_last_request_monotonic_across_cycles() {
    let host = start_health_server().await;
    let store = MetricsStore::new();
    let prober = prober(&store);
    let target = app("svc1", "/health");

    let mut previous = None;
    for _ in 0..3 {
        let (_, metrics) = prober.probe(&host, &target).await;
        assert!(metrics.last_request >= previous);
        previous = metrics.last_request;
    }
}

// =============================================================================
// Cycle Orchestration
// =============================================================================

#[tokio::test]
async fn test_cycle_line_count_and_host_contiguity() {
    let host_a = start_health_server().await;
    let host_b = start_health_server().await;
    let store = MetricsStore::new();

    let mut topology = Topology::new();
    topology.insert(host_a, vec![app("a1", "/health"), app("a2", "/broken")]);
    topology.insert(host_b, vec![app("b1", "/health"), app("b2", "/health")]);

    let body = run_cycle(&prober(&store), &topology).await;
    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(lines.len(), 4);

    // Within a host, lines stay contiguous and in configuration order.
    let a1 = lines.iter().position(|l| l.starts_with("a1: ")).unwrap();
    assert!(lines[a1 + 1].starts_with("a2: "));
    let b1 = lines.iter().position(|l| l.starts_with("b1: ")).unwrap();
    assert!(lines[b1 + 1].starts_with("b2: "));

    assert!(lines[a1].starts_with("a1: UP"));
    assert!(lines[a1 + 1].starts_with("a2: DOWN"));
}

#[tokio::test]
async fn test_cycle_lines_match_report_format() {
    let host = start_health_server().await;
    let store = MetricsStore::new();

    let mut topology = Topology::new();
    topology.insert(host, vec![app("svc1", "/health")]);

    let body = run_cycle(&prober(&store), &topology).await;
    let line = body.lines().next().unwrap();

    let parts: Vec<&str> = line.split(" | ").collect();
    assert_eq!(parts.len(), 4);
    assert!(parts[0].starts_with("svc1: UP"));
    assert!(parts[1].starts_with("Last 200: "));
    assert!(parts[2].starts_with("Last Request: "));
    assert!(parts[3].starts_with("Last Fail: "));
    // Never failed, so the failure timestamp renders as zero.
    assert_eq!(parts[3], "Last Fail: 0");
}

#[tokio::test]
async fn test_repeated_cycles_keep_one_line_per_domain() {
    let host = start_health_server().await;
    let store = MetricsStore::new();
    let prober = prober(&store);

    let mut topology = Topology::new();
    topology.insert(host, vec![app("svc1", "/health"), app("svc2", "/broken")]);

    for _ in 0..3 {
        let body = run_cycle(&prober, &topology).await;
        assert_eq!(body.lines().count(), 2);
    }
    assert_eq!(store.len(), 2);
}

// =============================================================================
// Scheduler Ticks
// =============================================================================

#[tokio::test]
async fn test_scheduler_tick_writes_report() {
    let host = start_health_server().await;
    let dir = tempfile::tempdir().unwrap();

    let topology_path = dir.path().join("apps.json");
    let mut topology_file = std::fs::File::create(&topology_path).unwrap();
    write!(
        topology_file,
        r#"{{"{host}": [{{"domain": "svc1", "healthEndpoint": "/health"}}]}}"#
    )
    .unwrap();

    let report_path = dir.path().join("report.txt");
    let config = AgentConfig {
        health_check_interval: 1,
        apps_config_path: topology_path.display().to_string(),
        output_file_path: report_path.display().to_string(),
        http_client_timeout: 2,
        reload_policy: ReloadPolicy::Startup,
    };

    let store = MetricsStore::new();
    let prober = Prober::new(config.http_timeout(), store.clone()).unwrap();
    let scheduler = Scheduler::new(config, dir.path().join("config.json"), store);

    scheduler.run_once(&prober).await;

    let report = std::fs::read_to_string(&report_path).unwrap();
    assert_eq!(report.lines().count(), 1);
    assert!(report.starts_with("svc1: UP"));
}

#[tokio::test]
async fn test_scheduler_tick_with_malformed_topology_leaves_report_alone() {
    let dir = tempfile::tempdir().unwrap();

    let topology_path = dir.path().join("apps.json");
    std::fs::write(&topology_path, "]]not json[[").unwrap();

    let report_path = dir.path().join("report.txt");
    std::fs::write(&report_path, "svc1: UP | from an earlier cycle\n").unwrap();

    let config = AgentConfig {
        health_check_interval: 1,
        apps_config_path: topology_path.display().to_string(),
        output_file_path: report_path.display().to_string(),
        http_client_timeout: 2,
        reload_policy: ReloadPolicy::Startup,
    };

    let store = MetricsStore::new();
    let prober = Prober::new(config.http_timeout(), store.clone()).unwrap();
    let scheduler = Scheduler::new(config, dir.path().join("config.json"), store.clone());

    scheduler.run_once(&prober).await;

    // Cycle skipped: no probes ran, previous report untouched.
    assert!(store.is_empty());
    let report = std::fs::read_to_string(&report_path).unwrap();
    assert_eq!(report, "svc1: UP | from an earlier cycle\n");
}
