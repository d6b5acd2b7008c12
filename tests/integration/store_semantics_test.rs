use std::collections::HashMap;

use fleetmon::core::chart::{ema, DEFAULT_ALPHA};
use fleetmon::core::telemetry::{ContainerStats, HostMetrics, Snapshot, Sparklines, TelemetryStore};

fn host_metrics(cpu: f64) -> HostMetrics {
    HostMetrics {
        cpu_percent: cpu,
        ..Default::default()
    }
}

fn container(id: &str, host: &str, state: &str) -> ContainerStats {
    ContainerStats {
        id: id.to_string(),
        name: id.to_string(),
        state: state.to_string(),
        host_id: host.to_string(),
        ..Default::default()
    }
}

#[test]
fn absent_field_leaves_map_untouched() {
    let store = TelemetryStore::new();
    let mut metrics = HashMap::new();
    metrics.insert("h1".to_string(), host_metrics(42.0));
    store.ingest(Snapshot {
        host_metrics: Some(metrics),
        ..Default::default()
    });

    // Snapshot without a host_metrics field at all: no change
    store.ingest(Snapshot {
        containers: Some(vec![container("c1", "h1", "running")]),
        ..Default::default()
    });

    assert_eq!(store.host_metrics("h1").unwrap().cpu_percent, 42.0);
}

#[test]
fn present_field_replaces_whole_map() {
    let store = TelemetryStore::new();
    let mut first = HashMap::new();
    first.insert("h1".to_string(), host_metrics(42.0));
    first.insert("h2".to_string(), host_metrics(10.0));
    store.ingest(Snapshot {
        host_metrics: Some(first),
        ..Default::default()
    });

    // h1 omitted from a snapshot that does include host_metrics: full replace
    let mut second = HashMap::new();
    second.insert("h2".to_string(), host_metrics(11.0));
    store.ingest(Snapshot {
        host_metrics: Some(second),
        ..Default::default()
    });

    assert!(store.host_metrics("h1").is_none());
    assert_eq!(store.host_metrics("h2").unwrap().cpu_percent, 11.0);
}

#[test]
fn container_sparklines_resolved_by_bare_id() {
    let store = TelemetryStore::new();
    store.ingest_json(
        r#"{
            "type": "containers_update",
            "data": {
                "container_sparklines": {
                    "h1:c1": {"cpu": [10, 12, 11]}
                },
                "timestamp": "2026-08-27T10:00:00Z"
            }
        }"#,
    );

    let sparklines = store.container_sparklines("c1").expect("c1 resolvable");
    assert_eq!(sparklines.cpu, vec![10.0, 12.0, 11.0]);
    assert!(store.container_sparklines("c2").is_none());

    // Smoothing the same series is deterministic and matches the
    // closed-form expansion.
    let smoothed = ema(&sparklines.cpu, DEFAULT_ALPHA);
    assert!((smoothed[0] - 10.0).abs() < 1e-9);
    assert!((smoothed[1] - 10.6).abs() < 1e-9);
    assert!((smoothed[2] - 10.72).abs() < 1e-9);
    assert_eq!(smoothed, ema(&sparklines.cpu, DEFAULT_ALPHA));
}

#[test]
fn bad_field_does_not_block_the_rest_of_the_message() {
    let store = TelemetryStore::new();
    store.ingest_json(
        r#"{
            "type": "containers_update",
            "data": {
                "containers": [
                    {"id": "c1", "name": "web", "state": "running", "host_id": "h1"}
                ],
                "host_metrics": {"h1": {"cpu_percent": 40.0}},
                "host_sparklines": "garbage-not-a-map"
            }
        }"#,
    );

    // The unparseable field is skipped; the other fields still commit.
    assert!(store.container_stats("h1", "c1").is_some());
    assert_eq!(store.host_metrics("h1").unwrap().cpu_percent, 40.0);
    assert!(store.host_sparklines("h1").is_none());
}

#[test]
fn last_received_snapshot_wins() {
    let store = TelemetryStore::new();
    store.ingest(Snapshot {
        containers: Some(vec![container("c1", "h1", "running")]),
        ..Default::default()
    });
    store.ingest(Snapshot {
        containers: Some(vec![container("c2", "h1", "running")]),
        ..Default::default()
    });

    assert!(store.container_stats("h1", "c1").is_none());
    assert!(store.container_stats("h1", "c2").is_some());
    let ids: Vec<String> = store
        .list_containers("h1")
        .into_iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(ids, vec!["c2"]);
}

#[test]
fn timestamp_tracks_snapshots() {
    let store = TelemetryStore::new();
    assert!(store.last_update().is_none());

    store.ingest_json(
        r#"{"type": "containers_update",
            "data": {"timestamp": "2026-08-27T10:00:00Z"}}"#,
    );
    let ts = store.last_update().expect("timestamp recorded");
    assert_eq!(ts.to_rfc3339(), "2026-08-27T10:00:00+00:00");
}

#[test]
fn emptied_sparklines_replace_but_keep_key() {
    let store = TelemetryStore::new();
    let mut first = HashMap::new();
    first.insert(
        "h1:c1".to_string(),
        Sparklines {
            cpu: vec![1.0, 2.0],
            ..Default::default()
        },
    );
    store.ingest(Snapshot {
        container_sparklines: Some(first),
        ..Default::default()
    });

    // The shrink-to-empty anomaly is logged but last-wins still applies.
    let mut second = HashMap::new();
    second.insert("h1:c1".to_string(), Sparklines::default());
    store.ingest(Snapshot {
        container_sparklines: Some(second),
        ..Default::default()
    });

    let sparklines = store.container_sparklines("c1").unwrap();
    assert!(sparklines.all_empty());
}
