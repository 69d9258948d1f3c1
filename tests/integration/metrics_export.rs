use crate::support::TestHub;
use agent_hub::{ExportLocation, MetricsExporter};
use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Value};

fn read_json(path: &std::path::Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn export_writes_local_document_with_all_metrics() {
    let hub = TestHub::local();
    let mut exporter = MetricsExporter::new(hub.ctx.clone(), "agent", "agent_run_1", Some("v2"));
    exporter.set_timing("fetch", 1.5);
    exporter.set_stats("total_jobs", 100);
    exporter.set_stats("source", "indeed");
    hub.clock.advance(Duration::seconds(3));

    let location = exporter.export().unwrap();
    let ExportLocation::Local(path) = location else {
        panic!("expected a local export");
    };
    assert!(path.exists());

    let doc = read_json(&path);
    assert_eq!(doc["timing"]["fetch"], json!(1.5));
    assert_eq!(doc["stats"]["total_jobs"], json!(100));
    assert_eq!(doc["stats"]["source"], json!("indeed"));
    assert_eq!(doc["prompt_version"], json!("v2"));

    let started: DateTime<Utc> = doc["started_at"].as_str().unwrap().parse().unwrap();
    let completed: DateTime<Utc> = doc["completed_at"].as_str().unwrap().parse().unwrap();
    assert!(completed >= started);
    assert_eq!(doc["timing"]["total_runtime_seconds"], json!(3.0));
}

#[test]
fn remote_failure_falls_back_and_queues() {
    let hub = TestHub::remote();
    hub.store.set_fail_writes(true);

    let mut exporter = MetricsExporter::new(hub.ctx.clone(), "agent", "agent_run_2", None);
    exporter.set_stats("rows", 7);
    let location = exporter.export().unwrap();

    let ExportLocation::Local(path) = location else {
        panic!("expected a local export");
    };
    assert!(path.exists());
    let queue = std::fs::read_to_string(hub.root().join("sync_queue.txt")).unwrap();
    assert!(queue.lines().any(|l| l == path.to_string_lossy()));

    hub.store.set_fail_writes(false);
    assert_eq!(MetricsExporter::sync_pending(&hub.ctx).unwrap(), 1);
    assert!(!hub.root().join("sync_queue.txt").exists());

    let date = path.parent().unwrap().file_name().unwrap().to_str().unwrap();
    let key = format!("metrics/{}/agent_run_2.json", date);
    let uploaded: Value = serde_json::from_slice(&hub.store.object(&key).unwrap()).unwrap();
    assert_eq!(uploaded["stats"]["rows"], json!(7));
}

#[test]
fn remote_success_still_mirrors_locally() {
    let hub = TestHub::remote();
    let mut exporter = MetricsExporter::new(hub.ctx.clone(), "agent", "agent_run_3", None);
    let location = exporter.export().unwrap();

    let ExportLocation::Remote(key) = location else {
        panic!("expected a remote export");
    };
    assert!(hub.store.contains(&key));
    assert!(exporter.local_path().unwrap().exists());
    assert!(!hub.root().join("sync_queue.txt").exists());
}
