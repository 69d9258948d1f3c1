use crate::support::{remote_context, TestHub};
use agent_hub::{AgentRegistration, AgentRegistry};
use std::sync::Arc;
use tempfile::TempDir;

#[test]
fn register_is_idempotent_unless_updating() {
    let hub = TestHub::local();
    let mut registry = AgentRegistry::new(hub.ctx.clone());

    registry
        .register("a", AgentRegistration::new().description("d1"), false)
        .unwrap();
    let entry = registry
        .register("a", AgentRegistration::new().description("d2"), false)
        .unwrap();
    assert_eq!(entry.description.as_deref(), Some("d1"));

    let entry = registry
        .register("a", AgentRegistration::new().description("d2"), true)
        .unwrap();
    assert_eq!(entry.description.as_deref(), Some("d2"));
}

#[test]
fn run_accounting_counts_total_and_successful() {
    let hub = TestHub::local();
    let mut registry = AgentRegistry::new(hub.ctx.clone());
    registry
        .register("a", AgentRegistration::new(), false)
        .unwrap();

    registry.record_run("a", "r1", true).unwrap();
    registry.record_run("a", "r2", false).unwrap();
    registry.record_run("a", "r3", true).unwrap();

    let entry = registry.get_agent("a").unwrap().unwrap();
    let stats = entry.run_stats.unwrap();
    assert_eq!(stats.total_runs, 3);
    assert_eq!(stats.successful_runs, 2);
    assert_eq!(entry.last_run_id.as_deref(), Some("r3"));
}

#[test]
fn record_run_for_unregistered_agent_is_a_no_op() {
    let hub = TestHub::local();
    let mut registry = AgentRegistry::new(hub.ctx.clone());
    registry.record_run("never-registered", "r1", true).unwrap();
    assert!(registry.get_agent("never-registered").unwrap().is_none());
    assert!(registry.list_agents(None).unwrap().is_empty());
}

#[test]
fn concurrent_instances_last_save_wins() {
    let store = Arc::new(agent_hub::MemoryObjectStore::new());
    let first_root = TempDir::new().unwrap();
    let second_root = TempDir::new().unwrap();

    let mut first = AgentRegistry::new(remote_context(first_root.path(), store.clone()));
    let mut second = AgentRegistry::new(remote_context(second_root.path(), store.clone()));

    // Both load the same (empty) document before either saves.
    assert!(first.list_agents(None).unwrap().is_empty());
    assert!(second.list_agents(None).unwrap().is_empty());

    first
        .register("from-first", AgentRegistration::new(), false)
        .unwrap();
    second
        .register("from-second", AgentRegistration::new(), false)
        .unwrap();

    let reader_root = TempDir::new().unwrap();
    let mut fresh = AgentRegistry::new(remote_context(reader_root.path(), store.clone()));
    let ids: Vec<String> = fresh
        .list_agents(None)
        .unwrap()
        .into_iter()
        .map(|a| a.agent_id)
        .collect();
    assert_eq!(ids, vec!["from-second"]);
}

#[test]
fn remote_outage_is_recovered_by_sync() {
    let hub = TestHub::remote();
    hub.store.set_offline(true);

    let mut registry = AgentRegistry::new(hub.ctx.clone());
    registry
        .register("a", AgentRegistration::new().tags(["etl"]), false)
        .unwrap();
    assert!(hub.root().join("registry.json").exists());
    assert!(!hub.store.contains("registry.json"));

    hub.store.set_offline(false);
    assert!(AgentRegistry::sync_if_pending(&hub.ctx).unwrap());
    assert!(hub.store.contains("registry.json"));
}
