use crate::support::TestHub;
use agent_hub::{PromptFallback, PromptManager};
use chrono::Duration;

#[test]
fn ensure_exists_round_trips_locally() {
    let hub = TestHub::local();
    let manager = PromptManager::new(hub.ctx.clone(), "agent").unwrap();

    assert_eq!(manager.ensure_exists("X", "v1").unwrap(), "v1");
    assert_eq!(manager.get_current(false, None).unwrap(), "X");
    assert_eq!(manager.get_version("v1").unwrap(), "X");
}

#[test]
fn ensure_exists_never_overwrites() {
    let hub = TestHub::remote();
    let manager = PromptManager::new(hub.ctx.clone(), "agent").unwrap();

    manager.ensure_exists("original", "v1").unwrap();
    manager.ensure_exists("replacement", "v1").unwrap();
    assert_eq!(manager.get_version("v1").unwrap(), "original");
    assert_eq!(
        hub.store.text("system_prompts/agent/v1.txt").as_deref(),
        Some("original")
    );
}

#[test]
fn expired_cache_is_served_when_nothing_else_is_available() {
    let hub = TestHub::local();
    let manager = PromptManager::new(hub.ctx.clone(), "agent").unwrap();
    manager.set("X", "v1", true, None).unwrap();

    let ttl = hub.ctx.config().prompt_cache_ttl_seconds as i64;
    hub.clock.advance(Duration::seconds(ttl + 1));
    assert_eq!(manager.get_current(false, None).unwrap(), "X");
}

#[test]
fn never_initialized_agent_is_not_found() {
    let hub = TestHub::local();
    let manager = PromptManager::new(hub.ctx.clone(), "fresh-agent").unwrap();
    let err = manager.get_current(false, None).unwrap_err();
    assert!(err.is_not_found());

    let fallback = PromptFallback::Text("default prompt".to_string());
    assert_eq!(
        manager.get_current(false, Some(&fallback)).unwrap(),
        "default prompt"
    );
}

#[test]
fn remote_current_replaces_expired_cache() {
    let hub = TestHub::remote();
    let manager = PromptManager::new(hub.ctx.clone(), "agent").unwrap();
    manager.set("old", "v1", true, None).unwrap();

    hub.store
        .insert("system_prompts/agent/current.txt", "new from another process");
    assert_eq!(manager.get_current(false, None).unwrap(), "old");

    hub.clock.advance(Duration::hours(2));
    assert_eq!(
        manager.get_current(false, None).unwrap(),
        "new from another process"
    );
}

#[test]
fn queued_versions_are_replayed() {
    let hub = TestHub::remote();
    hub.store.set_offline(true);
    let manager = PromptManager::new(hub.ctx.clone(), "agent").unwrap();
    manager.set("offline prompt", "v3", true, Some("written offline")).unwrap();
    assert!(hub.root().join("prompt_sync_queue.txt").exists());

    hub.store.set_offline(false);
    assert_eq!(PromptManager::sync_pending(&hub.ctx).unwrap(), 1);
    assert_eq!(
        hub.store.text("system_prompts/agent/v3.txt").as_deref(),
        Some("offline prompt")
    );
    assert_eq!(
        hub.store.text("system_prompts/agent/current.txt").as_deref(),
        Some("offline prompt")
    );
    assert!(!hub.root().join("prompt_sync_queue.txt").exists());
}

#[test]
fn list_versions_reports_local_versions_only() {
    let hub = TestHub::remote();
    let manager = PromptManager::new(hub.ctx.clone(), "agent").unwrap();
    manager.set("one", "v1", true, Some("first")).unwrap();
    manager.set("two", "v2", false, None).unwrap();
    hub.store.insert("system_prompts/agent/v9.txt", "remote only");

    let versions: Vec<String> = manager
        .list_versions()
        .unwrap()
        .into_iter()
        .map(|v| v.version)
        .collect();
    assert_eq!(versions, vec!["v1", "v2"]);
}
