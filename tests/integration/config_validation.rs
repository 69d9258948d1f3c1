use agent_hub::config::merge::service::MergeService;
use agent_hub::{HubConfig, HubContext, HubError};
use config::Map;
use tempfile::TempDir;

#[test]
fn remote_without_bucket_is_a_config_error() {
    let temp = TempDir::new().unwrap();
    let config = HubConfig::remote("", temp.path());
    assert!(matches!(config.validate(), Err(HubError::Config(_))));
    assert!(matches!(HubContext::new(config), Err(HubError::Config(_))));
}

#[test]
fn local_mode_accepts_any_bucket() {
    let temp = TempDir::new().unwrap();
    for bucket in ["", "  ", "some-bucket"] {
        let config = HubConfig {
            bucket: bucket.to_string(),
            ..HubConfig::local(temp.path())
        };
        assert!(config.validate().is_ok());
    }
}

#[test]
fn environment_remote_flag_without_bucket_fails_at_construction() {
    let temp = TempDir::new().unwrap();
    let vars: Map<String, String> = [
        ("USE_S3", "true".to_string()),
        ("AGENT_HUB_LOCAL_DIR", temp.path().display().to_string()),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();

    let config = MergeService::load(&vars).unwrap();
    assert!(config.use_remote);
    assert!(HubContext::new(config).is_err());
}

#[test]
fn construction_creates_local_layout() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("hub");
    HubContext::new(HubConfig::local(&root)).unwrap();
    for sub in ["sessions", "metrics", "prompts"] {
        assert!(root.join(sub).is_dir(), "missing {}", sub);
    }
}
