//! Hub configuration
//!
//! One `HubConfig` is shared by every component: whether the remote tier is
//! enabled, where it lives, which key prefixes to use, and the local root that
//! mirrors everything on disk.

pub mod facade;
pub mod global;
pub mod merge {
    pub mod policy;
    pub mod service;
}
pub mod sources {
    pub mod environment;
}

pub use facade::ConfigLoader;

use crate::error::HubError;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub(crate) const DEFAULT_REGION: &str = "us-east-1";
pub(crate) const DEFAULT_LOCAL_DIR: &str = "./.agent_hub";
pub(crate) const DEFAULT_PROMPT_CACHE_TTL_SECONDS: u64 = 3600;

const SESSIONS_DIR: &str = "sessions";
const METRICS_DIR: &str = "metrics";
const PROMPTS_DIR: &str = "prompts";

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

fn default_local_dir() -> PathBuf {
    PathBuf::from(DEFAULT_LOCAL_DIR)
}

fn default_sessions_prefix() -> String {
    "sessions".to_string()
}

fn default_metrics_prefix() -> String {
    "metrics".to_string()
}

fn default_prompts_prefix() -> String {
    "system_prompts".to_string()
}

fn default_registry_key() -> String {
    "registry.json".to_string()
}

fn default_prompt_cache_ttl() -> u64 {
    DEFAULT_PROMPT_CACHE_TTL_SECONDS
}

fn default_remote_timeout() -> u64 {
    30
}

/// How remote requests are authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteAuth {
    /// AWS Signature V4 presigned requests; credentials from config, the AWS
    /// environment variables or the shared credentials file.
    #[default]
    Sigv4,
    /// `Authorization: Bearer <remote_token>` for gateways and proxies.
    Bearer,
    /// No authentication (public buckets, local emulators).
    Anonymous,
}

/// Process-wide hub settings. Immutable once handed to a `HubContext`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubConfig {
    /// Use the remote object store as primary persistence
    #[serde(default)]
    pub use_remote: bool,

    /// Remote bucket; required when `use_remote` is set
    #[serde(default)]
    pub bucket: String,

    #[serde(default = "default_region")]
    pub region: String,

    /// Base URL override for S3-compatible endpoints
    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default)]
    pub remote_auth: RemoteAuth,

    /// Bearer token for `remote_auth = "bearer"`
    #[serde(default, skip_serializing)]
    pub remote_token: Option<String>,

    /// Explicit AWS credentials; the AWS environment and shared profile are used when unset
    #[serde(default)]
    pub access_key_id: Option<String>,

    #[serde(default, skip_serializing)]
    pub secret_access_key: Option<String>,

    #[serde(default, skip_serializing)]
    pub session_token: Option<String>,

    /// Shared credentials profile; `AWS_PROFILE` or `default` when unset
    #[serde(default)]
    pub aws_profile: Option<String>,

    #[serde(default = "default_remote_timeout")]
    pub remote_timeout_seconds: u64,

    #[serde(default = "default_sessions_prefix")]
    pub sessions_prefix: String,

    #[serde(default = "default_metrics_prefix")]
    pub metrics_prefix: String,

    #[serde(default = "default_prompts_prefix")]
    pub prompts_prefix: String,

    #[serde(default = "default_registry_key")]
    pub registry_key: String,

    /// Local fallback root
    #[serde(default = "default_local_dir")]
    pub local_dir: PathBuf,

    #[serde(default = "default_prompt_cache_ttl")]
    pub prompt_cache_ttl_seconds: u64,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            use_remote: false,
            bucket: String::new(),
            region: default_region(),
            endpoint: None,
            remote_auth: RemoteAuth::default(),
            remote_token: None,
            access_key_id: None,
            secret_access_key: None,
            session_token: None,
            aws_profile: None,
            remote_timeout_seconds: default_remote_timeout(),
            sessions_prefix: default_sessions_prefix(),
            metrics_prefix: default_metrics_prefix(),
            prompts_prefix: default_prompts_prefix(),
            registry_key: default_registry_key(),
            local_dir: default_local_dir(),
            prompt_cache_ttl_seconds: default_prompt_cache_ttl(),
            logging: LoggingConfig::default(),
        }
    }
}

impl HubConfig {
    /// Local-only configuration rooted at `local_dir`.
    pub fn local(local_dir: impl Into<PathBuf>) -> Self {
        Self {
            local_dir: local_dir.into(),
            ..Self::default()
        }
    }

    /// Remote-enabled configuration with a local mirror at `local_dir`.
    pub fn remote(bucket: impl Into<String>, local_dir: impl Into<PathBuf>) -> Self {
        Self {
            use_remote: true,
            bucket: bucket.into(),
            local_dir: local_dir.into(),
            ..Self::default()
        }
    }

    /// Fail fast on settings that can never work.
    pub fn validate(&self) -> Result<(), HubError> {
        if self.use_remote && self.bucket.trim().is_empty() {
            return Err(HubError::Config(
                "AGENT_HUB_BUCKET must be set when remote storage is enabled".to_string(),
            ));
        }
        let has_token = self
            .remote_token
            .as_deref()
            .map(|t| !t.trim().is_empty())
            .unwrap_or(false);
        if self.use_remote && self.remote_auth == RemoteAuth::Bearer && !has_token {
            return Err(HubError::Config(
                "AGENT_HUB_REMOTE_TOKEN must be set when remote_auth is \"bearer\"".to_string(),
            ));
        }
        Ok(())
    }

    /// Validate and create the local root with its sessions, metrics and prompts directories.
    pub fn prepare(&self) -> Result<(), HubError> {
        self.validate()?;
        for dir in [
            self.local_dir.clone(),
            self.local_sessions_dir(),
            self.local_metrics_dir(),
            self.local_prompts_dir(),
        ] {
            std::fs::create_dir_all(&dir).map_err(|e| HubError::io(&dir, e))?;
        }
        Ok(())
    }

    /// Anchor a relative `local_dir` at the current working directory.
    ///
    /// Sync queues store local paths verbatim, so they must not depend on the
    /// directory a later `sync` runs from.
    pub fn with_absolute_root(mut self) -> Result<Self, HubError> {
        if self.local_dir.is_relative() {
            let cwd = std::env::current_dir().map_err(|e| HubError::io(&self.local_dir, e))?;
            self.local_dir = cwd.join(&self.local_dir);
        }
        Ok(self)
    }

    pub fn local_sessions_dir(&self) -> PathBuf {
        self.local_dir.join(SESSIONS_DIR)
    }

    pub fn local_metrics_dir(&self) -> PathBuf {
        self.local_dir.join(METRICS_DIR)
    }

    pub fn local_prompts_dir(&self) -> PathBuf {
        self.local_dir.join(PROMPTS_DIR)
    }

    pub fn local_registry_path(&self) -> PathBuf {
        self.local_dir.join("registry.json")
    }

    pub fn metrics_sync_queue_path(&self) -> PathBuf {
        self.local_dir.join("sync_queue.txt")
    }

    pub fn prompt_sync_queue_path(&self) -> PathBuf {
        self.local_dir.join("prompt_sync_queue.txt")
    }

    pub fn registry_sync_sentinel_path(&self) -> PathBuf {
        self.local_dir.join("registry_sync_pending")
    }

    /// Build a remote key from a prefix and path segments.
    ///
    /// A trailing `/` on the prefix is tolerated; empty segments are skipped.
    pub fn key(&self, prefix: &str, parts: &[&str]) -> String {
        join_key(prefix, parts)
    }

    pub fn root(&self) -> &Path {
        &self.local_dir
    }
}

pub(crate) fn join_key(prefix: &str, parts: &[&str]) -> String {
    let mut segments: Vec<&str> = Vec::with_capacity(parts.len() + 1);
    let prefix = prefix.trim_end_matches('/');
    if !prefix.is_empty() {
        segments.push(prefix);
    }
    segments.extend(
        parts
            .iter()
            .map(|p| p.trim_matches('/'))
            .filter(|p| !p.is_empty()),
    );
    segments.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::TempDir;

    #[test]
    fn test_remote_without_bucket_is_rejected() {
        let temp = TempDir::new().unwrap();
        let config = HubConfig::remote("", temp.path());
        let err = config.prepare().unwrap_err();
        assert!(matches!(err, HubError::Config(_)));
    }

    #[test]
    fn test_bearer_auth_requires_token() {
        let temp = TempDir::new().unwrap();
        let mut config = HubConfig::remote("bucket", temp.path());
        config.remote_auth = RemoteAuth::Bearer;
        assert!(matches!(config.validate(), Err(HubError::Config(_))));

        config.remote_token = Some("secret".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_local_accepts_any_bucket() {
        let temp = TempDir::new().unwrap();
        let mut config = HubConfig::local(temp.path());
        config.bucket = String::new();
        assert!(config.prepare().is_ok());
        config.bucket = "whatever".to_string();
        assert!(config.prepare().is_ok());
    }

    #[test]
    fn test_prepare_creates_layout() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("hub");
        let config = HubConfig::local(&root);
        config.prepare().unwrap();
        assert!(root.join("sessions").is_dir());
        assert!(root.join("metrics").is_dir());
        assert!(root.join("prompts").is_dir());
    }

    #[test]
    fn test_relative_root_is_anchored() {
        let config = HubConfig::local("relative/hub").with_absolute_root().unwrap();
        assert!(config.local_dir.is_absolute());
        assert!(config.local_dir.ends_with("relative/hub"));
        assert!(config.metrics_sync_queue_path().is_absolute());

        let temp = TempDir::new().unwrap();
        let absolute = HubConfig::local(temp.path()).with_absolute_root().unwrap();
        assert_eq!(absolute.local_dir, temp.path());
    }

    #[test]
    fn test_key_builder() {
        let config = HubConfig::default();
        assert_eq!(
            config.key("metrics/", &["2024-12-15", "run.json"]),
            "metrics/2024-12-15/run.json"
        );
        assert_eq!(
            config.key("system_prompts", &["agent", "current.txt"]),
            "system_prompts/agent/current.txt"
        );
        assert_eq!(config.key("", &["registry.json"]), "registry.json");
    }

    proptest! {
        #[test]
        fn prop_key_starts_with_prefix_and_ends_with_last_part(
            prefix in "[a-z]{1,8}",
            slash in any::<bool>(),
            parts in proptest::collection::vec("[a-z0-9_.-]{1,8}", 1..4),
        ) {
            let raw_prefix = if slash { format!("{}/", prefix) } else { prefix.clone() };
            let refs: Vec<&str> = parts.iter().map(|s| s.as_str()).collect();
            let key = join_key(&raw_prefix, &refs);
            let expected_start = format!("{}/", prefix);
            prop_assert!(key.starts_with(&expected_start));
            prop_assert!(key.ends_with(parts.last().unwrap().as_str()));
            prop_assert!(!key.contains("//"));
        }
    }
}
