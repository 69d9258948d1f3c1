//! System Prompt Management
//!
//! Versioned prompt storage per agent over three tiers: the remote store,
//! local version files, and a local "current" cache with a TTL. Versions are
//! never mutated by `ensure_exists`; `set` is the explicit overwrite path.
//!
//! Local layout under `<root>/prompts/<agent_id>/`:
//! `current.txt`, `current_cache_meta.json`, `<version>.txt`, `<version>_meta.json`.
//! Remote layout under `<prompts_prefix>/<agent_id>/`:
//! `current.txt`, `<version>.txt`, `versions.json`.

pub mod cache;
pub mod manifest;

pub use cache::{CacheMeta, CurrentCache};
pub use manifest::{ManifestEntry, VersionInfo, VersionMeta, VersionsManifest};

use crate::context::HubContext;
use crate::error::{HubError, RemoteError};
use crate::remote::{RemoteObjectStore, CONTENT_TYPE_JSON};
use crate::sync_queue::SyncQueue;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const CURRENT_KEY: &str = "current.txt";
const MANIFEST_KEY: &str = "versions.json";
/// Version labels that would collide with the cache files in the agent directory.
const RESERVED_VERSIONS: [&str; 2] = ["current", "current_cache"];
/// Marks a queued version that may only be uploaded when remote lacks it.
const CREATE_ONLY_SUFFIX: &str = "#create";

/// How a queued version is replayed by `sync_pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SyncMode {
    /// Written by `set` or `promote`; replaces the remote copy.
    Overwrite,
    /// Bootstrapped by `ensure_exists`; an existing remote version wins.
    CreateOnly,
}

/// Where `get_current` goes when no tier has a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptFallback {
    Text(String),
    File(PathBuf),
}

impl PromptFallback {
    /// Treat `value` as a file path when such a file exists, otherwise as literal text.
    pub fn infer(value: &str) -> Self {
        let path = Path::new(value);
        if path.is_file() {
            PromptFallback::File(path.to_path_buf())
        } else {
            PromptFallback::Text(value.to_string())
        }
    }

    fn resolve(&self) -> Result<String, HubError> {
        match self {
            PromptFallback::Text(text) => Ok(text.clone()),
            PromptFallback::File(path) => {
                std::fs::read_to_string(path).map_err(|e| HubError::io(path, e))
            }
        }
    }
}

impl From<&str> for PromptFallback {
    fn from(value: &str) -> Self {
        PromptFallback::Text(value.to_string())
    }
}

impl From<PathBuf> for PromptFallback {
    fn from(value: PathBuf) -> Self {
        PromptFallback::File(value)
    }
}

/// Prompt manager for one agent identity.
///
/// ```no_run
/// # use agent_hub::{HubConfig, HubContext, PromptManager};
/// # let ctx = HubContext::new(HubConfig::local("./.agent_hub")).unwrap();
/// let manager = PromptManager::new(ctx, "job-enricher").unwrap();
/// manager.ensure_exists("You enrich job postings.", "v1").unwrap();
/// let prompt = manager.get_current(false, None).unwrap();
/// ```
pub struct PromptManager {
    ctx: HubContext,
    agent_id: String,
    dir: PathBuf,
    cache: CurrentCache,
}

impl PromptManager {
    pub fn new(ctx: HubContext, agent_id: impl Into<String>) -> Result<Self, HubError> {
        let agent_id = agent_id.into();
        validate_agent_id(&agent_id)?;
        let dir = ctx.config().local_prompts_dir().join(&agent_id);
        std::fs::create_dir_all(&dir).map_err(|e| HubError::io(&dir, e))?;
        let cache = CurrentCache::new(&dir);
        Ok(Self {
            ctx,
            agent_id,
            dir,
            cache,
        })
    }

    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    pub fn local_dir(&self) -> &Path {
        &self.dir
    }

    /// Resolve the current prompt.
    ///
    /// Order: fresh local cache (unless `force_refresh`), remote `current.txt`,
    /// stale local cache, `fallback`, then a not-found error.
    pub fn get_current(
        &self,
        force_refresh: bool,
        fallback: Option<&PromptFallback>,
    ) -> Result<String, HubError> {
        let now = self.ctx.clock().epoch_seconds();
        let ttl = self.ctx.config().prompt_cache_ttl_seconds;

        if !force_refresh {
            if let Some(cached) = self.cache.read(now, ttl, false)? {
                debug!(agent_id = %self.agent_id, "Prompt cache hit");
                return Ok(cached);
            }
        }

        if let Some(remote) = self.ctx.remote() {
            match self.fetch(remote, CURRENT_KEY) {
                Ok(Some(content)) => {
                    self.cache.write(&content, now)?;
                    return Ok(content);
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(agent_id = %self.agent_id, "Could not fetch prompt from remote: {}", e);
                }
            }
        }

        if let Some(cached) = self.cache.read(now, ttl, true)? {
            return Ok(cached);
        }

        if let Some(fallback) = fallback {
            return fallback.resolve();
        }

        Err(HubError::NotFound(format!(
            "No system prompt found for agent '{}'. Use ensure_exists() or set() to create one.",
            self.agent_id
        )))
    }

    /// Make sure `version` exists somewhere, creating it from `content` only if it exists nowhere.
    ///
    /// Existing version content is never overwritten. Returns the version.
    pub fn ensure_exists(&self, content: &str, version: &str) -> Result<String, HubError> {
        validate_version(version)?;
        if let Some(remote) = self.ctx.remote() {
            match self.fetch(remote, &version_file(version)) {
                Ok(Some(existing)) => {
                    match self.fetch(remote, CURRENT_KEY) {
                        Ok(Some(_)) => {}
                        Ok(None) => {
                            if let Err(e) = remote.put_text(&self.remote_key(CURRENT_KEY), &existing)
                            {
                                warn!(agent_id = %self.agent_id, "Could not promote {} on remote: {}", version, e);
                            }
                        }
                        Err(e) => {
                            warn!(agent_id = %self.agent_id, "Could not check remote current prompt: {}", e);
                        }
                    }
                    return Ok(version.to_string());
                }
                Ok(None) => {}
                Err(e) => {
                    debug!(agent_id = %self.agent_id, "Remote version check failed: {}", e);
                }
            }
        }

        let local_version = self.version_path(version);
        if local_version.exists() {
            let local_content = std::fs::read_to_string(&local_version)
                .map_err(|e| HubError::io(&local_version, e))?;

            if !self.cache.exists() {
                self.cache
                    .write(&local_content, self.ctx.clock().epoch_seconds())?;
            }

            if let Some(remote) = self.ctx.remote() {
                if let Err(e) = self.sync_local_version(remote, version, &local_content) {
                    warn!(agent_id = %self.agent_id, "Could not sync {} to remote: {}", version, e);
                }
            }
            return Ok(version.to_string());
        }

        self.write_version(content, version, true, None, SyncMode::CreateOnly)?;
        Ok(version.to_string())
    }

    /// Write a version, overwriting any previous content for it.
    ///
    /// Remote writes are best-effort; on failure the version is queued for
    /// `sync_pending`. The local current cache only changes when `make_current`.
    pub fn set(
        &self,
        content: &str,
        version: &str,
        make_current: bool,
        note: Option<&str>,
    ) -> Result<(), HubError> {
        validate_version(version)?;
        self.write_version(content, version, make_current, note, SyncMode::Overwrite)
    }

    fn write_version(
        &self,
        content: &str,
        version: &str,
        make_current: bool,
        note: Option<&str>,
        mode: SyncMode,
    ) -> Result<(), HubError> {
        let now = self.ctx.clock().epoch_seconds();
        let local_version = self.version_path(version);
        std::fs::write(&local_version, content).map_err(|e| HubError::io(&local_version, e))?;
        self.write_version_meta(version, note, now)?;

        if let Some(remote) = self.ctx.remote() {
            match self.push_version(remote, version, content, make_current, note) {
                Ok(()) => {
                    info!(agent_id = %self.agent_id, version, make_current, "Uploaded prompt");
                }
                Err(e) => {
                    warn!(agent_id = %self.agent_id, "Could not upload prompt {}: {}", version, e);
                    self.queue_for_sync(version, mode)?;
                }
            }
        }

        if make_current {
            self.cache.write(content, now)?;
        }
        Ok(())
    }

    /// Fetch one version: local first, then remote (cached locally on success).
    pub fn get_version(&self, version: &str) -> Result<String, HubError> {
        validate_version(version)?;
        let local_version = self.version_path(version);
        if local_version.exists() {
            return std::fs::read_to_string(&local_version)
                .map_err(|e| HubError::io(&local_version, e));
        }

        if let Some(remote) = self.ctx.remote() {
            match self.fetch(remote, &version_file(version)) {
                Ok(Some(content)) => {
                    std::fs::write(&local_version, &content)
                        .map_err(|e| HubError::io(&local_version, e))?;
                    return Ok(content);
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(agent_id = %self.agent_id, "Could not fetch {} from remote: {}", version, e);
                }
            }
        }

        Err(HubError::NotFound(format!(
            "Prompt version '{}' not found for agent '{}'",
            version, self.agent_id
        )))
    }

    /// Versions present in the local directory, sorted by version string.
    ///
    /// Remote-only versions appear once they have been fetched with `get_version`.
    pub fn list_versions(&self) -> Result<Vec<VersionInfo>, HubError> {
        let entries = std::fs::read_dir(&self.dir).map_err(|e| HubError::io(&self.dir, e))?;

        let mut versions = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| HubError::io(&self.dir, e))?;
            let path = entry.path();
            if path.extension() != Some(std::ffi::OsStr::new("txt")) {
                continue;
            }
            let version = match path.file_stem().and_then(|s| s.to_str()) {
                Some(stem) if stem != "current" => stem.to_string(),
                Some(_) => continue,
                None => {
                    warn!("Skipping prompt file with non UTF8 name: {:?}", path);
                    continue;
                }
            };

            let meta = self.read_version_meta(&version)?;
            versions.push(VersionInfo {
                version,
                local: true,
                note: meta.as_ref().and_then(|m| m.note.clone()),
                created_at: meta.as_ref().map(|m| m.created_at),
            });
        }

        versions.sort_by(|a, b| a.version.cmp(&b.version));
        Ok(versions)
    }

    /// Make an existing version current, locally and (best-effort) remotely.
    pub fn promote(&self, version: &str) -> Result<(), HubError> {
        validate_version(version)?;
        let content = self.get_version(version)?;
        if let Some(remote) = self.ctx.remote() {
            let promoted = remote
                .put_text(&self.remote_key(CURRENT_KEY), &content)
                .map_err(HubError::from)
                .and_then(|()| self.update_manifest(remote, version, None, true));
            if let Err(e) = promoted {
                warn!(agent_id = %self.agent_id, "Could not promote {} on remote: {}", version, e);
                self.queue_for_sync(version, SyncMode::Overwrite)?;
            }
        }
        self.cache.write(&content, self.ctx.clock().epoch_seconds())
    }

    /// Replay `prompt_sync_queue.txt`.
    ///
    /// Each `<agent_id>:<version>` entry re-uploads the local version file; if
    /// it matches the agent's local current prompt, `current.txt` and the
    /// manifest are updated too. Entries suffixed `#create` were bootstrapped
    /// offline and are only uploaded when remote has no such version; otherwise
    /// the remote copy replaces the local one. Entries whose file is gone are
    /// dropped.
    pub fn sync_pending(ctx: &HubContext) -> Result<usize, HubError> {
        let queue = SyncQueue::new(ctx.config().prompt_sync_queue_path());
        if !queue.exists() {
            return Ok(0);
        }
        let Some(remote) = ctx.remote() else {
            return Ok(0);
        };

        let mut synced = 0;
        let mut remaining = Vec::new();
        for entry in queue.entries()? {
            let Some((agent_id, version, mode)) = parse_queue_entry(&entry) else {
                warn!("Dropping malformed prompt sync entry: {}", entry);
                continue;
            };
            let manager = match PromptManager::new(ctx.clone(), agent_id) {
                Ok(manager) => manager,
                Err(e) => {
                    warn!("Dropping prompt sync entry {}: {}", entry, e);
                    continue;
                }
            };
            match manager.replay(remote, version, mode) {
                Ok(true) => synced += 1,
                Ok(false) => {
                    debug!("Local prompt for {} is gone, dropping", entry);
                }
                Err(e) => {
                    warn!("Failed to sync prompt {}: {}", entry, e);
                    remaining.push(entry);
                }
            }
        }
        queue.replace(&remaining)?;
        Ok(synced)
    }

    fn replay(
        &self,
        remote: &dyn RemoteObjectStore,
        version: &str,
        mode: SyncMode,
    ) -> Result<bool, HubError> {
        validate_version(version)?;
        let local_version = self.version_path(version);
        if !local_version.exists() {
            return Ok(false);
        }
        let content = std::fs::read_to_string(&local_version)
            .map_err(|e| HubError::io(&local_version, e))?;

        if mode == SyncMode::CreateOnly {
            match self.fetch(remote, &version_file(version))? {
                Some(existing) if existing != content => {
                    self.adopt_remote_version(remote, version, &content, &existing)?;
                }
                Some(_) => {}
                None => self.sync_local_version(remote, version, &content)?,
            }
            return Ok(true);
        }

        let is_current = match self.cache.read(0.0, 0, true)? {
            Some(current) => current == content,
            None => false,
        };
        let note = self.read_version_meta(version)?.and_then(|m| m.note);
        self.push_version(remote, version, &content, is_current, note.as_deref())?;
        Ok(true)
    }

    fn push_version(
        &self,
        remote: &dyn RemoteObjectStore,
        version: &str,
        content: &str,
        make_current: bool,
        note: Option<&str>,
    ) -> Result<(), HubError> {
        remote.put_text(&self.remote_key(&version_file(version)), content)?;
        if make_current {
            remote.put_text(&self.remote_key(CURRENT_KEY), content)?;
            self.update_manifest(remote, version, note, true)?;
        }
        Ok(())
    }

    fn sync_local_version(
        &self,
        remote: &dyn RemoteObjectStore,
        version: &str,
        content: &str,
    ) -> Result<(), HubError> {
        if self.fetch(remote, &version_file(version))?.is_some() {
            return Ok(());
        }
        info!(agent_id = %self.agent_id, version, "Syncing local prompt to remote");
        remote.put_text(&self.remote_key(&version_file(version)), content)?;
        let promote = self.fetch(remote, CURRENT_KEY)?.is_none();
        if promote {
            remote.put_text(&self.remote_key(CURRENT_KEY), content)?;
        }
        let note = self.read_version_meta(version)?.and_then(|m| m.note);
        self.update_manifest(remote, version, note.as_deref(), promote)
    }

    /// Replace a local bootstrap copy with the version that already exists on remote.
    fn adopt_remote_version(
        &self,
        remote: &dyn RemoteObjectStore,
        version: &str,
        local: &str,
        existing: &str,
    ) -> Result<(), HubError> {
        warn!(
            agent_id = %self.agent_id,
            version,
            "Remote already has a different {}; keeping the remote content",
            version
        );
        let path = self.version_path(version);
        std::fs::write(&path, existing).map_err(|e| HubError::io(&path, e))?;
        if self.cache.read(0.0, 0, true)?.as_deref() == Some(local) {
            let current = self
                .fetch(remote, CURRENT_KEY)?
                .unwrap_or_else(|| existing.to_string());
            self.cache.write(&current, self.ctx.clock().epoch_seconds())?;
        }
        Ok(())
    }

    fn update_manifest(
        &self,
        remote: &dyn RemoteObjectStore,
        version: &str,
        note: Option<&str>,
        make_current: bool,
    ) -> Result<(), HubError> {
        let key = self.remote_key(MANIFEST_KEY);
        let mut manifest = match remote.get_text(&key)? {
            Some(raw) => serde_json::from_str(&raw)?,
            None => VersionsManifest::new(),
        };
        manifest.upsert(version, note, make_current, self.ctx.clock().epoch_seconds());
        let body = serde_json::to_vec_pretty(&manifest)?;
        remote.put(&key, &body, CONTENT_TYPE_JSON)?;
        Ok(())
    }

    /// Remote text, with an empty object treated as absent.
    fn fetch(&self, remote: &dyn RemoteObjectStore, name: &str) -> Result<Option<String>, RemoteError> {
        Ok(remote
            .get_text(&self.remote_key(name))?
            .filter(|content| !content.is_empty()))
    }

    fn remote_key(&self, name: &str) -> String {
        let config = self.ctx.config();
        config.key(&config.prompts_prefix, &[&self.agent_id, name])
    }

    fn version_path(&self, version: &str) -> PathBuf {
        self.dir.join(version_file(version))
    }

    fn version_meta_path(&self, version: &str) -> PathBuf {
        self.dir.join(format!("{}_meta.json", version))
    }

    fn write_version_meta(&self, version: &str, note: Option<&str>, now: f64) -> Result<(), HubError> {
        let meta = VersionMeta {
            version: version.to_string(),
            note: note.map(str::to_string),
            created_at: now,
        };
        let path = self.version_meta_path(version);
        std::fs::write(&path, serde_json::to_string(&meta)?).map_err(|e| HubError::io(&path, e))
    }

    fn read_version_meta(&self, version: &str) -> Result<Option<VersionMeta>, HubError> {
        let path = self.version_meta_path(version);
        if !path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(&path).map_err(|e| HubError::io(&path, e))?;
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn queue_for_sync(&self, version: &str, mode: SyncMode) -> Result<(), HubError> {
        let suffix = match mode {
            SyncMode::Overwrite => "",
            SyncMode::CreateOnly => CREATE_ONLY_SUFFIX,
        };
        SyncQueue::new(self.ctx.config().prompt_sync_queue_path())
            .push(&format!("{}:{}{}", self.agent_id, version, suffix))
    }
}

fn version_file(version: &str) -> String {
    format!("{}.txt", version)
}

/// Split `<agent_id>:<version>[#create]`. Versions never contain `:` or `#`.
fn parse_queue_entry(entry: &str) -> Option<(&str, &str, SyncMode)> {
    let (entry, mode) = match entry.strip_suffix(CREATE_ONLY_SUFFIX) {
        Some(stripped) => (stripped, SyncMode::CreateOnly),
        None => (entry, SyncMode::Overwrite),
    };
    let (agent_id, version) = entry.rsplit_once(':')?;
    Some((agent_id, version, mode))
}

/// Versions become file names next to the current cache.
fn validate_version(version: &str) -> Result<(), HubError> {
    let invalid = version.is_empty()
        || version == "."
        || version == ".."
        || version.contains(['/', '\\', ':', '#'])
        || RESERVED_VERSIONS.contains(&version);
    if invalid {
        return Err(HubError::Config(format!(
            "Invalid prompt version: {:?}",
            version
        )));
    }
    Ok(())
}

/// Agent ids become directory names, so keep them to a single path segment.
fn validate_agent_id(agent_id: &str) -> Result<(), HubError> {
    if agent_id.is_empty()
        || agent_id == "."
        || agent_id == ".."
        || agent_id.contains('/')
        || agent_id.contains('\\')
    {
        return Err(HubError::Config(format!("Invalid agent id: {:?}", agent_id)));
    }
    Ok(())
}
