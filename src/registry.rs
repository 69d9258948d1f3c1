//! Agent Registry
//!
//! A single JSON document mapping agent ids to metadata and run statistics.
//! Loaded once per instance and cached; every mutation rewrites the whole
//! document, local mirror first, then remote.
//!
//! There is no compare-and-swap on the remote document: two processes that
//! load, mutate and save concurrently race, and the last save wins.

pub mod document;

pub use document::{AgentEntry, RegistryDocument, RunStats};

use crate::context::HubContext;
use crate::error::HubError;
use crate::remote::CONTENT_TYPE_JSON;
use crate::sync_queue::SyncSentinel;
use std::path::Path;
use tracing::{debug, info, warn};

/// Fields supplied to `AgentRegistry::register`. Unset fields leave an existing entry alone.
#[derive(Debug, Clone, Default)]
pub struct AgentRegistration {
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub system_prompt_key: Option<String>,
}

impl AgentRegistration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn system_prompt_key(mut self, key: impl Into<String>) -> Self {
        self.system_prompt_key = Some(key.into());
        self
    }
}

/// Registry for tracking all agents.
///
/// ```no_run
/// # use agent_hub::{AgentRegistration, AgentRegistry, HubConfig, HubContext};
/// # let ctx = HubContext::new(HubConfig::local("./.agent_hub")).unwrap();
/// let mut registry = AgentRegistry::new(ctx);
/// registry
///     .register(
///         "job-enricher",
///         AgentRegistration::new()
///             .description("Enriches job postings")
///             .tags(["jobs"]),
///         false,
///     )
///     .unwrap();
/// registry.record_run("job-enricher", "job-enricher_20241215_101500", true).unwrap();
/// ```
pub struct AgentRegistry {
    ctx: HubContext,
    cache: Option<RegistryDocument>,
}

impl AgentRegistry {
    pub fn new(ctx: HubContext) -> Self {
        Self { ctx, cache: None }
    }

    /// Register an agent.
    ///
    /// If the agent exists and `update_if_exists` is false the existing entry is
    /// returned untouched, so this is safe to call on every run.
    pub fn register(
        &mut self,
        agent_id: &str,
        registration: AgentRegistration,
        update_if_exists: bool,
    ) -> Result<AgentEntry, HubError> {
        let now = self.ctx.clock().epoch_seconds();
        let default_prompt_key = {
            let config = self.ctx.config();
            config.key(&config.prompts_prefix, &[agent_id, "current.txt"])
        };

        let registry = self.load()?;
        if let Some(existing) = registry.agents.get(agent_id) {
            if !update_if_exists {
                return Ok(existing.clone());
            }
        }

        let entry = registry
            .agents
            .entry(agent_id.to_string())
            .or_insert_with(|| AgentEntry::new(agent_id, now));
        entry.updated_at = now;
        if let Some(description) = registration.description.filter(|d| !d.is_empty()) {
            entry.description = Some(description);
        }
        if !registration.tags.is_empty() {
            entry.tags = dedup_tags(registration.tags);
        }
        if let Some(key) = registration.system_prompt_key.filter(|k| !k.is_empty()) {
            entry.system_prompt_key = key;
        }
        if entry.system_prompt_key.is_empty() {
            entry.system_prompt_key = default_prompt_key;
        }
        let entry = entry.clone();

        self.persist()?;
        Ok(entry)
    }

    pub fn get_agent(&mut self, agent_id: &str) -> Result<Option<AgentEntry>, HubError> {
        Ok(self.load()?.agents.get(agent_id).cloned())
    }

    /// All agents, optionally filtered by tag, oldest first.
    pub fn list_agents(&mut self, tag: Option<&str>) -> Result<Vec<AgentEntry>, HubError> {
        let mut agents: Vec<AgentEntry> = self
            .load()?
            .agents
            .values()
            .filter(|a| tag.map(|t| a.has_tag(t)).unwrap_or(true))
            .cloned()
            .collect();
        agents.sort_by(|a, b| a.created_at.total_cmp(&b.created_at));
        Ok(agents)
    }

    /// Update an agent's metadata, creating it if needed.
    pub fn update_agent(
        &mut self,
        agent_id: &str,
        description: Option<&str>,
        tags: Option<Vec<String>>,
    ) -> Result<AgentEntry, HubError> {
        let registration = AgentRegistration {
            description: description.map(str::to_string),
            tags: tags.unwrap_or_default(),
            system_prompt_key: None,
        };
        self.register(agent_id, registration, true)
    }

    /// Count a run. Unregistered agents are ignored.
    pub fn record_run(&mut self, agent_id: &str, run_id: &str, success: bool) -> Result<(), HubError> {
        let now = self.ctx.clock().epoch_seconds();
        let registry = self.load()?;
        let Some(agent) = registry.agents.get_mut(agent_id) else {
            debug!(agent_id, "record_run for unregistered agent ignored");
            return Ok(());
        };

        agent.run_stats.get_or_insert_with(RunStats::default).record(success);
        agent.last_run_at = Some(now);
        agent.last_run_id = Some(run_id.to_string());

        self.persist()
    }

    /// Remove an agent. Returns whether it was present.
    pub fn remove_agent(&mut self, agent_id: &str) -> Result<bool, HubError> {
        let removed = self.load()?.agents.remove(agent_id).is_some();
        if removed {
            self.persist()?;
        }
        Ok(removed)
    }

    /// Push the local mirror to the remote store if an earlier save failed.
    pub fn sync_if_pending(ctx: &HubContext) -> Result<bool, HubError> {
        let config = ctx.config();
        let sentinel = SyncSentinel::new(config.registry_sync_sentinel_path());
        if !sentinel.is_set() {
            return Ok(false);
        }
        let Some(remote) = ctx.remote() else {
            return Ok(false);
        };

        let local_path = config.local_registry_path();
        if !local_path.exists() {
            return Ok(false);
        }
        let raw = std::fs::read(&local_path).map_err(|e| HubError::io(&local_path, e))?;
        let document: RegistryDocument = serde_json::from_slice(&raw)?;
        let body = serde_json::to_vec_pretty(&document)?;

        match remote.put(&config.registry_key, &body, CONTENT_TYPE_JSON) {
            Ok(()) => {
                sentinel.clear()?;
                info!("Registry synced to remote");
                Ok(true)
            }
            Err(e) => {
                warn!("Registry sync failed: {}", e);
                Ok(false)
            }
        }
    }

    fn load(&mut self) -> Result<&mut RegistryDocument, HubError> {
        let document = match self.cache.take() {
            Some(document) => document,
            None => self.read_document()?,
        };
        Ok(self.cache.insert(document))
    }

    fn read_document(&self) -> Result<RegistryDocument, HubError> {
        let config = self.ctx.config();
        let local_path = config.local_registry_path();

        if let Some(remote) = self.ctx.remote() {
            match remote.get(&config.registry_key) {
                Ok(Some(raw)) => {
                    let document: RegistryDocument = serde_json::from_slice(&raw)?;
                    write_local(&local_path, &serde_json::to_vec_pretty(&document)?)?;
                    return Ok(document);
                }
                Ok(None) => {
                    debug!("No remote registry yet");
                }
                Err(e) => {
                    warn!("Could not load registry from remote: {}", e);
                }
            }
        }

        if local_path.exists() {
            let raw = std::fs::read(&local_path).map_err(|e| HubError::io(&local_path, e))?;
            return Ok(serde_json::from_slice(&raw)?);
        }

        Ok(RegistryDocument::empty(self.ctx.clock().epoch_seconds()))
    }

    fn persist(&mut self) -> Result<(), HubError> {
        let now = self.ctx.clock().epoch_seconds();
        let body = match self.cache.as_mut() {
            Some(document) => {
                document.updated_at = Some(now);
                serde_json::to_vec_pretty(&*document)?
            }
            None => return Ok(()),
        };

        let config = self.ctx.config();
        write_local(&config.local_registry_path(), &body)?;

        if let Some(remote) = self.ctx.remote() {
            if let Err(e) = remote.put(&config.registry_key, &body, CONTENT_TYPE_JSON) {
                warn!("Could not save registry to remote: {}", e);
                SyncSentinel::new(config.registry_sync_sentinel_path()).set()?;
            }
        }
        Ok(())
    }
}

fn write_local(path: &Path, body: &[u8]) -> Result<(), HubError> {
    std::fs::write(path, body).map_err(|e| HubError::io(path, e))
}

fn dedup_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = Vec::with_capacity(tags.len());
    for tag in tags {
        if !seen.contains(&tag) {
            seen.push(tag);
        }
    }
    seen
}
