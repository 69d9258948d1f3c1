//! Registry JSON document types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub total_runs: u64,
    pub successful_runs: u64,
}

impl RunStats {
    pub fn record(&mut self, success: bool) {
        self.total_runs += 1;
        if success {
            self.successful_runs += 1;
        }
    }
}

/// One agent's entry. Unknown fields written by other tools are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentEntry {
    pub agent_id: String,
    pub created_at: f64,
    #[serde(default)]
    pub updated_at: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub system_prompt_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_run_at: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_run_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_stats: Option<RunStats>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AgentEntry {
    pub fn new(agent_id: &str, now: f64) -> Self {
        Self {
            agent_id: agent_id.to_string(),
            created_at: now,
            updated_at: now,
            description: None,
            tags: Vec::new(),
            system_prompt_key: String::new(),
            last_run_at: None,
            last_run_id: None,
            run_stats: None,
            extra: Map::new(),
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn stats(&self) -> RunStats {
        self.run_stats.unwrap_or_default()
    }
}

/// The single registry document: agent id -> entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryDocument {
    #[serde(default)]
    pub agents: BTreeMap<String, AgentEntry>,
    pub created_at: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RegistryDocument {
    pub fn empty(now: f64) -> Self {
        Self {
            agents: BTreeMap::new(),
            created_at: now,
            updated_at: None,
            extra: Map::new(),
        }
    }
}
