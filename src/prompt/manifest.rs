//! Version metadata: the remote `versions.json` manifest and local `<version>_meta.json` files.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub version: String,
    #[serde(default)]
    pub note: Option<String>,
    pub created_at: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<f64>,
}

/// Known versions for one agent plus which one is current.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionsManifest {
    #[serde(default)]
    pub versions: Vec<ManifestEntry>,
    #[serde(default)]
    pub current: Option<String>,
}

impl VersionsManifest {
    pub fn new() -> Self {
        Self {
            versions: Vec::new(),
            current: None,
        }
    }

    /// Add or refresh an entry; an existing note is only replaced when a new one is given.
    pub fn upsert(&mut self, version: &str, note: Option<&str>, make_current: bool, now: f64) {
        match self.versions.iter_mut().find(|v| v.version == version) {
            Some(existing) => {
                if let Some(note) = note {
                    existing.note = Some(note.to_string());
                }
                existing.updated_at = Some(now);
            }
            None => self.versions.push(ManifestEntry {
                version: version.to_string(),
                note: note.map(str::to_string),
                created_at: now,
                updated_at: None,
            }),
        }
        if make_current || self.current.is_none() {
            self.current = Some(version.to_string());
        }
    }

    pub fn get(&self, version: &str) -> Option<&ManifestEntry> {
        self.versions.iter().find(|v| v.version == version)
    }
}

impl Default for VersionsManifest {
    fn default() -> Self {
        Self::new()
    }
}

/// Sidecar written next to each local version file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionMeta {
    pub version: String,
    #[serde(default)]
    pub note: Option<String>,
    pub created_at: f64,
}

/// One row of `PromptManager::list_versions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionInfo {
    pub version: String,
    pub local: bool,
    pub note: Option<String>,
    pub created_at: Option<f64>,
}
