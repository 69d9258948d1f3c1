//! ConfigLoader facade delegating to merge service.

use super::merge::service::MergeService;
use super::sources::environment;
use super::HubConfig;
use crate::error::HubError;
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from the process environment, validate it and create the local layout.
    pub fn load() -> Result<HubConfig, HubError> {
        let config = MergeService::load(&environment::process_vars())?;
        config.prepare()?;
        Ok(config)
    }

    /// Load configuration from a specific file with the environment layered on top.
    pub fn load_from_file(path: &Path) -> Result<HubConfig, HubError> {
        let config = MergeService::load_from_file(path, &environment::process_vars())?;
        config.prepare()?;
        Ok(config)
    }

    /// Create default configuration.
    pub fn default() -> HubConfig {
        HubConfig::default()
    }
}
