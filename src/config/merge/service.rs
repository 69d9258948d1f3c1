//! MergeService: orchestrates sources, applies merge policy, deserializes to HubConfig.

use crate::config::sources::environment;
use crate::config::HubConfig;
use config::{ConfigError, File, Map};
use std::path::Path;

use super::policy;

/// Merge service for config composition.
pub struct MergeService;

impl MergeService {
    /// Load config from defaults and the given environment snapshot.
    /// Precedence: defaults (lowest) -> environment (highest).
    pub fn load(vars: &Map<String, String>) -> Result<HubConfig, ConfigError> {
        let builder = policy::builder_with_defaults()?;
        let builder = environment::add_to_builder(builder, vars)?;

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Load config from a specific file with environment overlay.
    /// Precedence: defaults -> file -> environment.
    pub fn load_from_file(path: &Path, vars: &Map<String, String>) -> Result<HubConfig, ConfigError> {
        let builder = policy::builder_with_defaults()?;
        let builder = builder.add_source(File::from(path));
        let builder = environment::add_to_builder(builder, vars)?;

        let config = builder.build()?;
        config.try_deserialize()
    }
}
