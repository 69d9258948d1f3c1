//! Default layer applied beneath every other configuration source.

use crate::config::{DEFAULT_LOCAL_DIR, DEFAULT_PROMPT_CACHE_TTL_SECONDS, DEFAULT_REGION};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

/// Start a builder with the documented defaults.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("use_remote", false)?
        .set_default("region", DEFAULT_REGION)?
        .set_default("local_dir", DEFAULT_LOCAL_DIR)?
        .set_default(
            "prompt_cache_ttl_seconds",
            DEFAULT_PROMPT_CACHE_TTL_SECONDS as i64,
        )
}
