//! Environment variable source: AGENT_HUB_* prefix with __ separator, plus the legacy USE_S3 flag.

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::Map;

const PREFIX: &str = "AGENT_HUB";
const LEGACY_REMOTE_FLAG: &str = "USE_S3";

/// Snapshot the process environment.
pub fn process_vars() -> Map<String, String> {
    std::env::vars().collect()
}

/// Add environment variable overlay to builder.
/// Uses AGENT_HUB_ prefix and __ as separator for nested keys
/// (`AGENT_HUB_LOCAL_DIR` -> `local_dir`, `AGENT_HUB_LOGGING__LEVEL` -> `logging.level`).
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    vars: &Map<String, String>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let mut builder = builder.add_source(
        Environment::with_prefix(PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .source(Some(vars.clone())),
    );

    // AGENT_HUB_USE_REMOTE wins over the legacy flag when both are present.
    if !vars.contains_key("AGENT_HUB_USE_REMOTE") {
        if let Some(flag) = legacy_remote_flag(vars) {
            builder = builder.set_override("use_remote", flag)?;
        }
    }
    Ok(builder)
}

fn legacy_remote_flag(vars: &Map<String, String>) -> Option<bool> {
    vars.get(LEGACY_REMOTE_FLAG)
        .map(|value| value.trim().eq_ignore_ascii_case("true"))
}
