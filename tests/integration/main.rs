//! Integration tests for the agent hub

mod cli_parse;
mod config_validation;
mod metrics_export;
mod prompt_lifecycle;
mod registry_accounting;
mod support;
