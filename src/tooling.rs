//! Tooling & Integration Layer
//!
//! The `agent-hub` operator CLI and its output formatting.

pub mod cli;
pub mod format;

pub use cli::{Cli, CliContext, Commands};
pub use format::SyncReport;
