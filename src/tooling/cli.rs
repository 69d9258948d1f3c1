//! CLI Tooling
//!
//! Operator commands over a hub root: replay pending remote writes, inspect the
//! registry, and read or publish prompt versions.

use crate::config::merge::service::MergeService;
use crate::config::sources::environment;
use crate::config::HubConfig;
use crate::context::HubContext;
use crate::error::HubError;
use crate::metrics::MetricsExporter;
use crate::prompt::PromptManager;
use crate::registry::AgentRegistry;
use crate::session::generate_run_id;
use crate::tooling::format::{
    format_agent_list_json, format_agent_list_text, format_agent_show_json,
    format_agent_show_text, format_sync_report_text, format_versions_json, format_versions_text,
    SyncReport,
};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::info;

/// Agent hub CLI - prompts, registry and metrics with remote-or-local storage
#[derive(Parser, Debug)]
#[command(name = "agent-hub")]
#[command(about = "Inspect and maintain agent hub storage (prompts, registry, metrics)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (environment variables still apply on top)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Local root directory (overrides AGENT_HUB_LOCAL_DIR)
    #[arg(long)]
    pub local_dir: Option<PathBuf>,

    /// Ignore the remote store for this invocation
    #[arg(long)]
    pub local_only: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay queued metrics and prompt uploads and push a pending registry
    Sync,
    /// Inspect the agent registry
    Agents {
        #[command(subcommand)]
        command: AgentsCommands,
    },
    /// Read and publish system prompts
    Prompt {
        #[command(subcommand)]
        command: PromptCommands,
    },
    /// Print a fresh run id for an agent
    RunId {
        /// Agent ID
        agent_id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum AgentsCommands {
    /// List registered agents
    List {
        /// Only agents carrying this tag
        #[arg(long)]
        tag: Option<String>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Show one agent
    Show {
        /// Agent ID
        agent_id: String,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[derive(Subcommand, Debug)]
pub enum PromptCommands {
    /// Print the current prompt (or a specific version)
    Get {
        /// Agent ID
        agent_id: String,
        /// Version to print instead of current
        #[arg(long)]
        version: Option<String>,
        /// Bypass the local cache
        #[arg(long, conflicts_with = "version")]
        refresh: bool,
    },
    /// List locally known versions
    Versions {
        /// Agent ID
        agent_id: String,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Publish a version from a file
    Set {
        /// Agent ID
        agent_id: String,
        /// Version label, e.g. v2
        version: String,
        /// File holding the prompt text
        #[arg(long)]
        file: PathBuf,
        /// Note stored with the version
        #[arg(long)]
        note: Option<String>,
        /// Store the version without making it current
        #[arg(long)]
        no_current: bool,
    },
    /// Make an existing version current
    Promote {
        /// Agent ID
        agent_id: String,
        /// Version label
        version: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Resolved configuration and context for one CLI invocation.
pub struct CliContext {
    ctx: HubContext,
}

impl CliContext {
    /// Load configuration (file, then environment, then flags) without touching disk.
    pub fn load_config(cli: &Cli) -> Result<HubConfig, HubError> {
        let vars = environment::process_vars();
        let mut config = match &cli.config {
            Some(path) => MergeService::load_from_file(path, &vars)?,
            None => MergeService::load(&vars)?,
        };

        if let Some(dir) = &cli.local_dir {
            config.local_dir = dir.clone();
        }
        if cli.local_only {
            config.use_remote = false;
        }
        if let Some(level) = &cli.log_level {
            config.logging.level = level.clone();
        }
        if let Some(format) = &cli.log_format {
            config.logging.format = format.clone();
        }
        if let Some(output) = &cli.log_output {
            config.logging.output = output.clone();
        }
        if let Some(file) = &cli.log_file {
            config.logging.file = Some(file.clone());
        }
        Ok(config)
    }

    pub fn new(config: HubConfig) -> Result<Self, HubError> {
        Ok(Self {
            ctx: HubContext::new(config)?,
        })
    }

    pub fn from_context(ctx: HubContext) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &HubContext {
        &self.ctx
    }

    /// Execute a CLI command and return its printable output.
    pub fn execute(&self, command: &Commands) -> Result<String, HubError> {
        match command {
            Commands::Sync => self.sync(),
            Commands::Agents { command } => self.execute_agents(command),
            Commands::Prompt { command } => self.execute_prompt(command),
            Commands::RunId { agent_id } => Ok(generate_run_id(agent_id, self.ctx.clock())),
        }
    }

    fn sync(&self) -> Result<String, HubError> {
        let report = SyncReport {
            metrics_synced: MetricsExporter::sync_pending(&self.ctx)?,
            prompts_synced: PromptManager::sync_pending(&self.ctx)?,
            registry_synced: AgentRegistry::sync_if_pending(&self.ctx)?,
        };
        info!(
            metrics = report.metrics_synced,
            prompts = report.prompts_synced,
            registry = report.registry_synced,
            "Sync finished"
        );
        Ok(format_sync_report_text(&report, self.ctx.remote_enabled()))
    }

    fn execute_agents(&self, command: &AgentsCommands) -> Result<String, HubError> {
        let mut registry = AgentRegistry::new(self.ctx.clone());
        match command {
            AgentsCommands::List { tag, format } => {
                let agents = registry.list_agents(tag.as_deref())?;
                Ok(match format {
                    OutputFormat::Text => format_agent_list_text(&agents),
                    OutputFormat::Json => format_agent_list_json(&agents),
                })
            }
            AgentsCommands::Show { agent_id, format } => {
                let agent = registry
                    .get_agent(agent_id)?
                    .ok_or_else(|| HubError::NotFound(format!("Agent not registered: {}", agent_id)))?;
                Ok(match format {
                    OutputFormat::Text => format_agent_show_text(&agent),
                    OutputFormat::Json => format_agent_show_json(&agent),
                })
            }
        }
    }

    fn execute_prompt(&self, command: &PromptCommands) -> Result<String, HubError> {
        match command {
            PromptCommands::Get {
                agent_id,
                version,
                refresh,
            } => {
                let manager = PromptManager::new(self.ctx.clone(), agent_id.as_str())?;
                match version {
                    Some(version) => manager.get_version(version),
                    None => manager.get_current(*refresh, None),
                }
            }
            PromptCommands::Versions { agent_id, format } => {
                let manager = PromptManager::new(self.ctx.clone(), agent_id.as_str())?;
                let versions = manager.list_versions()?;
                Ok(match format {
                    OutputFormat::Text => format_versions_text(agent_id, &versions),
                    OutputFormat::Json => format_versions_json(agent_id, &versions),
                })
            }
            PromptCommands::Set {
                agent_id,
                version,
                file,
                note,
                no_current,
            } => {
                let content =
                    std::fs::read_to_string(file).map_err(|e| HubError::io(file, e))?;
                let manager = PromptManager::new(self.ctx.clone(), agent_id.as_str())?;
                manager.set(&content, version, !*no_current, note.as_deref())?;
                Ok(format!(
                    "Stored {} version {}{}",
                    agent_id,
                    version,
                    if *no_current { "" } else { " (current)" }
                ))
            }
            PromptCommands::Promote { agent_id, version } => {
                let manager = PromptManager::new(self.ctx.clone(), agent_id.as_str())?;
                manager.promote(version)?;
                Ok(format!("{} now uses version {}", agent_id, version))
            }
        }
    }
}
