//! Format registry, prompt and sync results as text or JSON.

use crate::prompt::VersionInfo;
use crate::registry::AgentEntry;
use chrono::{TimeZone, Utc};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde::Serialize;
use serde_json::json;

/// Counts from one `agent-hub sync` pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub metrics_synced: usize,
    pub prompts_synced: usize,
    pub registry_synced: bool,
}

pub fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

/// Epoch seconds as a UTC timestamp, or "-" when unset.
pub fn format_timestamp(epoch_seconds: Option<f64>) -> String {
    epoch_seconds
        .and_then(|secs| Utc.timestamp_millis_opt((secs * 1000.0) as i64).single())
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "-".to_string())
}

pub fn format_agent_list_text(agents: &[AgentEntry]) -> String {
    let mut out = format!("{}\n\n", format_section_heading("Agents"));
    if agents.is_empty() {
        out.push_str("No agents registered.\n");
        return out;
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Agent", "Tags", "Runs", "Succeeded", "Last run"]);
    for agent in agents {
        let stats = agent.stats();
        table.add_row(vec![
            agent.agent_id.clone(),
            agent.tags.join(", "),
            stats.total_runs.to_string(),
            stats.successful_runs.to_string(),
            format_timestamp(agent.last_run_at),
        ]);
    }
    out.push_str(&format!("{}\n\n", table));
    out.push_str(&format!("Total: {} agent(s)\n", agents.len()));
    out
}

pub fn format_agent_list_json(agents: &[AgentEntry]) -> String {
    let out = json!({ "agents": agents, "total": agents.len() });
    serde_json::to_string_pretty(&out).unwrap_or_else(|_| "{}".to_string())
}

pub fn format_agent_show_text(agent: &AgentEntry) -> String {
    let stats = agent.stats();
    let mut out = format!("{}\n\n", format_section_heading(&agent.agent_id));
    out.push_str(&format!(
        "  Description: {}\n",
        agent.description.as_deref().unwrap_or("-")
    ));
    out.push_str(&format!("  Tags: {}\n", if agent.tags.is_empty() {
        "-".to_string()
    } else {
        agent.tags.join(", ")
    }));
    out.push_str(&format!("  System prompt: {}\n", agent.system_prompt_key));
    out.push_str(&format!("  Registered: {}\n", format_timestamp(Some(agent.created_at))));
    out.push_str(&format!("  Updated: {}\n", format_timestamp(Some(agent.updated_at))));
    out.push_str(&format!(
        "  Runs: {} ({} succeeded)\n",
        stats.total_runs, stats.successful_runs
    ));
    out.push_str(&format!(
        "  Last run: {} {}\n",
        agent.last_run_id.as_deref().unwrap_or("-"),
        format_timestamp(agent.last_run_at)
    ));
    out
}

pub fn format_agent_show_json(agent: &AgentEntry) -> String {
    serde_json::to_string_pretty(agent).unwrap_or_else(|_| "{}".to_string())
}

pub fn format_versions_text(agent_id: &str, versions: &[VersionInfo]) -> String {
    let mut out = format!(
        "{}\n\n",
        format_section_heading(&format!("Prompt versions: {}", agent_id))
    );
    if versions.is_empty() {
        out.push_str("No local versions.\n");
        return out;
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Version", "Created", "Note"]);
    for v in versions {
        table.add_row(vec![
            v.version.clone(),
            format_timestamp(v.created_at),
            v.note.clone().unwrap_or_default(),
        ]);
    }
    out.push_str(&format!("{}\n", table));
    out
}

pub fn format_versions_json(agent_id: &str, versions: &[VersionInfo]) -> String {
    let out = json!({ "agent_id": agent_id, "versions": versions });
    serde_json::to_string_pretty(&out).unwrap_or_else(|_| "{}".to_string())
}

pub fn format_sync_report_text(report: &SyncReport, remote_enabled: bool) -> String {
    if !remote_enabled {
        return "Remote storage is disabled; nothing to sync.".to_string();
    }
    let mut out = format!("{}\n\n", format_section_heading("Sync"));
    out.push_str(&format!("  Metrics uploaded: {}\n", report.metrics_synced));
    out.push_str(&format!("  Prompt versions uploaded: {}\n", report.prompts_synced));
    out.push_str(&format!(
        "  Registry: {}\n",
        if report.registry_synced { "uploaded" } else { "up to date" }
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(None), "-");
        assert_eq!(format_timestamp(Some(0.0)), "1970-01-01 00:00:00 UTC");
    }

    #[test]
    fn test_agent_list_json_shape() {
        let agents = vec![AgentEntry::new("a", 1.0), AgentEntry::new("b", 2.0)];
        let value: serde_json::Value =
            serde_json::from_str(&format_agent_list_json(&agents)).unwrap();
        assert_eq!(value["total"], 2);
        assert_eq!(value["agents"][1]["agent_id"], "b");
    }

    #[test]
    fn test_empty_agent_list_text() {
        assert!(format_agent_list_text(&[]).contains("No agents registered."));
    }
}
