//! Metrics Export
//!
//! Accumulates timing and stats for one run and exports them as a JSON
//! document. The local copy is always written; the remote copy is attempted
//! first when enabled and queued for a later `sync_pending` when it fails.

mod agent_result;
pub mod record;

pub use record::{MetricCategory, MetricsRecord};

use crate::context::HubContext;
use crate::error::HubError;
use crate::remote::CONTENT_TYPE_JSON;
use crate::sync_queue::SyncQueue;
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Where an export landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportLocation {
    Remote(String),
    Local(PathBuf),
}

impl fmt::Display for ExportLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportLocation::Remote(key) => write!(f, "remote:{}", key),
            ExportLocation::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Exporter for one agent run.
///
/// ```no_run
/// # use agent_hub::{HubConfig, HubContext, MetricsExporter};
/// # let ctx = HubContext::new(HubConfig::local("./.agent_hub")).unwrap();
/// let mut exporter = MetricsExporter::new(ctx, "job-enricher", "job-enricher_20241215", None);
/// exporter.set_stats("total_jobs", 100);
/// exporter.set_timing("fetch", 1.25);
/// let location = exporter.export().unwrap();
/// ```
pub struct MetricsExporter {
    ctx: HubContext,
    record: MetricsRecord,
    local_path: Option<PathBuf>,
    exported: bool,
}

impl MetricsExporter {
    pub fn new(
        ctx: HubContext,
        agent_id: impl Into<String>,
        run_id: impl Into<String>,
        prompt_version: Option<&str>,
    ) -> Self {
        let started_at = ctx.clock().now();
        let record = MetricsRecord::new(
            agent_id.into(),
            run_id.into(),
            prompt_version.map(str::to_string),
            started_at,
        );
        Self {
            ctx,
            record,
            local_path: None,
            exported: false,
        }
    }

    /// Set a metric; last write wins per key.
    pub fn set(&mut self, key: &str, value: impl Into<Value>, category: MetricCategory) {
        self.record
            .category_mut(category)
            .insert(key.to_string(), value.into());
    }

    /// Set a timing metric in seconds.
    pub fn set_timing(&mut self, key: &str, seconds: f64) {
        self.set(key, seconds, MetricCategory::Timing);
    }

    pub fn set_stats(&mut self, key: &str, value: impl Into<Value>) {
        self.set(key, value, MetricCategory::Stats);
    }

    /// Pull token usage, latency and per-tool counts out of an agent result.
    pub fn set_from_agent_result(&mut self, result: &Value) {
        agent_result::apply(&mut self.record, result);
    }

    pub fn record(&self) -> &MetricsRecord {
        &self.record
    }

    pub fn is_exported(&self) -> bool {
        self.exported
    }

    /// Local file written by the last export.
    pub fn local_path(&self) -> Option<&Path> {
        self.local_path.as_deref()
    }

    /// Finalize the record and persist it.
    ///
    /// Returns the remote key when the remote write succeeded, otherwise the
    /// local path. Exporting again overwrites the same run key.
    pub fn export(&mut self) -> Result<ExportLocation, HubError> {
        let completed_at = self.ctx.clock().now();
        self.record.finish(completed_at);

        let body = serde_json::to_vec_pretty(&self.record)?;
        let date = completed_at.format("%Y-%m-%d").to_string();
        let file_name = format!("{}.json", self.record.run_id);
        let config = self.ctx.config();

        let mut remote_key = None;
        if let Some(remote) = self.ctx.remote() {
            let key = config.key(&config.metrics_prefix, &[&date, &file_name]);
            match remote.put(&key, &body, CONTENT_TYPE_JSON) {
                Ok(()) => {
                    debug!(run_id = %self.record.run_id, key = %key, "Exported metrics to remote");
                    remote_key = Some(key);
                }
                Err(e) => {
                    warn!(
                        run_id = %self.record.run_id,
                        "Remote metrics export failed ({}), saving locally",
                        e
                    );
                }
            }
        }

        let date_dir = config.local_metrics_dir().join(&date);
        std::fs::create_dir_all(&date_dir).map_err(|e| HubError::io(&date_dir, e))?;
        let local_path = date_dir.join(&file_name);
        std::fs::write(&local_path, &body).map_err(|e| HubError::io(&local_path, e))?;
        self.local_path = Some(local_path.clone());
        self.exported = true;

        if let Some(key) = remote_key {
            return Ok(ExportLocation::Remote(key));
        }

        if self.ctx.remote_enabled() {
            SyncQueue::new(config.metrics_sync_queue_path())
                .push(&local_path.to_string_lossy())?;
        }
        Ok(ExportLocation::Local(local_path))
    }

    /// Retry remote uploads for every queued local metrics file.
    ///
    /// Missing files are dropped from the queue; failed uploads stay queued.
    /// Returns the number of files synced.
    pub fn sync_pending(ctx: &HubContext) -> Result<usize, HubError> {
        let config = ctx.config();
        let queue = SyncQueue::new(config.metrics_sync_queue_path());
        if !queue.exists() {
            return Ok(0);
        }
        let Some(remote) = ctx.remote() else {
            return Ok(0);
        };

        let mut synced = 0;
        let mut remaining = Vec::new();
        for entry in queue.entries()? {
            let path = PathBuf::from(&entry);
            if !path.exists() {
                continue;
            }
            match upload_local_metrics(ctx, remote, &path) {
                Ok(key) => {
                    debug!(key = %key, "Synced queued metrics");
                    synced += 1;
                }
                Err(e) => {
                    warn!("Failed to sync {}: {}", path.display(), e);
                    remaining.push(entry);
                }
            }
        }
        queue.replace(&remaining)?;

        if synced > 0 {
            info!(synced, remaining = remaining.len(), "Metrics sync complete");
        }
        Ok(synced)
    }
}

fn upload_local_metrics(
    ctx: &HubContext,
    remote: &dyn crate::remote::RemoteObjectStore,
    path: &Path,
) -> Result<String, HubError> {
    let content = std::fs::read(path).map_err(|e| HubError::io(path, e))?;
    let document: Value = serde_json::from_slice(&content)?;

    let date = path
        .parent()
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str())
        .ok_or_else(|| HubError::NotFound(format!("date folder for {}", path.display())))?;
    let run_id = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| HubError::NotFound(format!("run id for {}", path.display())))?;

    let config = ctx.config();
    let key = config.key(&config.metrics_prefix, &[date, &format!("{}.json", run_id)]);
    let body = serde_json::to_vec_pretty(&document)?;
    remote.put(&key, &body, CONTENT_TYPE_JSON)?;
    Ok(key)
}
