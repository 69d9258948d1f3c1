//! Run ids and session storage targets.
//!
//! Transcripts themselves are written by the agent framework's session manager;
//! this module only decides where they go.

use crate::clock::Clock;
use crate::context::HubContext;
use serde::Serialize;
use std::path::PathBuf;
use tracing::warn;

/// `<agent_id>_<YYYYMMDD_HHMMSS>` in UTC.
pub fn generate_run_id(agent_id: &str, clock: &dyn Clock) -> String {
    format!("{}_{}", agent_id, clock.now().format("%Y%m%d_%H%M%S"))
}

/// Where a session manager should persist a run's transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionTarget {
    Remote {
        bucket: String,
        prefix: String,
        region: String,
        session_id: String,
    },
    Local {
        storage_dir: PathBuf,
        session_id: String,
    },
}

impl SessionTarget {
    pub fn session_id(&self) -> &str {
        match self {
            SessionTarget::Remote { session_id, .. } | SessionTarget::Local { session_id, .. } => {
                session_id
            }
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, SessionTarget::Remote { .. })
    }
}

/// Pick the session target for a run.
///
/// `use_remote` overrides the configured flag. Asking for remote storage
/// without a bucket falls back to the local sessions directory.
pub fn resolve_session_target(
    ctx: &HubContext,
    agent_id: &str,
    run_id: Option<&str>,
    use_remote: Option<bool>,
) -> SessionTarget {
    let config = ctx.config();
    let session_id = run_id
        .map(str::to_string)
        .unwrap_or_else(|| generate_run_id(agent_id, ctx.clock()));

    if use_remote.unwrap_or(config.use_remote) {
        if !config.bucket.is_empty() {
            return SessionTarget::Remote {
                bucket: config.bucket.clone(),
                prefix: config.sessions_prefix.clone(),
                region: config.region.clone(),
                session_id,
            };
        }
        warn!(agent_id, "Remote sessions requested without a bucket, using local storage");
    }

    SessionTarget::Local {
        storage_dir: config.local_sessions_dir(),
        session_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::HubConfig;
    use crate::remote::MemoryObjectStore;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn fixed_clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 12, 15, 10, 15, 0).unwrap(),
        ))
    }

    #[test]
    fn test_generate_run_id_format() {
        let clock = fixed_clock();
        assert_eq!(
            generate_run_id("job-enricher", clock.as_ref()),
            "job-enricher_20241215_101500"
        );
    }

    #[test]
    fn test_local_target_by_default() {
        let temp = TempDir::new().unwrap();
        let ctx = HubContext::new(HubConfig::local(temp.path()))
            .unwrap()
            .with_clock(fixed_clock());

        let target = resolve_session_target(&ctx, "agent", None, None);
        assert_eq!(
            target,
            SessionTarget::Local {
                storage_dir: temp.path().join("sessions"),
                session_id: "agent_20241215_101500".to_string(),
            }
        );
    }

    #[test]
    fn test_remote_target_uses_config() {
        let temp = TempDir::new().unwrap();
        let ctx = HubContext::with_remote(
            HubConfig::remote("agent-bucket", temp.path()),
            Arc::new(MemoryObjectStore::new()),
        )
        .unwrap();

        let target = resolve_session_target(&ctx, "agent", Some("run-1"), None);
        assert!(target.is_remote());
        assert_eq!(target.session_id(), "run-1");
        if let SessionTarget::Remote { bucket, prefix, .. } = target {
            assert_eq!(bucket, "agent-bucket");
            assert_eq!(prefix, "sessions");
        }

        let forced = resolve_session_target(&ctx, "agent", Some("run-1"), Some(false));
        assert!(!forced.is_remote());
    }

    #[test]
    fn test_remote_override_without_bucket_falls_back() {
        let temp = TempDir::new().unwrap();
        let ctx = HubContext::new(HubConfig::local(temp.path())).unwrap();
        let target = resolve_session_target(&ctx, "agent", Some("run-1"), Some(true));
        assert!(!target.is_remote());
    }
}
