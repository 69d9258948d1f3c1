//! Agent Hub: persistence for agent runs
//!
//! Run metrics, versioned system prompts and an agent registry, stored in a
//! remote object store when one is configured and always mirrored under a local
//! root. Remote failures degrade to local storage and are queued for a later
//! `sync`.

pub mod clock;
pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod prompt;
pub mod registry;
pub mod remote;
pub mod session;
pub mod sync_queue;
pub mod tooling;

pub use crate::clock::{Clock, ManualClock, SystemClock};
pub use crate::config::{ConfigLoader, HubConfig};
pub use crate::context::HubContext;
pub use crate::error::{HubError, RemoteError};
pub use crate::metrics::{ExportLocation, MetricCategory, MetricsExporter};
pub use crate::prompt::{PromptFallback, PromptManager, VersionInfo};
pub use crate::registry::{AgentEntry, AgentRegistration, AgentRegistry, RunStats};
pub use crate::remote::{MemoryObjectStore, RemoteObjectStore};
pub use crate::session::{generate_run_id, resolve_session_target, SessionTarget};
