use agent_hub::{HubConfig, HubContext, ManualClock, MemoryObjectStore};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// A hub rooted in a temp dir, with an in-memory remote and a manual clock.
pub struct TestHub {
    pub temp: TempDir,
    pub store: Arc<MemoryObjectStore>,
    pub clock: Arc<ManualClock>,
    pub ctx: HubContext,
}

impl TestHub {
    pub fn local() -> Self {
        let temp = TempDir::new().unwrap();
        let clock = Arc::new(ManualClock::starting_now());
        let ctx = HubContext::new(HubConfig::local(temp.path()))
            .unwrap()
            .with_clock(clock.clone());
        Self {
            temp,
            store: Arc::new(MemoryObjectStore::new()),
            clock,
            ctx,
        }
    }

    pub fn remote() -> Self {
        let temp = TempDir::new().unwrap();
        let store = Arc::new(MemoryObjectStore::new());
        let clock = Arc::new(ManualClock::starting_now());
        let ctx = remote_context(temp.path(), store.clone()).with_clock(clock.clone());
        Self {
            temp,
            store,
            clock,
            ctx,
        }
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }
}

/// A remote-enabled context over `store` with its local mirror at `root`.
pub fn remote_context(root: &Path, store: Arc<MemoryObjectStore>) -> HubContext {
    HubContext::with_remote(HubConfig::remote("test-bucket", root), store).unwrap()
}
