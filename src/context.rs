//! HubContext: the configuration, remote store and clock shared by all components.

use crate::clock::{Clock, SystemClock};
use crate::config::HubConfig;
use crate::error::HubError;
use crate::remote::{self, RemoteObjectStore};
use std::sync::Arc;

/// Cheap-to-clone handle passed to every component constructor.
#[derive(Clone)]
pub struct HubContext {
    config: Arc<HubConfig>,
    remote: Arc<dyn RemoteObjectStore>,
    clock: Arc<dyn Clock>,
}

impl HubContext {
    /// Validate the config, create the local layout and select the remote store.
    pub fn new(config: HubConfig) -> Result<Self, HubError> {
        let config = config.with_absolute_root()?;
        config.prepare()?;
        let remote = remote::store_for(&config)?;
        Ok(Self {
            config: Arc::new(config),
            remote,
            clock: Arc::new(SystemClock),
        })
    }

    /// Build a context around an explicit remote store.
    pub fn with_remote(
        config: HubConfig,
        remote: Arc<dyn RemoteObjectStore>,
    ) -> Result<Self, HubError> {
        let config = config.with_absolute_root()?;
        config.prepare()?;
        Ok(Self {
            config: Arc::new(config),
            remote,
            clock: Arc::new(SystemClock),
        })
    }

    /// Replace the clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// The remote store, or `None` when the remote tier is off.
    pub fn remote(&self) -> Option<&dyn RemoteObjectStore> {
        if self.remote_enabled() {
            Some(self.remote.as_ref())
        } else {
            None
        }
    }

    pub fn remote_enabled(&self) -> bool {
        self.config.use_remote && self.remote.is_enabled()
    }
}

impl std::fmt::Debug for HubContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HubContext")
            .field("local_dir", &self.config.local_dir)
            .field("remote", &self.remote.describe())
            .field("remote_enabled", &self.remote_enabled())
            .finish()
    }
}
