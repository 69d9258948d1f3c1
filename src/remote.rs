//! Remote object store seam.
//!
//! Components never talk to a network client directly. They hold an
//! `Arc<dyn RemoteObjectStore>` selected once when the `HubContext` is built.

pub mod contract;
pub mod credentials;
pub mod disabled;
pub mod http;
pub mod memory;

pub use contract::{RemoteObjectStore, CONTENT_TYPE_JSON, CONTENT_TYPE_TEXT};
pub use disabled::DisabledObjectStore;
pub use http::HttpObjectStore;
pub use memory::MemoryObjectStore;

use crate::config::HubConfig;
use crate::error::HubError;
use std::sync::Arc;

/// Pick the store implementation for a configuration.
pub fn store_for(config: &HubConfig) -> Result<Arc<dyn RemoteObjectStore>, HubError> {
    if !config.use_remote {
        return Ok(Arc::new(DisabledObjectStore));
    }
    let store = HttpObjectStore::from_config(config)?;
    Ok(Arc::new(store))
}
