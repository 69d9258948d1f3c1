//! Lazily-initialized process-wide context.
//!
//! Components take a `HubContext` explicitly; this accessor exists for callers
//! that want a single environment-driven instance. `set_context` and `reset`
//! let tests swap it out.

use crate::config::ConfigLoader;
use crate::context::HubContext;
use crate::error::HubError;
use parking_lot::{const_rwlock, RwLock};

static GLOBAL: RwLock<Option<HubContext>> = const_rwlock(None);

/// Return the global context, building it from the environment on first use.
pub fn context() -> Result<HubContext, HubError> {
    if let Some(ctx) = GLOBAL.read().as_ref() {
        return Ok(ctx.clone());
    }

    let mut slot = GLOBAL.write();
    if let Some(ctx) = slot.as_ref() {
        return Ok(ctx.clone());
    }
    let ctx = HubContext::new(ConfigLoader::load()?)?;
    *slot = Some(ctx.clone());
    Ok(ctx)
}

/// Override the global context.
pub fn set_context(ctx: HubContext) {
    *GLOBAL.write() = Some(ctx);
}

/// Drop the cached context so the next `context()` call reloads it.
pub fn reset() {
    *GLOBAL.write() = None;
}
