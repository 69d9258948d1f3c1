//! Local "current" prompt cache with a TTL sidecar.

use crate::error::HubError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CURRENT_FILE: &str = "current.txt";
const CURRENT_META_FILE: &str = "current_cache_meta.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheMeta {
    /// Epoch seconds
    pub cached_at: f64,
    /// BLAKE3 hex digest of the cached content
    pub content_hash: String,
}

pub fn content_hash(content: &str) -> String {
    blake3::hash(content.as_bytes()).to_hex().to_string()
}

/// The `current.txt` file and its metadata sidecar. Always written together.
#[derive(Debug, Clone)]
pub struct CurrentCache {
    file: PathBuf,
    meta: PathBuf,
}

impl CurrentCache {
    pub fn new(dir: &Path) -> Self {
        Self {
            file: dir.join(CURRENT_FILE),
            meta: dir.join(CURRENT_META_FILE),
        }
    }

    pub fn exists(&self) -> bool {
        self.file.exists()
    }

    /// Read the cached prompt.
    ///
    /// Returns `None` when nothing is cached, or when the entry is older than
    /// `ttl_seconds` and `ignore_ttl` is false. A missing sidecar counts as fresh.
    pub fn read(
        &self,
        now: f64,
        ttl_seconds: u64,
        ignore_ttl: bool,
    ) -> Result<Option<String>, HubError> {
        if !self.file.exists() {
            return Ok(None);
        }

        if !ignore_ttl {
            if let Some(meta) = self.read_meta()? {
                if now - meta.cached_at > ttl_seconds as f64 {
                    return Ok(None);
                }
            }
        }

        std::fs::read_to_string(&self.file)
            .map(Some)
            .map_err(|e| HubError::io(&self.file, e))
    }

    pub fn read_meta(&self) -> Result<Option<CacheMeta>, HubError> {
        if !self.meta.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(&self.meta).map_err(|e| HubError::io(&self.meta, e))?;
        Ok(Some(serde_json::from_str(&raw)?))
    }

    pub fn write(&self, content: &str, now: f64) -> Result<(), HubError> {
        std::fs::write(&self.file, content).map_err(|e| HubError::io(&self.file, e))?;
        let meta = CacheMeta {
            cached_at: now,
            content_hash: content_hash(content),
        };
        let raw = serde_json::to_string(&meta)?;
        std::fs::write(&self.meta, raw).map_err(|e| HubError::io(&self.meta, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_fresh_and_expired_reads() {
        let temp = TempDir::new().unwrap();
        let cache = CurrentCache::new(temp.path());
        assert_eq!(cache.read(0.0, 60, false).unwrap(), None);

        cache.write("prompt", 1000.0).unwrap();
        assert_eq!(cache.read(1030.0, 60, false).unwrap().as_deref(), Some("prompt"));
        assert_eq!(cache.read(1061.0, 60, false).unwrap(), None);
        assert_eq!(cache.read(1061.0, 60, true).unwrap().as_deref(), Some("prompt"));
    }

    #[test]
    fn test_sidecar_written_with_hash() {
        let temp = TempDir::new().unwrap();
        let cache = CurrentCache::new(temp.path());
        cache.write("prompt", 5.0).unwrap();

        let meta = cache.read_meta().unwrap().unwrap();
        assert_eq!(meta.cached_at, 5.0);
        assert_eq!(meta.content_hash, content_hash("prompt"));
        assert_eq!(meta.content_hash.len(), 64);
    }

    #[test]
    fn test_missing_sidecar_is_fresh() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("current.txt"), "bare").unwrap();
        let cache = CurrentCache::new(temp.path());
        assert_eq!(cache.read(1e12, 1, false).unwrap().as_deref(), Some("bare"));
    }
}
