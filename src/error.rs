//! Error types for the hub.
//!
//! Remote failures are a separate type because callers almost always recover
//! from them locally; `HubError` is what surfaces to users.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from the remote object store.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("remote storage is disabled")]
    Disabled,

    #[error("remote returned status {status} for {key}")]
    Status { key: String, status: u16 },

    #[error("remote transport error: {0}")]
    Transport(String),

    #[error("remote unavailable: {0}")]
    Unavailable(String),
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        RemoteError::Transport(err.to_string())
    }
}

/// Errors surfaced by hub components.
#[derive(Debug, Error)]
pub enum HubError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Remote(#[from] RemoteError),
}

impl HubError {
    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        HubError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, HubError::NotFound(_))
    }
}

impl From<config::ConfigError> for HubError {
    fn from(err: config::ConfigError) -> Self {
        HubError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_names_path() {
        let err = HubError::io(
            "/tmp/missing.json",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        let msg = err.to_string();
        assert!(msg.contains("/tmp/missing.json"));
        assert!(msg.contains("gone"));
    }

    #[test]
    fn test_remote_error_converts() {
        let err: HubError = RemoteError::Unavailable("offline".to_string()).into();
        assert!(matches!(err, HubError::Remote(_)));
        assert!(!err.is_not_found());
    }
}
