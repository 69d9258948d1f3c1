//! Pending-sync queue files.
//!
//! A queue is a plain text file with one entry per line. Entries are appended
//! when a remote write fails and replayed by the owning component's sync call.
//! The registry uses a zero-byte sentinel instead.

use crate::error::HubError;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct SyncQueue {
    path: PathBuf,
}

impl SyncQueue {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn push(&self, entry: &str) -> Result<(), HubError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| HubError::io(&self.path, e))?;
        writeln!(file, "{}", entry).map_err(|e| HubError::io(&self.path, e))
    }

    /// Non-blank entries in insertion order; empty when the queue file is absent.
    pub fn entries(&self) -> Result<Vec<String>, HubError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(HubError::io(&self.path, e)),
        };
        Ok(content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Replace the queue with `remaining`, deleting the file when nothing is left.
    pub fn replace(&self, remaining: &[String]) -> Result<(), HubError> {
        if remaining.is_empty() {
            return remove_if_present(&self.path);
        }
        let mut content = remaining.join("\n");
        content.push('\n');
        std::fs::write(&self.path, content).map_err(|e| HubError::io(&self.path, e))
    }
}

/// Zero-byte marker file.
#[derive(Debug, Clone)]
pub struct SyncSentinel {
    path: PathBuf,
}

impl SyncSentinel {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn is_set(&self) -> bool {
        self.path.exists()
    }

    pub fn set(&self) -> Result<(), HubError> {
        OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)
            .map(|_| ())
            .map_err(|e| HubError::io(&self.path, e))
    }

    pub fn clear(&self) -> Result<(), HubError> {
        remove_if_present(&self.path)
    }
}

fn remove_if_present(path: &Path) -> Result<(), HubError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(HubError::io(path, e)),
    }
}
