//! In-memory object store.
//!
//! Backs tests and offline runs. Reads and writes can be made to fail
//! independently to exercise the local fallback paths.

use crate::error::RemoteError;
use crate::remote::RemoteObjectStore;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

#[derive(Debug, Clone)]
struct StoredObject {
    body: Vec<u8>,
    content_type: String,
}

#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: RwLock<BTreeMap<String, StoredObject>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    puts: AtomicUsize,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Fail both reads and writes.
    pub fn set_offline(&self, offline: bool) {
        self.set_fail_reads(offline);
        self.set_fail_writes(offline);
    }

    /// Insert an object directly, bypassing failure injection.
    pub fn insert(&self, key: &str, body: impl Into<Vec<u8>>) {
        self.objects.write().insert(
            key.to_string(),
            StoredObject {
                body: body.into(),
                content_type: "application/octet-stream".to_string(),
            },
        );
    }

    /// Read an object directly, bypassing failure injection.
    pub fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.read().get(key).map(|o| o.body.clone())
    }

    pub fn text(&self, key: &str) -> Option<String> {
        self.object(key)
            .and_then(|bytes| String::from_utf8(bytes).ok())
    }

    pub fn content_type(&self, key: &str) -> Option<String> {
        self.objects.read().get(key).map(|o| o.content_type.clone())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.read().contains_key(key)
    }

    /// Number of successful writes so far.
    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }
}

impl RemoteObjectStore for MemoryObjectStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, RemoteError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(RemoteError::Unavailable(format!("read of {} refused", key)));
        }
        Ok(self.object(key))
    }

    fn put(&self, key: &str, body: &[u8], content_type: &str) -> Result<(), RemoteError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RemoteError::Unavailable(format!("write of {} refused", key)));
        }
        self.objects.write().insert(
            key.to_string(),
            StoredObject {
                body: body.to_vec(),
                content_type: content_type.to_string(),
            },
        );
        self.puts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
