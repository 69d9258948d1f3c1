use crate::error::RemoteError;

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_TEXT: &str = "text/plain";

/// Minimal object store used as the remote tier.
///
/// A missing object is `Ok(None)` / `Ok(false)`. Errors are reserved for
/// failures the caller should fall back from.
pub trait RemoteObjectStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, RemoteError>;

    fn put(&self, key: &str, body: &[u8], content_type: &str) -> Result<(), RemoteError>;

    fn exists(&self, key: &str) -> Result<bool, RemoteError> {
        Ok(self.get(key)?.is_some())
    }

    /// False for the disabled store; components skip the remote tier entirely then.
    fn is_enabled(&self) -> bool {
        true
    }

    /// Short human-readable location, used in log lines.
    fn describe(&self) -> String;

    /// Fetch an object as UTF-8 text.
    fn get_text(&self, key: &str) -> Result<Option<String>, RemoteError> {
        match self.get(key)? {
            Some(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|e| RemoteError::Transport(format!("{} is not valid UTF-8: {}", key, e))),
            None => Ok(None),
        }
    }

    fn put_text(&self, key: &str, content: &str) -> Result<(), RemoteError> {
        self.put(key, content.as_bytes(), CONTENT_TYPE_TEXT)
    }
}
