use crate::error::RemoteError;
use crate::remote::RemoteObjectStore;

/// Store used when the remote tier is turned off.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledObjectStore;

impl RemoteObjectStore for DisabledObjectStore {
    fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, RemoteError> {
        Err(RemoteError::Disabled)
    }

    fn put(&self, _key: &str, _body: &[u8], _content_type: &str) -> Result<(), RemoteError> {
        Err(RemoteError::Disabled)
    }

    fn exists(&self, _key: &str) -> Result<bool, RemoteError> {
        Err(RemoteError::Disabled)
    }

    fn is_enabled(&self) -> bool {
        false
    }

    fn describe(&self) -> String {
        "disabled".to_string()
    }
}
