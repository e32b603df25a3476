//! Content store port - key-addressed blob storage for post bodies.

use async_trait::async_trait;

use crate::error::ContentError;

/// Content store trait - abstraction over blob backends (disk, in-memory).
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Write a blob, replacing anything already stored under `key`.
    async fn write(&self, key: &str, data: &[u8]) -> Result<(), ContentError>;

    /// Read a blob. Fails with [`ContentError::NotFound`] if `key` is absent.
    async fn read(&self, key: &str) -> Result<Vec<u8>, ContentError>;
}

/// Reject keys that could escape the store root.
///
/// A key must be a single, non-hidden path segment.
pub fn validate_key(key: &str) -> Result<(), ContentError> {
    let invalid = key.is_empty()
        || key.starts_with('.')
        || key.contains(['/', '\\', '\0'])
        || key.contains("..");

    if invalid {
        return Err(ContentError::InvalidKey(key.to_string()));
    }
    Ok(())
}
