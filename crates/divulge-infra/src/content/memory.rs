//! In-memory content store - used in tests and when no content root is
//! available. Data is lost on process restart.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use divulge_core::error::ContentError;
use divulge_core::ports::{ContentStore, validate_key};

/// In-memory content store using a HashMap behind an async RwLock.
pub struct InMemoryContentStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryContentStore {
    pub fn new() -> Self {
        Self {
            blobs: RwLock::new(HashMap::new()),
        }
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.blobs.read().await.contains_key(key)
    }

    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }
}

impl Default for InMemoryContentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn write(&self, key: &str, data: &[u8]) -> Result<(), ContentError> {
        validate_key(key)?;
        let mut blobs = self.blobs.write().await;
        blobs.insert(key.to_string(), data.to_vec());
        Ok(())
    }

    async fn read(&self, key: &str) -> Result<Vec<u8>, ContentError> {
        validate_key(key)?;
        let blobs = self.blobs.read().await;
        blobs
            .get(key)
            .cloned()
            .ok_or_else(|| ContentError::NotFound(key.to_string()))
    }
}
