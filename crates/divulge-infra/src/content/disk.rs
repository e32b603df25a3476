//! On-disk content store rooted at a configured directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use uuid::Uuid;

use divulge_core::error::ContentError;
use divulge_core::ports::{ContentStore, validate_key};

/// Content store that keeps one file per key under `root`.
///
/// Writes go to a temporary sibling file which is then renamed over the
/// target, so readers never observe a partially written blob. Each write has
/// its own temporary file; concurrent writes to one key end with one of the
/// complete blobs.
pub struct DiskContentStore {
    root: PathBuf,
}

impl DiskContentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, ContentError> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl ContentStore for DiskContentStore {
    async fn write(&self, key: &str, data: &[u8]) -> Result<(), ContentError> {
        let target = self.path_for(key)?;
        let temp = self.root.join(format!(".{key}.{}.tmp", Uuid::new_v4().simple()));

        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| ContentError::Io(format!("create {}: {e}", self.root.display())))?;

        fs::write(&temp, data)
            .await
            .map_err(|e| ContentError::Io(format!("write {}: {e}", temp.display())))?;

        if let Err(e) = fs::rename(&temp, &target).await {
            let _ = fs::remove_file(&temp).await;
            return Err(ContentError::Io(format!(
                "rename to {}: {e}",
                target.display()
            )));
        }

        tracing::debug!(key = %key, bytes = data.len(), "Content written to disk");
        Ok(())
    }

    async fn read(&self, key: &str) -> Result<Vec<u8>, ContentError> {
        let path = self.path_for(key)?;

        fs::read(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => ContentError::NotFound(key.to_string()),
            _ => ContentError::Io(format!("read {}: {e}", path.display())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_store() -> (DiskContentStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = DiskContentStore::new(temp_dir.path().join("content"));
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let (store, _dir) = setup_store();

        store.write("post.md", b"# Hello").await.unwrap();

        assert_eq!(store.read("post.md").await.unwrap(), b"# Hello");
        assert!(store.root().join("post.md").exists());
    }

    #[tokio::test]
    async fn test_write_overwrites() {
        let (store, _dir) = setup_store();

        store.write("post.md", b"v1").await.unwrap();
        store.write("post.md", b"v2").await.unwrap();

        assert_eq!(store.read("post.md").await.unwrap(), b"v2");
    }

    #[tokio::test]
    async fn test_read_missing() {
        let (store, _dir) = setup_store();

        let err = store.read("missing.md").await.unwrap_err();
        assert!(matches!(err, ContentError::NotFound(key) if key == "missing.md"));
    }

    #[tokio::test]
    async fn test_rejects_traversal_keys() {
        let (store, dir) = setup_store();

        let err = store.write("../escape.md", b"x").await.unwrap_err();
        assert!(matches!(err, ContentError::InvalidKey(_)));
        assert!(!dir.path().join("escape.md").exists());
    }

    #[tokio::test]
    async fn test_concurrent_writes_to_same_key() {
        let (store, _dir) = setup_store();
        let first = vec![b'a'; 1 << 20];
        let second = vec![b'b'; 1 << 20];

        for _ in 0..10 {
            let (a, b) = tokio::join!(
                store.write("race.md", &first),
                store.write("race.md", &second)
            );
            a.unwrap();
            b.unwrap();

            let stored = store.read("race.md").await.unwrap();
            assert!(stored == first || stored == second);
        }
    }

    #[tokio::test]
    async fn test_no_tmp_files_after_write() {
        let (store, _dir) = setup_store();

        store.write("clean.md", b"clean").await.unwrap();

        let tmp_count = std::fs::read_dir(store.root())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.file_name()
                    .to_str()
                    .map(|s| s.ends_with(".tmp"))
                    .unwrap_or(false)
            })
            .count();

        assert_eq!(tmp_count, 0);
    }
}
