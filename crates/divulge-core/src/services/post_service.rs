//! Post coordinator - keeps a post's metadata row and content blob in step.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{DEFAULT_CONTENT_EXTENSION, Post, content_path};
use crate::error::{ContentError, PostError, RepoError};
use crate::ports::{ContentStore, PostRepository};

/// Coordinates the metadata store and the content store for posts.
///
/// Writes go content first, then metadata. Reads go metadata first, then
/// content. No operation retries, caches or rolls back:
///
/// - a failed content write leaves no metadata row behind;
/// - a failed metadata write after a successful content write leaves the blob
///   orphaned, reported through [`PostError::MetadataWriteFailed`];
/// - `remove` deletes the metadata row only, the blob stays in the store.
///
/// Concurrent `save` calls for the same post id are not serialized here. The
/// last metadata write wins and may point at content written by the other
/// call, so callers that need per-post exclusion must provide it.
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    content: Arc<dyn ContentStore>,
    extension: String,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostRepository>, content: Arc<dyn ContentStore>) -> Self {
        Self {
            posts,
            content,
            extension: DEFAULT_CONTENT_EXTENSION.to_string(),
        }
    }

    /// Use a different extension for newly derived content paths.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Save a post and its content, returning the post id.
    ///
    /// A post without an id is inserted under a freshly generated one;
    /// otherwise title and summary of the stored post are updated and its
    /// publish state is left untouched.
    pub async fn save(&self, mut post: Post) -> Result<Uuid, PostError> {
        post.validate()?;

        let (id, is_new) = match post.id {
            Some(id) => (id, false),
            None => (Uuid::new_v4(), true),
        };
        let path = content_path(id, &self.extension);
        post.id = Some(id);
        post.content_path = Some(path.clone());

        self.content
            .write(&path, post.content.as_bytes())
            .await
            .map_err(|source| PostError::ContentWriteFailed {
                id,
                path: path.clone(),
                source,
            })?;

        let (op, result) = if is_new {
            ("insert", self.posts.create(id, post).await)
        } else {
            ("update", self.posts.save(post).await.map(|_| ()))
        };

        if let Err(source) = result {
            if matches!(source, RepoError::NotFound) {
                tracing::warn!(
                    post_id = %id,
                    content_path = %path,
                    "Post to update does not exist, content left orphaned"
                );
            } else {
                tracing::error!(
                    post_id = %id,
                    content_path = %path,
                    error = %source,
                    "Post metadata write failed, content left orphaned"
                );
            }
            return Err(PostError::MetadataWriteFailed {
                op,
                id,
                orphaned_content: Some(path),
                source,
            });
        }

        tracing::debug!(post_id = %id, op, "Post saved");
        Ok(id)
    }

    /// Mark a post as published. Publishing twice keeps the first timestamp.
    pub async fn publish(&self, id: Uuid) -> Result<(), PostError> {
        self.posts
            .publish(id, Utc::now())
            .await
            .map_err(|e| write_error("publish", id, e))?;

        tracing::debug!(post_id = %id, "Post published");
        Ok(())
    }

    /// Return a post to draft. Redacting a draft is a no-op.
    pub async fn redact(&self, id: Uuid) -> Result<(), PostError> {
        self.posts
            .redact(id)
            .await
            .map_err(|e| write_error("redact", id, e))?;

        tracing::debug!(post_id = %id, "Post redacted");
        Ok(())
    }

    /// Fetch a post together with its content.
    pub async fn fetch(&self, id: Uuid) -> Result<Post, PostError> {
        let mut post = self.posts.fetch(id).await.map_err(|e| match e {
            RepoError::NotFound => PostError::NotFound(id),
            source => PostError::MetadataReadFailed {
                op: "fetch",
                id,
                source,
            },
        })?;

        let path = post
            .content_path
            .clone()
            .unwrap_or_else(|| content_path(id, &self.extension));

        let read_failed = |source| PostError::ContentReadFailed {
            id,
            path: path.clone(),
            source,
        };
        let bytes = self.content.read(&path).await.map_err(read_failed)?;
        post.content = String::from_utf8(bytes)
            .map_err(|e| read_failed(ContentError::Corrupt(e.to_string())))?;

        Ok(post)
    }

    /// List an account's posts without their content.
    pub async fn list_by_account(&self, account_id: Uuid) -> Result<Vec<Post>, PostError> {
        self.posts
            .list_by_account(account_id)
            .await
            .map_err(|source| PostError::MetadataReadFailed {
                op: "list",
                id: account_id,
                source,
            })
    }

    /// Delete a post's metadata. Its content blob is not removed.
    pub async fn remove(&self, id: Uuid) -> Result<(), PostError> {
        self.posts.remove(id).await.map_err(|e| match e {
            RepoError::NotFound => PostError::NotFound(id),
            source => PostError::MetadataDeleteFailed { id, source },
        })?;

        tracing::debug!(post_id = %id, "Post removed");
        Ok(())
    }
}

fn write_error(op: &'static str, id: Uuid, err: RepoError) -> PostError {
    match err {
        RepoError::NotFound => PostError::NotFound(id),
        source => PostError::MetadataWriteFailed {
            op,
            id,
            orphaned_content: None,
            source,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PostState;
    use crate::services::mocks::{MockContentStore, MockPostRepository};

    fn service(posts: &Arc<MockPostRepository>, content: &Arc<MockContentStore>) -> PostService {
        PostService::new(posts.clone(), content.clone())
    }

    fn draft(content: &str) -> Post {
        Post::new(Uuid::new_v4(), Uuid::new_v4(), "T", "S", content)
    }

    #[tokio::test]
    async fn test_save_new_post_assigns_id_and_path() {
        let posts = Arc::new(MockPostRepository::default());
        let content = Arc::new(MockContentStore::default());
        let svc = service(&posts, &content);

        let id = svc.save(draft("body")).await.unwrap();

        let stored = posts.get(id).unwrap();
        assert_eq!(stored.id, Some(id));
        assert_eq!(stored.content_path, Some(format!("{id}.md")));
        assert_eq!(content.get(&format!("{id}.md")), Some(b"body".to_vec()));

        let fetched = svc.fetch(id).await.unwrap();
        assert_eq!(fetched.title, "T");
        assert_eq!(fetched.summary, "S");
        assert_eq!(fetched.content, "body");
        assert_eq!(fetched.state(), PostState::Draft);
    }

    #[tokio::test]
    async fn test_save_uses_configured_extension() {
        let posts = Arc::new(MockPostRepository::default());
        let content = Arc::new(MockContentStore::default());
        let svc = service(&posts, &content).with_extension("txt");

        let id = svc.save(draft("body")).await.unwrap();
        assert_eq!(content.get(&format!("{id}.txt")), Some(b"body".to_vec()));
    }

    #[tokio::test]
    async fn test_save_ignores_caller_supplied_content_path() {
        let posts = Arc::new(MockPostRepository::default());
        let content = Arc::new(MockContentStore::default());
        let svc = service(&posts, &content);

        let mut post = draft("body");
        post.content_path = Some("../elsewhere.md".to_string());
        let id = svc.save(post).await.unwrap();

        assert_eq!(posts.get(id).unwrap().content_path, Some(format!("{id}.md")));
        assert_eq!(content.get("../elsewhere.md"), None);
    }

    #[tokio::test]
    async fn test_save_existing_post_updates_in_place() {
        let posts = Arc::new(MockPostRepository::default());
        let content = Arc::new(MockContentStore::default());
        let svc = service(&posts, &content);

        let id = svc.save(draft("v1")).await.unwrap();
        svc.publish(id).await.unwrap();
        let published_at = svc.fetch(id).await.unwrap().published_at;

        let mut update = draft("v2");
        update.id = Some(id);
        update.title = "T2".to_string();
        update.summary = "S2".to_string();
        let same = svc.save(update).await.unwrap();
        assert_eq!(same, id);

        let fetched = svc.fetch(id).await.unwrap();
        assert_eq!(fetched.title, "T2");
        assert_eq!(fetched.summary, "S2");
        assert_eq!(fetched.content, "v2");
        assert_eq!(fetched.published_at, published_at);
        assert_eq!(posts.len(), 1);
    }

    #[tokio::test]
    async fn test_save_rejects_invalid_post_before_any_io() {
        let posts = Arc::new(MockPostRepository::default());
        let content = Arc::new(MockContentStore::default());
        let svc = service(&posts, &content);

        let mut post = draft("body");
        post.title = String::new();
        let err = svc.save(post).await.unwrap_err();

        assert!(matches!(err, PostError::ValidationFailed(_)));
        assert_eq!(content.writes(), 0);
        assert_eq!(posts.writes(), 0);
    }

    #[tokio::test]
    async fn test_content_write_failure_leaves_no_metadata() {
        let posts = Arc::new(MockPostRepository::default());
        let content = Arc::new(MockContentStore::failing_writes());
        let svc = service(&posts, &content);

        let err = svc.save(draft("body")).await.unwrap_err();

        let PostError::ContentWriteFailed { id, .. } = err else {
            panic!("expected ContentWriteFailed, got {err:?}");
        };
        assert_eq!(posts.writes(), 0);
        assert!(svc.fetch(id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_metadata_write_failure_orphans_content() {
        let posts = Arc::new(MockPostRepository::failing_writes());
        let content = Arc::new(MockContentStore::default());
        let svc = service(&posts, &content);

        let err = svc.save(draft("body")).await.unwrap_err();

        let PostError::MetadataWriteFailed {
            id,
            ref orphaned_content,
            ..
        } = err
        else {
            panic!("expected MetadataWriteFailed, got {err:?}");
        };
        let path = format!("{id}.md");
        assert_eq!(orphaned_content.as_deref(), Some(path.as_str()));
        assert_eq!(content.get(&path), Some(b"body".to_vec()));
        assert!(!err.is_client_error());
    }

    #[tokio::test]
    async fn test_update_of_unknown_post_reports_missing_row() {
        let posts = Arc::new(MockPostRepository::default());
        let content = Arc::new(MockContentStore::default());
        let svc = service(&posts, &content);

        let mut post = draft("body");
        let id = Uuid::new_v4();
        post.id = Some(id);
        let err = svc.save(post).await.unwrap_err();

        let path = format!("{id}.md");
        assert!(matches!(
            err,
            PostError::MetadataWriteFailed {
                op: "update",
                source: RepoError::NotFound,
                ..
            }
        ));
        assert_eq!(err.orphaned_content(), Some(path.as_str()));
        assert_eq!(posts.len(), 0);
    }

    #[tokio::test]
    async fn test_update_under_new_extension_moves_content_path() {
        let posts = Arc::new(MockPostRepository::default());
        let content = Arc::new(MockContentStore::default());
        let id = service(&posts, &content).save(draft("first")).await.unwrap();

        let svc = service(&posts, &content).with_extension("txt");
        let mut update = draft("second");
        update.id = Some(id);
        svc.save(update).await.unwrap();

        assert_eq!(posts.get(id).unwrap().content_path, Some(format!("{id}.txt")));
        assert_eq!(svc.fetch(id).await.unwrap().content, "second");
    }

    #[tokio::test]
    async fn test_fetch_missing_post_skips_content_read() {
        let posts = Arc::new(MockPostRepository::default());
        let content = Arc::new(MockContentStore::default());
        let svc = service(&posts, &content);

        let id = Uuid::new_v4();
        let err = svc.fetch(id).await.unwrap_err();

        assert!(matches!(err, PostError::NotFound(missing) if missing == id));
        assert_eq!(content.reads(), 0);
    }

    #[tokio::test]
    async fn test_fetch_content_failure_returns_no_post() {
        let posts = Arc::new(MockPostRepository::default());
        let content = Arc::new(MockContentStore::default());
        let id = service(&posts, &content).save(draft("body")).await.unwrap();

        content.fail_reads();
        let err = service(&posts, &content).fetch(id).await.unwrap_err();
        assert!(matches!(err, PostError::ContentReadFailed { .. }));
    }

    #[tokio::test]
    async fn test_fetch_rejects_non_utf8_content() {
        let posts = Arc::new(MockPostRepository::default());
        let content = Arc::new(MockContentStore::default());
        let svc = service(&posts, &content);
        let id = svc.save(draft("body")).await.unwrap();

        content.put(&format!("{id}.md"), vec![0xff, 0xfe]);
        let err = svc.fetch(id).await.unwrap_err();
        assert!(matches!(
            err,
            PostError::ContentReadFailed {
                source: ContentError::Corrupt(_),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_metadata_read_failure_is_not_not_found() {
        let posts = Arc::new(MockPostRepository::failing_reads());
        let content = Arc::new(MockContentStore::default());
        let svc = service(&posts, &content);

        let err = svc.fetch(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, PostError::MetadataReadFailed { op: "fetch", .. }));
        assert_eq!(content.reads(), 0);
    }

    #[tokio::test]
    async fn test_publish_is_idempotent_and_redact_clears() {
        let posts = Arc::new(MockPostRepository::default());
        let content = Arc::new(MockContentStore::default());
        let svc = service(&posts, &content);
        let id = svc.save(draft("body")).await.unwrap();

        svc.publish(id).await.unwrap();
        let first = svc.fetch(id).await.unwrap().published_at;
        assert!(first.is_some());

        svc.publish(id).await.unwrap();
        assert_eq!(svc.fetch(id).await.unwrap().published_at, first);

        svc.redact(id).await.unwrap();
        let post = svc.fetch(id).await.unwrap();
        assert!(post.published_at.is_none());
        assert_eq!(post.content, "body");

        svc.redact(id).await.unwrap();
        assert_eq!(svc.fetch(id).await.unwrap().state(), PostState::Draft);
    }

    #[tokio::test]
    async fn test_publish_unknown_post_is_not_found() {
        let posts = Arc::new(MockPostRepository::default());
        let content = Arc::new(MockContentStore::default());
        let svc = service(&posts, &content);

        assert!(svc.publish(Uuid::new_v4()).await.unwrap_err().is_not_found());
        assert!(svc.redact(Uuid::new_v4()).await.unwrap_err().is_not_found());
        assert!(svc.remove(Uuid::new_v4()).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_list_by_account_reads_no_content() {
        let posts = Arc::new(MockPostRepository::default());
        let content = Arc::new(MockContentStore::default());
        let svc = service(&posts, &content);

        let account_id = Uuid::new_v4();
        for title in ["a", "b"] {
            let mut post = draft("body");
            post.account_id = account_id;
            post.title = title.to_string();
            svc.save(post).await.unwrap();
        }
        svc.save(draft("other account")).await.unwrap();

        let listed = svc.list_by_account(account_id).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().all(|p| p.content.is_empty()));
        assert_eq!(content.reads(), 0);
    }

    #[tokio::test]
    async fn test_remove_keeps_content_blob() {
        let posts = Arc::new(MockPostRepository::default());
        let content = Arc::new(MockContentStore::default());
        let svc = service(&posts, &content);
        let id = svc.save(draft("body")).await.unwrap();

        svc.remove(id).await.unwrap();

        assert!(svc.fetch(id).await.unwrap_err().is_not_found());
        assert_eq!(content.get(&format!("{id}.md")), Some(b"body".to_vec()));
    }

    #[tokio::test]
    async fn test_remove_failure_maps_to_delete_error() {
        let posts = Arc::new(MockPostRepository::failing_writes());
        let content = Arc::new(MockContentStore::default());
        let svc = service(&posts, &content);

        let err = svc.remove(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, PostError::MetadataDeleteFailed { .. }));
    }
}
