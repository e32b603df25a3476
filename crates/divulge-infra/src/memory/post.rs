use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use divulge_core::domain::{DEFAULT_CONTENT_EXTENSION, Post, content_path};
use divulge_core::error::RepoError;
use divulge_core::ports::{BaseRepository, PostRepository};

/// In-memory post metadata store. Post content is never kept.
pub struct InMemoryPostRepository {
    posts: RwLock<HashMap<Uuid, Post>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self {
            posts: RwLock::new(HashMap::new()),
        }
    }

    async fn modify<F>(&self, id: Uuid, f: F) -> Result<(), RepoError>
    where
        F: FnOnce(&mut Post) + Send,
    {
        let mut posts = self.posts.write().await;
        let post = posts.get_mut(&id).ok_or(RepoError::NotFound)?;
        f(post);
        Ok(())
    }
}

impl Default for InMemoryPostRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseRepository<Post> for InMemoryPostRepository {
    async fn save(&self, post: Post) -> Result<Uuid, RepoError> {
        let Some(id) = post.id else {
            let id = Uuid::new_v4();
            self.create(id, post).await?;
            return Ok(id);
        };

        self.modify(id, |stored| {
            stored.title = post.title;
            stored.summary = post.summary;
            if let Some(path) = post.content_path {
                stored.content_path = Some(path);
            }
            stored.updated_at = Utc::now();
        })
        .await?;
        Ok(id)
    }

    async fn fetch(&self, id: Uuid) -> Result<Post, RepoError> {
        let posts = self.posts.read().await;
        posts.get(&id).cloned().ok_or(RepoError::NotFound)
    }

    async fn remove(&self, id: Uuid) -> Result<(), RepoError> {
        let mut posts = self.posts.write().await;
        posts.remove(&id).map(|_| ()).ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn create(&self, id: Uuid, mut post: Post) -> Result<(), RepoError> {
        let mut posts = self.posts.write().await;
        if posts.contains_key(&id) {
            return Err(RepoError::Constraint(format!("post {id} already exists")));
        }

        let now = Utc::now();
        post.id = Some(id);
        post.content_path
            .get_or_insert_with(|| content_path(id, DEFAULT_CONTENT_EXTENSION));
        post.content.clear();
        post.created_at = now;
        post.updated_at = now;
        post.published_at = None;
        posts.insert(id, post);
        Ok(())
    }

    async fn list_by_account(&self, account_id: Uuid) -> Result<Vec<Post>, RepoError> {
        let posts = self.posts.read().await;
        let mut listed: Vec<Post> = posts
            .values()
            .filter(|p| p.account_id == account_id)
            .cloned()
            .collect();
        listed.sort_by_key(|p| p.created_at);
        Ok(listed)
    }

    async fn publish(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), RepoError> {
        self.modify(id, |post| {
            post.published_at.get_or_insert(at);
        })
        .await
    }

    async fn redact(&self, id: Uuid) -> Result<(), RepoError> {
        self.modify(id, |post| post.published_at = None).await
    }
}
