//! Test doubles for the coordinator: in-memory stores with switchable
//! failures and call counters.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::Post;
use crate::error::{ContentError, RepoError};
use crate::ports::{BaseRepository, ContentStore, PostRepository};

#[derive(Default)]
pub struct MockPostRepository {
    posts: Mutex<HashMap<Uuid, Post>>,
    fail_writes: bool,
    fail_reads: bool,
    writes: AtomicUsize,
}

impl MockPostRepository {
    pub fn failing_writes() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    pub fn failing_reads() -> Self {
        Self {
            fail_reads: true,
            ..Self::default()
        }
    }

    pub fn get(&self, id: Uuid) -> Option<Post> {
        self.posts.lock().unwrap().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.posts.lock().unwrap().len()
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn write(&self) -> Result<(), RepoError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes {
            return Err(RepoError::Query("forced".to_string()));
        }
        Ok(())
    }

    fn read(&self) -> Result<(), RepoError> {
        if self.fail_reads {
            return Err(RepoError::Connection("forced".to_string()));
        }
        Ok(())
    }

    fn update<F: FnOnce(&mut Post)>(&self, id: Uuid, f: F) -> Result<(), RepoError> {
        self.write()?;
        let mut posts = self.posts.lock().unwrap();
        let post = posts.get_mut(&id).ok_or(RepoError::NotFound)?;
        f(post);
        Ok(())
    }
}

#[async_trait]
impl BaseRepository<Post> for MockPostRepository {
    async fn save(&self, post: Post) -> Result<Uuid, RepoError> {
        let id = post.id.ok_or(RepoError::NotFound)?;
        self.update(id, |stored| {
            stored.title = post.title;
            stored.summary = post.summary;
            if post.content_path.is_some() {
                stored.content_path = post.content_path;
            }
            stored.updated_at = Utc::now();
        })?;
        Ok(id)
    }

    async fn fetch(&self, id: Uuid) -> Result<Post, RepoError> {
        self.read()?;
        self.get(id).ok_or(RepoError::NotFound)
    }

    async fn remove(&self, id: Uuid) -> Result<(), RepoError> {
        self.write()?;
        self.posts
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl PostRepository for MockPostRepository {
    async fn create(&self, id: Uuid, mut post: Post) -> Result<(), RepoError> {
        self.write()?;
        post.id = Some(id);
        post.content.clear();
        post.published_at = None;
        self.posts.lock().unwrap().insert(id, post);
        Ok(())
    }

    async fn list_by_account(&self, account_id: Uuid) -> Result<Vec<Post>, RepoError> {
        self.read()?;
        Ok(self
            .posts
            .lock()
            .unwrap()
            .values()
            .filter(|p| p.account_id == account_id)
            .cloned()
            .collect())
    }

    async fn publish(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), RepoError> {
        self.update(id, |post| {
            post.published_at.get_or_insert(at);
        })
    }

    async fn redact(&self, id: Uuid) -> Result<(), RepoError> {
        self.update(id, |post| post.published_at = None)
    }
}

#[derive(Default)]
pub struct MockContentStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
    fail_writes: bool,
    fail_reads: AtomicBool,
    writes: AtomicUsize,
    reads: AtomicUsize,
}

impl MockContentStore {
    pub fn failing_writes() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    pub fn fail_reads(&self) {
        self.fail_reads.store(true, Ordering::SeqCst);
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.blobs.lock().unwrap().get(key).cloned()
    }

    pub fn put(&self, key: &str, data: Vec<u8>) {
        self.blobs.lock().unwrap().insert(key.to_string(), data);
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentStore for MockContentStore {
    async fn write(&self, key: &str, data: &[u8]) -> Result<(), ContentError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes {
            return Err(ContentError::Io("forced".to_string()));
        }
        self.put(key, data.to_vec());
        Ok(())
    }

    async fn read(&self, key: &str) -> Result<Vec<u8>, ContentError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(ContentError::Io("forced".to_string()));
        }
        self.get(key)
            .ok_or_else(|| ContentError::NotFound(key.to_string()))
    }
}
