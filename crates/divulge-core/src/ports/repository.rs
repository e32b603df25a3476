use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Account, Post, User};
use crate::error::RepoError;

/// Generic repository trait for metadata records.
///
/// `save` inserts when the entity has no id (the store assigns one) and
/// updates otherwise. `fetch` returns [`RepoError::NotFound`] for missing and
/// soft-deleted rows.
#[async_trait]
pub trait BaseRepository<T>: Send + Sync {
    /// Save an entity (create or update), returning its id.
    async fn save(&self, entity: T) -> Result<Uuid, RepoError>;

    /// Fetch an entity by its unique id.
    async fn fetch(&self, id: Uuid) -> Result<T, RepoError>;

    /// Remove an entity by its id.
    async fn remove(&self, id: Uuid) -> Result<(), RepoError>;
}

/// Post metadata repository.
///
/// Posts are hard-deleted by `remove`. Only title, summary, `content_path`
/// (when set) and `updated_at` change on `save` of an existing post; publish
/// state is left alone.
#[async_trait]
pub trait PostRepository: BaseRepository<Post> {
    /// Insert a post under an id chosen by the caller.
    async fn create(&self, id: Uuid, post: Post) -> Result<(), RepoError>;

    /// List posts of an account, oldest first. Content is not loaded.
    async fn list_by_account(&self, account_id: Uuid) -> Result<Vec<Post>, RepoError>;

    /// Set `published_at` unless the post is already published.
    async fn publish(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), RepoError>;

    /// Clear `published_at`.
    async fn redact(&self, id: Uuid) -> Result<(), RepoError>;
}

/// Account repository. `remove` is a soft delete.
#[async_trait]
pub trait AccountRepository: BaseRepository<Account> {
    /// List all accounts that are not soft-deleted.
    async fn list(&self) -> Result<Vec<Account>, RepoError>;
}

/// User repository. `remove` is a soft delete.
#[async_trait]
pub trait UserRepository: BaseRepository<User> {
    /// List all users that are not soft-deleted.
    async fn list(&self) -> Result<Vec<User>, RepoError>;

    /// Find a live user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;
}
