use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use divulge_core::domain::User;
use divulge_core::error::RepoError;
use divulge_core::ports::{BaseRepository, UserRepository};

/// In-memory user store with soft delete and unique emails.
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn email_taken(users: &HashMap<Uuid, User>, email: &str, except: Option<Uuid>) -> bool {
    users
        .values()
        .any(|u| u.email == email && u.id != except)
}

#[async_trait]
impl BaseRepository<User> for InMemoryUserRepository {
    async fn save(&self, mut user: User) -> Result<Uuid, RepoError> {
        let mut users = self.users.write().await;
        if email_taken(&users, &user.email, user.id) {
            return Err(RepoError::Constraint("email already registered".to_string()));
        }
        let now = Utc::now();

        match user.id {
            Some(id) => {
                let stored = users
                    .get_mut(&id)
                    .filter(|u| !u.is_deleted())
                    .ok_or(RepoError::NotFound)?;
                stored.name = user.name;
                stored.email = user.email;
                stored.accounts = user.accounts;
                stored.updated_at = now;
                Ok(id)
            }
            None => {
                let id = Uuid::new_v4();
                user.id = Some(id);
                user.created_at = now;
                user.updated_at = now;
                user.deleted_at = None;
                users.insert(id, user);
                Ok(id)
            }
        }
    }

    async fn fetch(&self, id: Uuid) -> Result<User, RepoError> {
        let users = self.users.read().await;
        users
            .get(&id)
            .filter(|u| !u.is_deleted())
            .cloned()
            .ok_or(RepoError::NotFound)
    }

    async fn remove(&self, id: Uuid) -> Result<(), RepoError> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(&id)
            .filter(|u| !u.is_deleted())
            .ok_or(RepoError::NotFound)?;
        user.deleted_at = Some(Utc::now());
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn list(&self) -> Result<Vec<User>, RepoError> {
        let users = self.users.read().await;
        let mut listed: Vec<User> = users
            .values()
            .filter(|u| !u.is_deleted())
            .cloned()
            .collect();
        listed.sort_by_key(|u| u.created_at);
        Ok(listed)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.email == email && !u.is_deleted())
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_with_memberships() {
        let repo = InMemoryUserRepository::new();
        let account_id = Uuid::new_v4();
        let id = repo
            .save(User::new("Ada", "ada@example.com").with_accounts(vec![account_id]))
            .await
            .unwrap();

        let user = repo.fetch(id).await.unwrap();
        assert_eq!(user.accounts, vec![account_id]);

        let found = repo.find_by_email("ada@example.com").await.unwrap();
        assert_eq!(found.and_then(|u| u.id), Some(id));
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let repo = InMemoryUserRepository::new();
        repo.save(User::new("Ada", "ada@example.com")).await.unwrap();

        let err = repo
            .save(User::new("Other", "ada@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Constraint(_)));
    }

    #[tokio::test]
    async fn test_soft_deleted_user_is_hidden() {
        let repo = InMemoryUserRepository::new();
        let id = repo.save(User::new("Ada", "ada@example.com")).await.unwrap();

        repo.remove(id).await.unwrap();

        assert!(matches!(repo.fetch(id).await, Err(RepoError::NotFound)));
        assert!(repo.list().await.unwrap().is_empty());
        assert!(
            repo.find_by_email("ada@example.com")
                .await
                .unwrap()
                .is_none()
        );
    }
}
