use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use divulge_core::domain::Account;
use divulge_core::error::RepoError;
use divulge_core::ports::{AccountRepository, BaseRepository};

/// In-memory account store with soft delete.
pub struct InMemoryAccountRepository {
    accounts: RwLock<HashMap<Uuid, Account>>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryAccountRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseRepository<Account> for InMemoryAccountRepository {
    async fn save(&self, mut account: Account) -> Result<Uuid, RepoError> {
        let mut accounts = self.accounts.write().await;
        let now = Utc::now();

        match account.id {
            Some(id) => {
                let stored = accounts
                    .get_mut(&id)
                    .filter(|a| !a.is_deleted())
                    .ok_or(RepoError::NotFound)?;
                stored.owner_id = account.owner_id;
                stored.name = account.name;
                stored.updated_at = now;
                Ok(id)
            }
            None => {
                let id = Uuid::new_v4();
                account.id = Some(id);
                account.created_at = now;
                account.updated_at = now;
                account.deleted_at = None;
                accounts.insert(id, account);
                Ok(id)
            }
        }
    }

    async fn fetch(&self, id: Uuid) -> Result<Account, RepoError> {
        let accounts = self.accounts.read().await;
        accounts
            .get(&id)
            .filter(|a| !a.is_deleted())
            .cloned()
            .ok_or(RepoError::NotFound)
    }

    async fn remove(&self, id: Uuid) -> Result<(), RepoError> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(&id)
            .filter(|a| !a.is_deleted())
            .ok_or(RepoError::NotFound)?;
        account.deleted_at = Some(Utc::now());
        Ok(())
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn list(&self) -> Result<Vec<Account>, RepoError> {
        let accounts = self.accounts.read().await;
        let mut listed: Vec<Account> = accounts
            .values()
            .filter(|a| !a.is_deleted())
            .cloned()
            .collect();
        listed.sort_by_key(|a| a.created_at);
        Ok(listed)
    }
}
