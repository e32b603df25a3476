//! PostgreSQL repository implementations.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use divulge_core::domain::{Account, DEFAULT_CONTENT_EXTENSION, Post, User, content_path};
use divulge_core::error::RepoError;
use divulge_core::ports::{AccountRepository, BaseRepository, PostRepository, UserRepository};

use super::entity::account::{self, Entity as AccountEntity};
use super::entity::membership::{self, Entity as MembershipEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, db_err, now};

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL account repository.
pub type PostgresAccountRepository = PostgresBaseRepository<AccountEntity>;

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

#[async_trait]
impl BaseRepository<Post> for PostgresPostRepository {
    async fn save(&self, post: Post) -> Result<Uuid, RepoError> {
        let Some(id) = post.id else {
            let id = Uuid::new_v4();
            self.create(id, post).await?;
            return Ok(id);
        };

        let txn = self.begin().await?;
        let model = PostEntity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or(RepoError::NotFound)?;

        let mut active = model.into_active_model();
        active.title = Set(post.title);
        active.summary = Set(post.summary);
        if let Some(path) = post.content_path {
            active.content_path = Set(path);
        }
        active.updated_at = Set(now());
        active.update(&txn).await.map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        tracing::debug!(post_id = %id, "Post metadata updated");
        Ok(id)
    }

    async fn fetch(&self, id: Uuid) -> Result<Post, RepoError> {
        PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(Into::into)
            .ok_or(RepoError::NotFound)
    }

    async fn remove(&self, id: Uuid) -> Result<(), RepoError> {
        let txn = self.begin().await?;
        let result = PostEntity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        txn.commit().await.map_err(db_err)?;
        tracing::debug!(post_id = %id, "Post metadata deleted");
        Ok(())
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create(&self, id: Uuid, post: Post) -> Result<(), RepoError> {
        let path = post
            .content_path
            .clone()
            .unwrap_or_else(|| content_path(id, DEFAULT_CONTENT_EXTENSION));
        let active = post::ActiveModel::for_insert(id, post, path, now());

        let txn = self.begin().await?;
        PostEntity::insert(active)
            .exec_without_returning(&txn)
            .await
            .map_err(db_err)?;
        txn.commit().await.map_err(db_err)?;

        tracing::debug!(post_id = %id, "Post metadata inserted");
        Ok(())
    }

    async fn list_by_account(&self, account_id: Uuid) -> Result<Vec<Post>, RepoError> {
        let result = PostEntity::find()
            .filter(post::Column::AccountId.eq(account_id))
            .order_by_asc(post::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn publish(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), RepoError> {
        let txn = self.begin().await?;
        let model = PostEntity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or(RepoError::NotFound)?;

        if model.published_at.is_none() {
            let mut active = model.into_active_model();
            active.published_at = Set(Some(at.into()));
            active.update(&txn).await.map_err(db_err)?;
        }

        txn.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn redact(&self, id: Uuid) -> Result<(), RepoError> {
        let txn = self.begin().await?;
        let model = PostEntity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or(RepoError::NotFound)?;

        if model.published_at.is_some() {
            let mut active = model.into_active_model();
            active.published_at = Set(None);
            active.update(&txn).await.map_err(db_err)?;
        }

        txn.commit().await.map_err(db_err)?;
        Ok(())
    }
}

impl PostgresAccountRepository {
    fn find_live(id: Uuid) -> sea_orm::Select<AccountEntity> {
        AccountEntity::find_by_id(id).filter(account::Column::DeletedAt.is_null())
    }
}

#[async_trait]
impl BaseRepository<Account> for PostgresAccountRepository {
    async fn save(&self, account: Account) -> Result<Uuid, RepoError> {
        let txn = self.begin().await?;

        let id = match account.id {
            Some(id) => {
                let model = Self::find_live(id)
                    .one(&txn)
                    .await
                    .map_err(db_err)?
                    .ok_or(RepoError::NotFound)?;

                let mut active = model.into_active_model();
                active.owner_id = Set(account.owner_id);
                active.name = Set(account.name);
                active.updated_at = Set(now());
                active.update(&txn).await.map_err(db_err)?;
                id
            }
            None => {
                let id = Uuid::new_v4();
                AccountEntity::insert(account::ActiveModel::for_insert(id, account, now()))
                    .exec_without_returning(&txn)
                    .await
                    .map_err(db_err)?;
                id
            }
        };

        txn.commit().await.map_err(db_err)?;
        Ok(id)
    }

    async fn fetch(&self, id: Uuid) -> Result<Account, RepoError> {
        Self::find_live(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(Into::into)
            .ok_or(RepoError::NotFound)
    }

    async fn remove(&self, id: Uuid) -> Result<(), RepoError> {
        let txn = self.begin().await?;
        let model = Self::find_live(id)
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or(RepoError::NotFound)?;

        let mut active = model.into_active_model();
        active.deleted_at = Set(Some(now()));
        active.update(&txn).await.map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        tracing::debug!(account_id = %id, "Account soft-deleted");
        Ok(())
    }
}

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    async fn list(&self) -> Result<Vec<Account>, RepoError> {
        let result = AccountEntity::find()
            .filter(account::Column::DeletedAt.is_null())
            .order_by_asc(account::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

impl PostgresUserRepository {
    fn find_live() -> sea_orm::Select<UserEntity> {
        UserEntity::find().filter(user::Column::DeletedAt.is_null())
    }

    /// Load account memberships for the given users, keyed by user id.
    async fn memberships(&self, user_ids: Vec<Uuid>) -> Result<HashMap<Uuid, Vec<Uuid>>, RepoError> {
        let rows = MembershipEntity::find()
            .filter(membership::Column::UserId.is_in(user_ids))
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let mut by_user: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for row in rows {
            by_user.entry(row.user_id).or_default().push(row.account_id);
        }
        Ok(by_user)
    }
}

/// Mask an email address for logging to avoid PII in logs.
fn mask_email(email: &str) -> String {
    match email.find('@') {
        Some(at_pos) => {
            let (local, domain) = email.split_at(at_pos);
            let masked_local = match local.chars().next() {
                Some(first) if local.len() > 1 => format!("{first}***"),
                _ => "***".to_string(),
            };
            format!("{masked_local}{domain}")
        }
        None => "***".to_string(),
    }
}

#[async_trait]
impl BaseRepository<User> for PostgresUserRepository {
    async fn save(&self, user: User) -> Result<Uuid, RepoError> {
        let txn = self.begin().await?;

        let id = match user.id {
            Some(id) => {
                let model = Self::find_live()
                    .filter(user::Column::Id.eq(id))
                    .one(&txn)
                    .await
                    .map_err(db_err)?
                    .ok_or(RepoError::NotFound)?;

                let mut active = model.into_active_model();
                active.name = Set(user.name.clone());
                active.email = Set(user.email.clone());
                active.updated_at = Set(now());
                active.update(&txn).await.map_err(db_err)?;

                MembershipEntity::delete_many()
                    .filter(membership::Column::UserId.eq(id))
                    .exec(&txn)
                    .await
                    .map_err(db_err)?;
                id
            }
            None => {
                let id = Uuid::new_v4();
                UserEntity::insert(user::ActiveModel::for_insert(id, &user, now()))
                    .exec_without_returning(&txn)
                    .await
                    .map_err(db_err)?;
                id
            }
        };

        if !user.accounts.is_empty() {
            let rows = user.accounts.iter().map(|account_id| membership::ActiveModel {
                account_id: Set(*account_id),
                user_id: Set(id),
            });
            MembershipEntity::insert_many(rows)
                .exec_without_returning(&txn)
                .await
                .map_err(db_err)?;
        }

        txn.commit().await.map_err(db_err)?;
        Ok(id)
    }

    async fn fetch(&self, id: Uuid) -> Result<User, RepoError> {
        let model = Self::find_live()
            .filter(user::Column::Id.eq(id))
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(RepoError::NotFound)?;

        let accounts = self.memberships(vec![id]).await?.remove(&id).unwrap_or_default();
        Ok(model.into_domain(accounts))
    }

    async fn remove(&self, id: Uuid) -> Result<(), RepoError> {
        let txn = self.begin().await?;
        let model = Self::find_live()
            .filter(user::Column::Id.eq(id))
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or(RepoError::NotFound)?;

        let mut active = model.into_active_model();
        active.deleted_at = Set(Some(now()));
        active.update(&txn).await.map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        tracing::debug!(user_id = %id, "User soft-deleted");
        Ok(())
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn list(&self) -> Result<Vec<User>, RepoError> {
        let models = Self::find_live()
            .order_by_asc(user::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let mut memberships = self
            .memberships(models.iter().map(|m| m.id).collect())
            .await?;

        Ok(models
            .into_iter()
            .map(|m| {
                let accounts = memberships.remove(&m.id).unwrap_or_default();
                m.into_domain(accounts)
            })
            .collect())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let Some(model) = Self::find_live()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(db_err)?
        else {
            return Ok(None);
        };

        let accounts = self
            .memberships(vec![model.id])
            .await?
            .remove(&model.id)
            .unwrap_or_default();
        Ok(Some(model.into_domain(accounts)))
    }
}

#[cfg(test)]
mod tests {
    use super::mask_email;

    #[test]
    fn test_mask_email() {
        assert_eq!(mask_email("ada@example.com"), "a***@example.com");
        assert_eq!(mask_email("a@example.com"), "***@example.com");
        assert_eq!(mask_email("not-an-email"), "***");
    }
}
