use std::marker::PhantomData;

use chrono::Utc;
use sea_orm::{DatabaseTransaction, DbConn, DbErr, EntityTrait, TransactionTrait};

use divulge_core::error::RepoError;

/// Generic PostgreSQL repository: a connection plus the entity it serves.
pub struct PostgresBaseRepository<E>
where
    E: EntityTrait,
{
    pub(crate) db: DbConn,
    _entity: PhantomData<E>,
}

impl<E> PostgresBaseRepository<E>
where
    E: EntityTrait,
{
    pub fn new(db: DbConn) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }

    /// Start a transaction. Every metadata write runs inside one, so a
    /// failure part-way leaves no partial row behind; dropping the
    /// transaction without committing rolls it back.
    pub(crate) async fn begin(&self) -> Result<DatabaseTransaction, RepoError> {
        self.db.begin().await.map_err(db_err)
    }
}

/// Map a SeaORM error onto the repository error taxonomy.
pub(crate) fn db_err(err: DbErr) -> RepoError {
    match err {
        DbErr::Conn(e) => RepoError::Connection(e.to_string()),
        DbErr::ConnectionAcquire(e) => RepoError::Connection(e.to_string()),
        DbErr::RecordNotFound(_) | DbErr::RecordNotUpdated => RepoError::NotFound,
        other => {
            let err_str = other.to_string();
            if err_str.contains("duplicate") || err_str.contains("unique") {
                RepoError::Constraint("Entity already exists".to_string())
            } else if err_str.contains("foreign key") {
                RepoError::Constraint("Referenced entity does not exist".to_string())
            } else {
                RepoError::Query(err_str)
            }
        }
    }
}

/// Current time in the column representation.
pub(crate) fn now() -> sea_orm::prelude::DateTimeWithTimeZone {
    Utc::now().into()
}
