//! Application state - shared across all handlers.

use std::sync::Arc;

use divulge_core::PostService;
use divulge_core::ports::{AccountRepository, ContentStore, PostRepository, UserRepository};
use divulge_infra::content::DiskContentStore;
use divulge_infra::database::DatabaseConnections;
use divulge_infra::memory::{
    InMemoryAccountRepository, InMemoryPostRepository, InMemoryUserRepository,
};

#[cfg(feature = "postgres")]
use divulge_infra::database::{
    PostgresAccountRepository, PostgresPostRepository, PostgresUserRepository,
};

use crate::config::{AppConfig, ContentConfig};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<PostService>,
    pub accounts: Arc<dyn AccountRepository>,
    pub users: Arc<dyn UserRepository>,
    pub db: Option<Arc<DatabaseConnections>>,
}

/// The three metadata repositories, backed by the same store.
struct MetadataStores {
    posts: Arc<dyn PostRepository>,
    accounts: Arc<dyn AccountRepository>,
    users: Arc<dyn UserRepository>,
}

impl MetadataStores {
    fn in_memory() -> Self {
        Self {
            posts: Arc::new(InMemoryPostRepository::new()),
            accounts: Arc::new(InMemoryAccountRepository::new()),
            users: Arc::new(InMemoryUserRepository::new()),
        }
    }

    #[cfg(feature = "postgres")]
    fn postgres(db: &DatabaseConnections) -> Self {
        Self {
            posts: Arc::new(PostgresPostRepository::new(db.main.clone())),
            accounts: Arc::new(PostgresAccountRepository::new(db.main.clone())),
            users: Arc::new(PostgresUserRepository::new(db.main.clone())),
        }
    }
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        let content: Arc<dyn ContentStore> = Arc::new(DiskContentStore::new(&config.content.root));
        tracing::info!(root = %config.content.root.display(), "Content store on disk");

        #[cfg(feature = "postgres")]
        let (db, stores) = match &config.database {
            Some(db_config) => match DatabaseConnections::init(db_config).await {
                Ok(connections) => {
                    let stores = MetadataStores::postgres(&connections);
                    (Some(Arc::new(connections)), stores)
                }
                Err(e) => {
                    tracing::error!(
                        "Failed to connect to database: {}. Using in-memory fallback.",
                        e
                    );
                    (None, MetadataStores::in_memory())
                }
            },
            None => {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
                (None, MetadataStores::in_memory())
            }
        };

        #[cfg(not(feature = "postgres"))]
        let (db, stores) = {
            tracing::info!("Running without postgres feature - using in-memory repositories");
            (None, MetadataStores::in_memory())
        };

        tracing::info!("Application state initialized");
        Self::from_parts(stores, content, &config.content, db)
    }

    /// State with in-memory metadata and the given content store.
    #[cfg(test)]
    pub fn in_memory(content: Arc<dyn ContentStore>, content_config: &ContentConfig) -> Self {
        Self::from_parts(MetadataStores::in_memory(), content, content_config, None)
    }

    fn from_parts(
        stores: MetadataStores,
        content: Arc<dyn ContentStore>,
        content_config: &ContentConfig,
        db: Option<Arc<DatabaseConnections>>,
    ) -> Self {
        let posts = PostService::new(stores.posts, content)
            .with_extension(content_config.extension.clone());

        Self {
            posts: Arc::new(posts),
            accounts: stores.accounts,
            users: stores.users,
            db,
        }
    }
}
