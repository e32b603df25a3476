//! # Divulge Infrastructure
//!
//! Concrete implementations of the ports defined in `divulge-core`:
//! metadata repositories (Postgres and in-memory) and content stores
//! (disk and in-memory).
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory and disk only
//! - `postgres` - PostgreSQL metadata store via SeaORM

pub mod content;
pub mod database;
pub mod memory;

// Re-exports - In-Memory and disk
pub use content::{DiskContentStore, InMemoryContentStore};
pub use database::{DatabaseConfig, DatabaseConnections};
pub use memory::{InMemoryAccountRepository, InMemoryPostRepository, InMemoryUserRepository};

// Re-exports - Postgres
#[cfg(feature = "postgres")]
pub use database::{PostgresAccountRepository, PostgresPostRepository, PostgresUserRepository};
