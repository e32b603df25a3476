//! In-memory metadata repositories.
//!
//! Used as the fallback when no database is configured and as deterministic
//! doubles in tests. They follow the same rules as the Postgres
//! repositories: soft-deleted accounts and users are invisible to fetch and
//! list, and posts are hard-deleted.

mod account;
mod post;
mod user;

pub use account::InMemoryAccountRepository;
pub use post::InMemoryPostRepository;
pub use user::InMemoryUserRepository;
