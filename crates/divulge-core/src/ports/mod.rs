//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod content;
mod repository;

pub use content::{ContentStore, validate_key};
pub use repository::{AccountRepository, BaseRepository, PostRepository, UserRepository};
