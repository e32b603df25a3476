//! Domain entities - the core business objects.

mod account;
mod post;
mod user;

pub use account::Account;
pub use post::{DEFAULT_CONTENT_EXTENSION, Post, PostState, content_path};
pub use user::User;
