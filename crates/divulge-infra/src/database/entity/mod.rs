//! SeaORM entities for the metadata tables.

pub mod account;
pub mod membership;
pub mod post;
pub mod user;
