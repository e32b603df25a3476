//! # Divulge Core
//!
//! The domain layer of the Divulge publishing backend.
//! This crate contains the entities, the ports infrastructure must implement,
//! and the post coordinator that ties the metadata and content stores together.
//! It has zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use error::{DomainError, PostError};
pub use services::PostService;
