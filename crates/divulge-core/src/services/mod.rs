//! Services - orchestration over the ports.

mod post_service;

#[cfg(test)]
mod mocks;

pub use post_service::PostService;
