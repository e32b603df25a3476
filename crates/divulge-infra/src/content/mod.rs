//! Content store implementations - on-disk and in-memory.

mod disk;
mod memory;

pub use disk::DiskContentStore;
pub use memory::InMemoryContentStore;
