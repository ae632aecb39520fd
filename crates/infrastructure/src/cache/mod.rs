//! Client cache adapters.
//!
//! The durable cache survives restarts; the memory cache lives as long as
//! the process, like per-tab session storage.

mod file_cache;
mod memory_cache;

pub use file_cache::{DURABLE_FILE_NAME, FileCache};
pub use memory_cache::MemoryCache;
