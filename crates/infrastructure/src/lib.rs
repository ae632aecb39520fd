//! Bazaar Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer, plus settings loading.

pub mod adapters;
pub mod cache;
pub mod config;
pub mod navigation;
pub mod serialization;

pub use adapters::{ReqwestTransport, SystemClock};
pub use cache::{DURABLE_FILE_NAME, FileCache, MemoryCache};
pub use self::config::{ConfigLoadError, ENV_PREFIX, load_settings};
pub use navigation::HistoryNavigator;
pub use serialization::{SerializationError, from_json_bytes, to_json_stable_bytes};
