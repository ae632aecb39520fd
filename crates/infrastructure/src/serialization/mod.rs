//! Deterministic JSON serialization for files written by the adapters.
//!
//! - 2-space indentation
//! - Trailing newline
//! - Keys sorted (via `BTreeMap` in the serialized types)

mod json;

pub use json::*;
