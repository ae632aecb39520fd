//! Session state and its invalidation protocol.
//!
//! This module provides:
//! - The per-role observable session store
//! - The set of client caches mirroring it
//! - The expiry notifier and the redirector that owns navigation after
//!   an invalidation
//! - Login, logout and hydration flows

mod caches;
mod notifier;
mod redirector;
mod service;
mod store;

pub use caches::SessionCaches;
pub use notifier::{EVENT_CAPACITY, ExpiryNotifier, Invalidation};
pub use redirector::ExpiryRedirector;
pub use service::SessionService;
pub use store::SessionStore;
