//! Bazaar Application - Session guards and invalidation
//!
//! This crate defines the application layer with:
//! - Port traits for the transport, navigation, client caches and clock
//! - The per-role session store and its invalidation protocol
//! - The response interceptor installed on the shared transport
//! - Buyer and vendor route guards

pub mod error;
pub mod guard;
pub mod ports;
pub mod session;
pub mod transport;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{ApplicationError, ApplicationResult};
pub use guard::{
    GuardContext, GuardHandle, GuardSpec, ProtectedView, RouteGuard, Verification, guard,
};
pub use ports::{
    CacheError, ClientCache, Clock, HttpTransport, Navigator, TransportError, TransportFuture,
    TransportResult,
};
pub use session::{
    ExpiryNotifier, ExpiryRedirector, Invalidation, SessionCaches, SessionService, SessionStore,
};
pub use transport::{InterceptedTransport, SessionInterceptor};
