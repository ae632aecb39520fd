//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the session core and the client
//! environment. Each port is a trait implemented by adapters in the
//! infrastructure layer.

mod client_cache;
mod clock;
mod http_transport;
mod navigator;

pub use client_cache::{CacheError, ClientCache};
pub use clock::Clock;
pub use http_transport::{HttpTransport, TransportError, TransportFuture, TransportResult};
pub use navigator::Navigator;
