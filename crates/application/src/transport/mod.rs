//! Response interception on the shared transport.

mod interceptor;

pub use interceptor::{InterceptedTransport, SessionInterceptor};
