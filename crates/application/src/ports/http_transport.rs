//! HTTP transport port

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bazaar_domain::{ApiRequest, ApiResponse, Location};
use thiserror::Error;

/// Failure of an API call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The server answered with a non-success status.
    #[error("{url} responded with status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Target of the failing request.
        url: String,
    },

    /// The request never got an answer (offline, DNS, refused).
    #[error("network error: {0}")]
    Network(String),

    /// The request exceeded its timeout.
    #[error("request timed out after {timeout_ms}ms")]
    Timeout {
        /// The timeout that elapsed.
        timeout_ms: u64,
    },

    /// The request target could not be parsed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl TransportError {
    /// The HTTP status, for `Status` failures.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Path of the failing request, for `Status` failures.
    #[must_use]
    pub fn path(&self) -> Option<String> {
        match self {
            Self::Status { url, .. } => Some(Location::parse(url).path),
            _ => None,
        }
    }
}

/// Outcome of one API call.
pub type TransportResult = Result<ApiResponse, TransportError>;

/// Boxed future returned by [`HttpTransport::send`].
pub type TransportFuture<'a> = Pin<Box<dyn Future<Output = TransportResult> + Send + 'a>>;

/// Port for the single request/response pipeline every API call uses.
///
/// Non-success statuses are failures (`TransportError::Status`), so
/// callers and interceptors see a uniform `success | failure(status, url)`.
pub trait HttpTransport: Send + Sync {
    /// Sends a request.
    fn send(&self, request: ApiRequest) -> TransportFuture<'_>;
}

impl<T: HttpTransport + ?Sized> HttpTransport for Arc<T> {
    fn send(&self, request: ApiRequest) -> TransportFuture<'_> {
        (**self).send(request)
    }
}
