//! Application error types

use bazaar_domain::{DomainError, Role};
use thiserror::Error;

use crate::ports::{CacheError, TransportError};

/// Application-level errors.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// A domain validation error occurred.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    /// An API call failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// A client-side cache operation failed.
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),

    /// A login flow handed over a record without an email.
    #[error("{role} identity record has no email")]
    Unauthenticated {
        /// Role the record was offered for.
        role: Role,
    },
}

/// Result type alias for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
