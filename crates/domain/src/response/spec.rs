//! Successful API response.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A 2xx response with its decoded body.
///
/// Non-success statuses never produce an `ApiResponse`; the transport
/// reports them as failures instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// JSON body; `Null` when empty, a string when not JSON.
    pub body: Value,
}

impl ApiResponse {
    /// Creates a response.
    #[must_use]
    pub const fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// Creates a `200 OK` response.
    #[must_use]
    pub const fn ok(body: Value) -> Self {
        Self::new(200, body)
    }
}
