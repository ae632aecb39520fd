//! HTTP transport implementation using reqwest.
//!
//! Sessions are cookie-backed, so the client keeps a cookie store shared
//! by every call. Relative targets are resolved against the configured
//! API base URL.

use std::time::{Duration, Instant};

use bazaar_application::ports::{HttpTransport, TransportError, TransportFuture};
use bazaar_domain::{ApiRequest, ApiResponse, ApiSettings, HttpMethod};
use reqwest::header::ACCEPT;
use reqwest::{Client, Method, Url};
use serde_json::Value;
use tracing::debug;

/// Transport over a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    base_url: Url,
    timeout_ms: u64,
}

impl ReqwestTransport {
    /// Creates a transport for the configured API.
    ///
    /// Configuration:
    /// - Cookie store: enabled
    /// - Follow redirects: up to 10
    /// - User-Agent: "Bazaar/0.1.0"
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the client cannot be
    /// created.
    pub fn new(settings: &ApiSettings) -> Result<Self, TransportError> {
        let base_url = Url::parse(&settings.base_url)
            .map_err(|e| TransportError::InvalidUrl(format!("{e}: {}", settings.base_url)))?;
        let client = Client::builder()
            .user_agent("Bazaar/0.1.0")
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;

        Ok(Self::with_client(client, base_url, settings.timeout_ms))
    }

    /// Creates a transport over a custom reqwest client.
    #[must_use]
    pub const fn with_client(client: Client, base_url: Url, timeout_ms: u64) -> Self {
        Self {
            client,
            base_url,
            timeout_ms,
        }
    }

    /// Resolves a request target against the base URL.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::InvalidUrl` if the target cannot be joined.
    pub fn resolve(&self, target: &str) -> Result<Url, TransportError> {
        self.base_url
            .join(target)
            .map_err(|e| TransportError::InvalidUrl(format!("{e}: {target}")))
    }

    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
        }
    }

    fn map_error(error: &reqwest::Error, timeout_ms: u64) -> TransportError {
        if error.is_timeout() {
            return TransportError::Timeout { timeout_ms };
        }
        if error.is_connect() {
            return TransportError::Network(format!("connection failed: {error}"));
        }
        if error.is_redirect() {
            return TransportError::Network("too many redirects".to_string());
        }
        TransportError::Network(error.to_string())
    }

    /// Empty bodies decode to `Null`, non-JSON bodies to a string.
    fn decode_body(bytes: &[u8]) -> Value {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Value::Null;
        }
        serde_json::from_slice(bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
    }
}

impl HttpTransport for ReqwestTransport {
    fn send(&self, request: ApiRequest) -> TransportFuture<'_> {
        Box::pin(async move {
            let url = self.resolve(&request.url)?;
            let start = Instant::now();

            let mut builder = self
                .client
                .request(Self::to_reqwest_method(request.method), url.clone())
                .timeout(Duration::from_millis(self.timeout_ms))
                .header(ACCEPT, "application/json");
            if let Some(body) = &request.body
                && request.method.has_body()
            {
                builder = builder.json(body);
            }

            let response = builder
                .send()
                .await
                .map_err(|e| Self::map_error(&e, self.timeout_ms))?;
            let status = response.status();
            let bytes = response
                .bytes()
                .await
                .map_err(|e| TransportError::Network(format!("failed to read body: {e}")))?;

            debug!(
                method = %request.method,
                %url,
                status = status.as_u16(),
                elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
                "api call completed"
            );

            if !status.is_success() {
                return Err(TransportError::Status {
                    status: status.as_u16(),
                    url: url.to_string(),
                });
            }
            Ok(ApiResponse::new(status.as_u16(), Self::decode_body(&bytes)))
        })
    }
}
