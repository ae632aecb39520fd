//! Session-aware response interceptor.
//!
//! Wraps the transport every API call goes through. A failure whose status
//! and request path match a configured namespace expires that namespace's
//! session, whether or not it is still held in memory; the original
//! failure is always handed back to the caller unchanged.

use bazaar_domain::{ApiRequest, InvalidationSettings, Role};
use tracing::{debug, warn};

use crate::ports::{HttpTransport, TransportError, TransportFuture};
use crate::session::ExpiryNotifier;

/// Maps transport failures to session invalidations.
#[derive(Debug, Clone)]
pub struct SessionInterceptor {
    settings: InvalidationSettings,
    notifier: ExpiryNotifier,
}

impl SessionInterceptor {
    /// Creates an interceptor.
    #[must_use]
    pub const fn new(settings: InvalidationSettings, notifier: ExpiryNotifier) -> Self {
        Self { settings, notifier }
    }

    /// The session a failure invalidates, if any.
    #[must_use]
    pub fn role_for(&self, error: &TransportError) -> Option<Role> {
        let status = error.status()?;
        let path = error.path()?;
        self.settings.role_for(status, &path)
    }

    /// Reacts to a failed call.
    pub async fn on_failure(&self, error: &TransportError) {
        let Some(role) = self.role_for(error) else {
            debug!(%error, "failure does not affect any session");
            return;
        };

        warn!(%role, %error, "server rejected session");
        self.notifier.expire(role).await;
    }
}

/// A transport with a [`SessionInterceptor`] installed.
#[derive(Debug, Clone)]
pub struct InterceptedTransport<T> {
    inner: T,
    interceptor: SessionInterceptor,
}

impl<T: HttpTransport> InterceptedTransport<T> {
    /// Installs `interceptor` on `inner`.
    #[must_use]
    pub const fn new(inner: T, interceptor: SessionInterceptor) -> Self {
        Self { inner, interceptor }
    }
}

impl<T: HttpTransport> HttpTransport for InterceptedTransport<T> {
    fn send(&self, request: ApiRequest) -> TransportFuture<'_> {
        Box::pin(async move {
            let result = self.inner.send(request).await;
            if let Err(error) = &result {
                self.interceptor.on_failure(error).await;
            }
            result
        })
    }
}
