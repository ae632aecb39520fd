//! Bazaar session client - Main Entry Point
//!
//! Wires the session store, client caches, intercepted transport and
//! navigation, restores any cached session, then mounts the guard for the
//! requested route and reports what it decided.
//!
//! Usage: `bazaar [PATH] [ROLE]`. `BAZAAR_CONFIG` points at an optional
//! settings file.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use bazaar_application::ports::Navigator;
use bazaar_application::{
    ExpiryNotifier, ExpiryRedirector, GuardContext, GuardSpec, InterceptedTransport,
    SessionCaches, SessionInterceptor, SessionService, SessionStore, guard,
};
use bazaar_domain::{GuardState, IdentityRecord, RedirectPolicy, RenderEnvironment, Role};
use bazaar_infrastructure::{
    FileCache, HistoryNavigator, MemoryCache, ReqwestTransport, SystemClock, load_settings,
};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn render_dashboard(identity: &IdentityRecord) -> String {
    format!("{} dashboard for {}", identity.role, identity.email)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_path = std::env::var_os("BAZAAR_CONFIG").map(PathBuf::from);
    let settings = load_settings(config_path.as_deref())?;

    let mut args = std::env::args().skip(1);
    let target = args
        .next()
        .unwrap_or_else(|| settings.routes.vendor_home.clone());
    let role = args.next().map(|role| role.parse::<Role>()).transpose()?.unwrap_or(Role::Vendor);

    info!("Starting Bazaar session client v{}", env!("CARGO_PKG_VERSION"));

    let store = SessionStore::new();
    let mut caches = SessionCaches::new(settings.storage.clone());
    match FileCache::from_settings(&settings.storage) {
        Ok(durable) => {
            info!(path = %durable.path().display(), "durable cache");
            caches = caches.with_cache(Arc::new(durable));
        }
        Err(error) => warn!(%error, "running without durable cache"),
    }
    let caches = caches.with_cache(Arc::new(MemoryCache::session()));
    let notifier = ExpiryNotifier::new(store.clone(), caches, Arc::new(SystemClock::new()));

    let navigator = Arc::new(HistoryNavigator::open(&target));
    let policy = RedirectPolicy::new(settings.routes.clone());
    let redirector =
        ExpiryRedirector::new(navigator.clone(), policy.clone()).spawn(notifier.subscribe());

    let transport = InterceptedTransport::new(
        ReqwestTransport::new(&settings.api)?,
        SessionInterceptor::new(settings.invalidation.clone(), notifier.clone()),
    );

    SessionService::new(notifier.clone(), navigator.clone(), policy.clone())
        .hydrate()
        .await;

    let context = GuardContext::new(store, navigator.clone(), Arc::new(transport), policy);
    let handle = guard(
        render_dashboard,
        GuardSpec::for_role(role, &settings.api),
        &context,
    )
    .mount(RenderEnvironment::Client);

    let mut states = handle.watch();
    let wait = Duration::from_millis(settings.api.timeout_ms.saturating_add(1_000));
    match tokio::time::timeout(wait, states.wait_for(GuardState::is_settled)).await {
        Ok(Ok(state)) => info!(guard = handle.id(), state = state.label(), "guard settled"),
        Ok(Err(_)) => warn!(guard = handle.id(), "guard state channel closed"),
        Err(_) => warn!(guard = handle.id(), "guard did not settle in time"),
    }
    // Let the redirector act on an invalidation raised by the verify call.
    tokio::time::sleep(Duration::from_millis(50)).await;

    match handle.render() {
        Some(view) => info!(%view, "rendered"),
        None => info!(location = %navigator.current_location(), "view not rendered"),
    }

    drop(handle);
    redirector.abort();
    Ok(())
}
