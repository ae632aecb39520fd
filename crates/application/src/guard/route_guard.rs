//! Guard evaluation.
//!
//! Every mount owns a `GuardCore` shared with its watcher task and any
//! outstanding soft-verify task. State is only written through
//! [`GuardCore::update`], which checks liveness and the evaluation
//! generation under the state channel's lock, so nothing lands after
//! unmount and superseded verify results are dropped.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use bazaar_domain::{
    ApiRequest, GuardState, IdentityRecord, Location, LoginReason, RedirectPolicy,
    RenderEnvironment, generate_id_v7,
};
use tokio::sync::watch;
use tracing::{debug, info};

use super::handle::GuardHandle;
use super::{GuardSpec, ProtectedView, Verification};
use crate::ports::{HttpTransport, Navigator};
use crate::session::SessionStore;

/// Collaborators shared by every guard of an application.
#[derive(Clone)]
pub struct GuardContext {
    /// The session store guards read and observe.
    pub store: SessionStore,
    /// Client navigation.
    pub navigator: Arc<dyn Navigator>,
    /// The shared, intercepted transport used for soft-verify.
    pub transport: Arc<dyn HttpTransport>,
    /// Login URL computation.
    pub policy: RedirectPolicy,
}

impl GuardContext {
    /// Creates a context.
    #[must_use]
    pub fn new(
        store: SessionStore,
        navigator: Arc<dyn Navigator>,
        transport: Arc<dyn HttpTransport>,
        policy: RedirectPolicy,
    ) -> Self {
        Self {
            store,
            navigator,
            transport,
            policy,
        }
    }
}

/// A protected view wrapped with its guard, ready to mount.
pub struct RouteGuard<V> {
    view: Arc<V>,
    spec: GuardSpec,
    context: GuardContext,
}

/// Wraps `view` so it only renders for the session `spec` requires.
pub fn guard<V: ProtectedView>(view: V, spec: GuardSpec, context: &GuardContext) -> RouteGuard<V> {
    RouteGuard {
        view: Arc::new(view),
        spec,
        context: context.clone(),
    }
}

impl<V: ProtectedView> RouteGuard<V> {
    /// The guard's capability.
    #[must_use]
    pub const fn spec(&self) -> &GuardSpec {
        &self.spec
    }

    /// Mounts the guarded view.
    ///
    /// On the server the guard stays `Idle` and never reads the store. In
    /// the client it evaluates immediately, then re-evaluates on changes
    /// of its role's record and on query or fragment changes of the
    /// mounted path. Must be called within a tokio runtime in the client.
    #[must_use]
    pub fn mount(&self, environment: RenderEnvironment) -> GuardHandle<V> {
        let mounted = self.context.navigator.current_location();
        let core = Arc::new(GuardCore {
            id: generate_id_v7(),
            spec: self.spec.clone(),
            context: self.context.clone(),
            mounted,
            state: watch::channel(GuardState::Idle).0,
            alive: AtomicBool::new(true),
            generation: AtomicU64::new(0),
        });

        if environment == RenderEnvironment::Server {
            debug!(guard = %core.id, role = %core.spec.role, "server render, guard idle");
            return GuardHandle::new(core, Arc::clone(&self.view), None);
        }

        let store_rx = core.context.store.subscribe(core.spec.role);
        let route_rx = core.context.navigator.subscribe();
        core.evaluate(Trigger::Mount);
        let watcher = tokio::spawn(Arc::clone(&core).watch(store_rx, route_rx));
        GuardHandle::new(core, Arc::clone(&self.view), Some(watcher))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    Mount,
    StoreChanged,
    RouteChanged,
}

pub(super) struct GuardCore {
    pub(super) id: String,
    spec: GuardSpec,
    context: GuardContext,
    mounted: Location,
    pub(super) state: watch::Sender<GuardState>,
    alive: AtomicBool,
    generation: AtomicU64,
}

impl GuardCore {
    fn evaluate(self: &Arc<Self>, trigger: Trigger) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let role = self.spec.role;

        let Some(identity) = self.context.store.authenticated(role) else {
            self.on_missing(generation, trigger);
            return;
        };

        match &self.spec.verification {
            Verification::TrustStore => {
                debug!(guard = %self.id, %role, ?trigger, "trusting stored identity");
                self.update(generation, GuardState::Authorized { identity });
            }
            Verification::SoftVerify { endpoint } => {
                debug!(guard = %self.id, %role, ?trigger, %endpoint, "verifying stored identity");
                if self.update(generation, GuardState::Verifying) {
                    self.spawn_verify(generation, endpoint.clone(), identity);
                }
            }
        }
    }

    fn on_missing(&self, generation: u64, trigger: Trigger) {
        let role = self.spec.role;

        // Mid-mount loss: the expiry redirector owns this navigation.
        if trigger == Trigger::StoreChanged {
            debug!(guard = %self.id, %role, "session lost while mounted");
            self.update(generation, GuardState::Unauthenticated);
            return;
        }

        let navigator = &self.context.navigator;
        let current = navigator.current_location();
        if self.context.policy.is_login_page(role, &current) {
            debug!(guard = %self.id, %role, "no session, already on login page");
            self.update(generation, GuardState::Unauthenticated);
            return;
        }

        let to = self.context.policy.compute_login_url(
            role,
            &current,
            LoginReason::Required,
            navigator.has_history(),
        );
        if self.update(generation, GuardState::Redirecting { to: to.clone() }) {
            info!(guard = %self.id, %role, from = %current, %to, "no session, redirecting");
            navigator.replace(&to);
        }
    }

    fn spawn_verify(self: &Arc<Self>, generation: u64, endpoint: String, identity: IdentityRecord) {
        let core = Arc::clone(self);
        tokio::spawn(async move {
            let result = core.context.transport.send(ApiRequest::get(endpoint)).await;
            let next = match result {
                Ok(_) => GuardState::Authorized { identity },
                Err(error) => {
                    debug!(guard = %core.id, %error, "soft-verify failed");
                    GuardState::Unverified
                }
            };
            if !core.update(generation, next) {
                debug!(guard = %core.id, generation, "discarding stale verify result");
            }
        });
    }

    /// Publishes `next` if the guard is mounted and `generation` is
    /// current. Returns whether the write was applied.
    fn update(&self, generation: u64, next: GuardState) -> bool {
        let mut applied = false;
        self.state.send_if_modified(|current| {
            if !self.alive.load(Ordering::SeqCst)
                || self.generation.load(Ordering::SeqCst) != generation
            {
                return false;
            }
            applied = true;
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
        applied
    }

    /// Marks the guard unmounted. Serialized with `update` through the
    /// state channel lock.
    pub(super) fn retire(&self) {
        self.state.send_if_modified(|_| {
            self.alive.store(false, Ordering::SeqCst);
            false
        });
    }

    async fn watch(
        self: Arc<Self>,
        mut store_rx: watch::Receiver<Option<IdentityRecord>>,
        mut route_rx: watch::Receiver<Location>,
    ) {
        let mut last = route_rx.borrow_and_update().clone();
        loop {
            tokio::select! {
                changed = store_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    self.evaluate(Trigger::StoreChanged);
                }
                changed = route_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let location = route_rx.borrow_and_update().clone();
                    if location.same_path(&self.mounted) && location != last {
                        self.evaluate(Trigger::RouteChanged);
                    }
                    last = location;
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::ports::TransportError;
    use crate::session::ExpiryRedirector;
    use crate::test_support::{
        Harness, MockNavigator, StubTransport, buyer, flush, policy, settle, vendor,
    };
    use crate::transport::{InterceptedTransport, SessionInterceptor};
    use bazaar_domain::{InvalidationSettings, Role};
    use pretty_assertions::assert_eq;
    use tokio::sync::Notify;

    const PROFILE: &str = "/api/vendor/profile";

    fn context(harness: &Harness, navigator: &Arc<MockNavigator>, stub: &Arc<StubTransport>) -> GuardContext {
        let transport = InterceptedTransport::new(
            stub.clone(),
            SessionInterceptor::new(InvalidationSettings::default(), harness.notifier.clone()),
        );
        GuardContext::new(harness.store.clone(), navigator.clone(), Arc::new(transport), policy())
    }

    fn dashboard(identity: &IdentityRecord) -> String {
        format!("dashboard for {}", identity.email)
    }

    #[tokio::test]
    async fn test_buyer_present_renders_from_store() {
        let harness = Harness::new();
        harness.seed(&buyer());
        let navigator = MockNavigator::at("/account");
        let stub = StubTransport::new();
        let context = context(&harness, &navigator, &stub);

        let handle = guard(dashboard, GuardSpec::buyer(), &context).mount(RenderEnvironment::Client);

        assert_eq!(handle.render().as_deref(), Some("dashboard for ana@example.com"));
        assert_eq!(stub.calls(), 0);
        assert!(navigator.replaced().is_empty());
    }

    #[tokio::test]
    async fn test_buyer_absent_redirects_to_login() {
        let harness = Harness::new();
        let navigator = MockNavigator::at("/account/orders");
        let context = context(&harness, &navigator, &StubTransport::new());

        let handle = guard(dashboard, GuardSpec::buyer(), &context).mount(RenderEnvironment::Client);

        assert_eq!(
            handle.state(),
            GuardState::Redirecting {
                to: "/login".to_string()
            }
        );
        assert_eq!(handle.render(), None);
        assert_eq!(navigator.replaced(), vec!["/login".to_string()]);
    }

    #[tokio::test]
    async fn test_unauthenticated_record_counts_as_absent() {
        let harness = Harness::new();
        harness.store.set(Role::Buyer, IdentityRecord::new("b-1", "", Role::Buyer));
        let navigator = MockNavigator::at("/account");
        let context = context(&harness, &navigator, &StubTransport::new());

        let handle = guard(dashboard, GuardSpec::buyer(), &context).mount(RenderEnvironment::Client);

        assert_eq!(handle.render(), None);
        assert_eq!(navigator.replaced(), vec!["/login".to_string()]);
    }

    #[tokio::test]
    async fn test_vendor_absent_redirects_with_next_and_required_reason() {
        let harness = Harness::new();
        let navigator = MockNavigator::at("/vendor/orders?page=2");
        let context = context(&harness, &navigator, &StubTransport::new());

        let handle = guard(dashboard, GuardSpec::vendor(PROFILE), &context).mount(RenderEnvironment::Client);

        assert_eq!(handle.render(), None);
        assert_eq!(
            navigator.replaced(),
            vec!["/vendor/login?reason=required&next=%2Fvendor%2Forders%3Fpage%3D2".to_string()]
        );
    }

    #[tokio::test]
    async fn test_vendor_absent_without_history_goes_to_site_root() {
        let harness = Harness::new();
        let navigator = MockNavigator::fresh_tab("/vendor/orders");
        let context = context(&harness, &navigator, &StubTransport::new());

        let handle = guard(dashboard, GuardSpec::vendor(PROFILE), &context).mount(RenderEnvironment::Client);

        assert_eq!(handle.state(), GuardState::Redirecting { to: "/".to_string() });
        assert_eq!(navigator.replaced(), vec!["/".to_string()]);
    }

    #[tokio::test]
    async fn test_absent_on_login_page_does_not_navigate() {
        let harness = Harness::new();
        let navigator = MockNavigator::at("/vendor/login");
        let context = context(&harness, &navigator, &StubTransport::new());

        let handle = guard(dashboard, GuardSpec::vendor(PROFILE), &context).mount(RenderEnvironment::Client);

        assert_eq!(handle.state(), GuardState::Unauthenticated);
        assert!(navigator.replaced().is_empty());
    }

    #[tokio::test]
    async fn test_vendor_verified_renders_without_navigation() {
        let harness = Harness::new();
        harness.seed(&vendor());
        let navigator = MockNavigator::at("/vendor/dashboard");
        let stub = StubTransport::new();
        let context = context(&harness, &navigator, &stub);

        let handle = guard(dashboard, GuardSpec::vendor(PROFILE), &context).mount(RenderEnvironment::Client);
        assert_eq!(handle.state(), GuardState::Verifying);
        assert_eq!(handle.render(), None);

        let state = settle(&mut handle.watch(), GuardState::is_settled).await;

        assert!(state.is_authorized());
        assert_eq!(handle.render().as_deref(), Some("dashboard for owner@cornershop.io"));
        assert_eq!(stub.calls(), 1);
        assert!(navigator.replaced().is_empty());
    }

    #[tokio::test]
    async fn test_verify_network_failure_blocks_render_but_keeps_session() {
        let harness = Harness::new();
        harness.seed(&vendor());
        let navigator = MockNavigator::at("/vendor/dashboard");
        let stub = StubTransport::new();
        stub.answer(PROFILE, Err(TransportError::Network("offline".to_string())));
        let context = context(&harness, &navigator, &stub);

        let handle = guard(dashboard, GuardSpec::vendor(PROFILE), &context).mount(RenderEnvironment::Client);
        let state = settle(&mut handle.watch(), GuardState::is_settled).await;

        assert_eq!(state, GuardState::Unverified);
        assert_eq!(handle.render(), None);
        assert_eq!(harness.store.get(Role::Vendor), Some(vendor()));
        assert!(navigator.replaced().is_empty());
    }

    #[tokio::test]
    async fn test_verify_rejection_expires_session_through_interceptor() {
        let harness = Harness::new();
        harness.seed(&vendor());
        let navigator = MockNavigator::at("/vendor/orders");
        ExpiryRedirector::new(navigator.clone(), policy()).spawn(harness.notifier.subscribe());
        let stub = StubTransport::new();
        stub.fail(PROFILE, 401);
        let context = context(&harness, &navigator, &stub);

        let handle = guard(dashboard, GuardSpec::vendor(PROFILE), &context).mount(RenderEnvironment::Client);
        settle(&mut handle.watch(), |state| *state == GuardState::Unauthenticated).await;
        flush().await;

        assert_eq!(handle.render(), None);
        assert_eq!(harness.store.get(Role::Vendor), None);
        assert_eq!(
            navigator.replaced(),
            vec!["/vendor/login?reason=expired&next=%2Fvendor%2Forders".to_string()]
        );
    }

    #[tokio::test]
    async fn test_unmount_during_verify_leaves_no_mutation() {
        let harness = Harness::new();
        harness.seed(&vendor());
        let navigator = MockNavigator::at("/vendor/dashboard");
        let gate = Arc::new(Notify::new());
        let stub = StubTransport::gated(gate.clone());
        let context = context(&harness, &navigator, &stub);

        let handle = guard(dashboard, GuardSpec::vendor(PROFILE), &context).mount(RenderEnvironment::Client);
        let rx = handle.watch();
        flush().await;
        assert_eq!(stub.calls(), 1);

        handle.unmount();
        gate.notify_one();
        flush().await;

        assert_eq!(stub.completed(), 1);
        assert_eq!(*rx.borrow(), GuardState::Verifying);
        assert!(navigator.replaced().is_empty());
        assert_eq!(harness.store.get(Role::Vendor), Some(vendor()));
    }

    #[tokio::test]
    async fn test_store_cleared_mid_mount_stops_render_without_navigating() {
        let harness = Harness::new();
        harness.seed(&buyer());
        let navigator = MockNavigator::at("/account");
        let context = context(&harness, &navigator, &StubTransport::new());

        let handle = guard(dashboard, GuardSpec::buyer(), &context).mount(RenderEnvironment::Client);
        assert!(handle.render().is_some());

        harness.store.clear(Role::Buyer);
        settle(&mut handle.watch(), |state| *state == GuardState::Unauthenticated).await;

        assert_eq!(handle.render(), None);
        assert!(navigator.replaced().is_empty());
    }

    #[tokio::test]
    async fn test_login_elsewhere_authorizes_mounted_guard() {
        let harness = Harness::new();
        let navigator = MockNavigator::at("/login");
        let context = context(&harness, &navigator, &StubTransport::new());

        let handle = guard(dashboard, GuardSpec::buyer(), &context).mount(RenderEnvironment::Client);
        assert_eq!(handle.state(), GuardState::Unauthenticated);

        harness.store.set(Role::Buyer, buyer());
        let state = settle(&mut handle.watch(), GuardState::is_authorized).await;

        assert_eq!(state.identity(), Some(&buyer()));
    }

    #[tokio::test]
    async fn test_other_role_change_is_ignored() {
        let harness = Harness::new();
        harness.seed(&buyer());
        let navigator = MockNavigator::at("/account");
        let stub = StubTransport::new();
        let context = context(&harness, &navigator, &stub);

        let handle = guard(dashboard, GuardSpec::buyer(), &context).mount(RenderEnvironment::Client);
        let mut rx = handle.watch();
        let _ = rx.borrow_and_update();

        harness.store.set(Role::Vendor, vendor());
        flush().await;

        assert!(!rx.has_changed().unwrap());
        assert!(handle.state().is_authorized());
    }

    #[tokio::test]
    async fn test_query_change_on_mounted_path_reverifies() {
        let harness = Harness::new();
        harness.seed(&vendor());
        let navigator = MockNavigator::at("/vendor/orders?page=1");
        let stub = StubTransport::new();
        let context = context(&harness, &navigator, &stub);

        let handle = guard(dashboard, GuardSpec::vendor(PROFILE), &context).mount(RenderEnvironment::Client);
        settle(&mut handle.watch(), GuardState::is_authorized).await;

        navigator.visit("/vendor/orders?page=2");
        flush().await;
        assert_eq!(stub.calls(), 2);

        navigator.visit("/vendor/settings");
        flush().await;
        assert_eq!(stub.calls(), 2);
        assert!(handle.state().is_authorized());
    }

    #[tokio::test]
    async fn test_server_render_stays_idle() {
        let harness = Harness::new();
        harness.seed(&vendor());
        let navigator = MockNavigator::at("/vendor/dashboard");
        let stub = StubTransport::new();
        let context = context(&harness, &navigator, &stub);

        let handle = guard(dashboard, GuardSpec::vendor(PROFILE), &context).mount(RenderEnvironment::Server);
        flush().await;

        assert_eq!(handle.state(), GuardState::Idle);
        assert_eq!(handle.render(), None);
        assert_eq!(stub.calls(), 0);
        assert!(navigator.replaced().is_empty());
    }

    #[tokio::test]
    async fn test_mounts_are_independent() {
        let harness = Harness::new();
        harness.seed(&buyer());
        let navigator = MockNavigator::at("/account");
        let context = context(&harness, &navigator, &StubTransport::new());
        let route = guard(dashboard, GuardSpec::buyer(), &context);

        let first = route.mount(RenderEnvironment::Client);
        let second = route.mount(RenderEnvironment::Client);
        first.unmount();

        assert_ne!(second.id(), "");
        assert!(second.render().is_some());
    }
}
