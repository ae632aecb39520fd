//! Hand-written port doubles shared by the unit tests.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, missing_docs)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bazaar_domain::{
    ApiRequest, ApiResponse, GuardState, IdentityRecord, Location, RedirectPolicy, Role,
    RouteSettings, StorageSettings,
};
use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::{Notify, watch};

use crate::ports::{
    CacheError, ClientCache, Clock, HttpTransport, Navigator, TransportError, TransportFuture,
    TransportResult,
};
use crate::session::{ExpiryNotifier, SessionCaches, SessionStore};

pub fn vendor() -> IdentityRecord {
    IdentityRecord::new("v-1", "owner@cornershop.io", Role::Vendor).with_field("storeName", "Corner Shop")
}

pub fn buyer() -> IdentityRecord {
    IdentityRecord::new("b-1", "ana@example.com", Role::Buyer)
}

pub fn policy() -> RedirectPolicy {
    RedirectPolicy::new(RouteSettings::default())
}

/// Lets spawned tasks run to completion.
pub async fn flush() {
    tokio::time::sleep(Duration::from_millis(20)).await;
}

/// Waits until the guard state satisfies `predicate`.
pub async fn settle(
    rx: &mut watch::Receiver<GuardState>,
    predicate: impl FnMut(&GuardState) -> bool,
) -> GuardState {
    tokio::time::timeout(Duration::from_secs(2), rx.wait_for(predicate))
        .await
        .expect("guard never settled")
        .expect("guard state channel closed")
        .clone()
}

pub struct FixedClock;

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap()
    }
}

pub struct MockNavigator {
    location: watch::Sender<Location>,
    history: AtomicBool,
    replaced: Mutex<Vec<String>>,
}

impl MockNavigator {
    pub fn at(target: &str) -> Arc<Self> {
        Arc::new(Self {
            location: watch::channel(Location::parse(target)).0,
            history: AtomicBool::new(true),
            replaced: Mutex::new(Vec::new()),
        })
    }

    pub fn fresh_tab(target: &str) -> Arc<Self> {
        let navigator = Self::at(target);
        navigator.history.store(false, Ordering::SeqCst);
        navigator
    }

    /// Simulates the visitor following a link.
    pub fn visit(&self, target: &str) {
        self.location.send_replace(Location::parse(target));
        self.history.store(true, Ordering::SeqCst);
    }

    pub fn replaced(&self) -> Vec<String> {
        self.replaced.lock().unwrap().clone()
    }
}

impl Navigator for MockNavigator {
    fn current_location(&self) -> Location {
        self.location.borrow().clone()
    }

    fn has_history(&self) -> bool {
        self.history.load(Ordering::SeqCst)
    }

    fn replace(&self, url: &str) {
        self.replaced.lock().unwrap().push(url.to_string());
        self.location.send_replace(Location::parse(url));
    }

    fn subscribe(&self) -> watch::Receiver<Location> {
        self.location.subscribe()
    }
}

pub struct MockCache {
    name: String,
    entries: Mutex<HashMap<String, String>>,
    available: bool,
}

impl MockCache {
    pub fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            entries: Mutex::new(HashMap::new()),
            available: true,
        })
    }

    pub fn unavailable(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            entries: Mutex::new(HashMap::new()),
            available: false,
        })
    }

    pub fn peek(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    pub fn put(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    fn check(&self) -> Result<(), CacheError> {
        if self.available {
            Ok(())
        } else {
            Err(CacheError::Unavailable(self.name.clone()))
        }
    }
}

#[async_trait]
impl ClientCache for MockCache {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.check()?;
        Ok(self.peek(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        self.check()?;
        self.put(key, value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), CacheError> {
        self.check()?;
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}

/// Transport answering from a per-path table; unknown paths get `200 null`.
#[derive(Default)]
pub struct StubTransport {
    routes: Mutex<HashMap<String, TransportResult>>,
    gate: Option<Arc<Notify>>,
    calls: AtomicUsize,
    completed: AtomicUsize,
}

impl StubTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Every call waits for `gate` to be notified before answering.
    pub fn gated(gate: Arc<Notify>) -> Arc<Self> {
        Arc::new(Self {
            gate: Some(gate),
            ..Self::default()
        })
    }

    pub fn fail(&self, path: &str, status: u16) {
        self.routes.lock().unwrap().insert(
            path.to_string(),
            Err(TransportError::Status {
                status,
                url: path.to_string(),
            }),
        );
    }

    pub fn answer(&self, path: &str, result: TransportResult) {
        self.routes.lock().unwrap().insert(path.to_string(), result);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

impl HttpTransport for StubTransport {
    fn send(&self, request: ApiRequest) -> TransportFuture<'_> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move {
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            let result = self
                .routes
                .lock()
                .unwrap()
                .get(&request.path())
                .cloned()
                .unwrap_or_else(|| Ok(ApiResponse::ok(serde_json::Value::Null)));
            self.completed.fetch_add(1, Ordering::SeqCst);
            result
        })
    }
}

pub struct Harness {
    pub store: SessionStore,
    pub durable: Arc<MockCache>,
    pub session: Arc<MockCache>,
    pub notifier: ExpiryNotifier,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_caches(MockCache::new("durable"), MockCache::new("session"))
    }

    pub fn with_caches(durable: Arc<MockCache>, session: Arc<MockCache>) -> Self {
        let store = SessionStore::new();
        let caches = SessionCaches::new(StorageSettings::default())
            .with_cache(durable.clone())
            .with_cache(session.clone());
        let notifier = ExpiryNotifier::new(store.clone(), caches, Arc::new(FixedClock));
        Self {
            store,
            durable,
            session,
            notifier,
        }
    }

    /// Puts a record into the store and both caches, as a login would.
    pub fn seed(&self, record: &IdentityRecord) {
        let key = StorageSettings::default().key(record.role).to_string();
        let json = serde_json::to_string(record).unwrap();
        self.durable.put(&key, &json);
        self.session.put(&key, &json);
        self.store.set(record.role, record.clone());
    }
}
