//! # Navigation Snapshot Store
//!
//! The single point of contact with the host platform's history-change
//! notifications, no matter how many consumers exist.
//!
//! ## Lifecycle
//!
//! ```text
//! subscribe #1 ──► attach one listener pair (navigate + currententrychange)
//! subscribe #N ──► share the existing attachment
//! platform event ─► recompute snapshot ─► notify callbacks in registration order
//! unsubscribe last ► detach the listener pair
//! ```
//!
//! The store is explicitly constructed and cheaply cloneable; every clone
//! shares the same snapshot, caches and subscriber set. Snapshot publication
//! is serialised by a mutex and readers load the current snapshot through
//! [`ArcSwapOption`] without blocking.
//!
//! ## Fallback
//!
//! Without an entry-list backend the store still produces a valid
//! single-entry snapshot: the linear backend's document address, else the
//! configured initial location, else `/`.

use arc_swap::{ArcSwap, ArcSwapOption};
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::{Arc, Weak};
use tracing::{debug, info};

use crate::address::{AddressCache, ParsedAddress, QueryParams};
use crate::config::RouteConfig;
use crate::history_index::{EntryIds, HistoryIndexTracker};
use crate::pattern::{NativePatternFactory, PatternCache};
use crate::platform::{EventListener, HostPlatform, ListenerId, NavigationEventKind};
use crate::resolver::{self, RouteMatcher, RouteState};

/// Entry id used for the synthetic entry of a store without an entry list
pub const SYNTHETIC_ENTRY_ID: &str = "";

/// Subscriber callback, invoked after every snapshot publication
pub type Callback = Arc<dyn Fn() + Send + Sync>;

/// Immutable point-in-time summary of session history
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationSnapshot {
    pub current_entry_id: String,
    /// Backend-reported hint; not authoritative
    pub can_go_back_flag: bool,
    /// Backend-reported hint; not authoritative
    pub can_go_forward_flag: bool,
    /// All entry ids, oldest first
    pub entry_ids: EntryIds,
    pub raw_address: String,
    /// Parsed path and query of `raw_address`
    pub address: Arc<ParsedAddress>,
    pub entry_state: Option<Value>,
}

impl NavigationSnapshot {
    #[must_use]
    pub fn path(&self) -> &str {
        &self.address.path
    }

    #[must_use]
    pub fn query(&self) -> &QueryParams {
        &self.address.query
    }
}

/// Observable value with a pull-based snapshot and push-based invalidation.
///
/// Any reactive UI binding can attach to this pair: subscribe to learn that
/// something changed, then pull the current value.
pub trait ExternalStore {
    type Snapshot;

    fn subscribe(&self, callback: Callback) -> Subscription;
    fn get_snapshot(&self) -> Self::Snapshot;
}

/// Handle returned by [`ExternalStore::subscribe`].
///
/// Unsubscribes when [`Subscription::unsubscribe`] is called or when dropped.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

#[derive(Default)]
struct Subscribers {
    next_id: u64,
    callbacks: Vec<(u64, Callback)>,
    attached: Vec<(NavigationEventKind, ListenerId)>,
}

struct StoreInner {
    platform: HostPlatform,
    config: ArcSwap<RouteConfig>,
    snapshot: ArcSwapOption<NavigationSnapshot>,
    publish: Mutex<()>,
    addresses: Mutex<AddressCache>,
    patterns: PatternCache,
    index: Mutex<HistoryIndexTracker>,
    subscribers: Mutex<Subscribers>,
}

/// Process- or session-wide navigation state shared by all consumers
#[derive(Clone)]
pub struct NavigationStore {
    inner: Arc<StoreInner>,
}

impl NavigationStore {
    pub fn new(platform: HostPlatform, config: RouteConfig) -> Self {
        Self::with_native_patterns(platform, config, None)
    }

    /// Create a store whose pattern cache prefers the host's native primitive
    pub fn with_native_patterns(
        platform: HostPlatform,
        config: RouteConfig,
        native: Option<Arc<dyn NativePatternFactory>>,
    ) -> Self {
        let addresses = AddressCache::new(config.effective_cache_limit(), &config.origin);
        info!(
            platform = platform.kind(),
            url_cache_limit = config.effective_cache_limit(),
            base = ?config.base,
            "Navigation store created"
        );
        Self {
            inner: Arc::new(StoreInner {
                platform,
                config: ArcSwap::from_pointee(config),
                snapshot: ArcSwapOption::empty(),
                publish: Mutex::new(()),
                addresses: Mutex::new(addresses),
                patterns: PatternCache::new(native),
                index: Mutex::new(HistoryIndexTracker::new()),
                subscribers: Mutex::new(Subscribers::default()),
            }),
        }
    }

    #[must_use]
    pub fn platform(&self) -> &HostPlatform {
        &self.inner.platform
    }

    /// Current configuration
    #[must_use]
    pub fn config(&self) -> Arc<RouteConfig> {
        self.inner.config.load_full()
    }

    /// Swap the configuration and resize the address cache.
    ///
    /// Base and initial location feed every consumer's route state, so the
    /// snapshot is recomputed and subscribers are notified once.
    pub fn reconfigure(&self, config: RouteConfig) {
        {
            let mut addresses = self.inner.addresses.lock();
            if config.origin == self.inner.config.load().origin {
                addresses.resize(config.effective_cache_limit());
            } else {
                *addresses = AddressCache::new(config.effective_cache_limit(), &config.origin);
            }
        }
        info!(
            url_cache_limit = config.effective_cache_limit(),
            base = ?config.base,
            "Navigation store reconfigured"
        );
        self.inner.config.store(Arc::new(config));
        self.inner.snapshot.store(None);
        self.publish();
    }

    #[must_use]
    pub fn patterns(&self) -> &PatternCache {
        &self.inner.patterns
    }

    /// Number of parsed addresses currently cached
    #[must_use]
    pub fn address_cache_len(&self) -> usize {
        self.inner.addresses.lock().len()
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.lock().callbacks.len()
    }

    /// Whether the platform listener pair is currently attached
    #[must_use]
    pub fn is_attached(&self) -> bool {
        !self.inner.subscribers.lock().attached.is_empty()
    }

    /// Register `callback`; the first subscriber attaches the platform listeners
    pub fn subscribe(&self, callback: Callback) -> Subscription {
        let id = {
            let mut subs = self.inner.subscribers.lock();
            let id = subs.next_id;
            subs.next_id += 1;
            subs.callbacks.push((id, callback));
            if subs.callbacks.len() == 1 {
                self.inner.attach(&mut subs);
            }
            debug!(subscriber = id, subscribers = subs.callbacks.len(), "Subscribed");
            id
        };

        let weak = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.unsubscribe(id);
            }
        })
    }

    /// Current snapshot.
    ///
    /// While the listener pair is attached the published snapshot is
    /// returned as is; otherwise nothing would invalidate it, so it is
    /// recomputed on every call.
    pub fn get_snapshot(&self) -> Arc<NavigationSnapshot> {
        if self.is_attached() {
            if let Some(current) = self.inner.snapshot.load_full() {
                return current;
            }
        }
        self.inner.refresh()
    }

    /// Recompute the snapshot and notify every subscriber
    pub fn publish(&self) {
        self.inner.refresh();
        self.inner.notify();
    }

    /// Resolve the current snapshot for one consumer
    pub fn resolve(&self, prefix: &str, matcher: Option<&RouteMatcher>) -> RouteState {
        let snapshot = self.get_snapshot();
        let config = self.config();
        let mut index = self.inner.index.lock();
        resolver::resolve(
            &snapshot,
            prefix,
            matcher,
            &self.inner.patterns,
            &mut index,
            config.logger.as_ref(),
        )
    }

    /// Position of the snapshot's current entry in its entry list
    pub fn history_index(&self, snapshot: &NavigationSnapshot) -> Option<usize> {
        self.inner
            .index
            .lock()
            .index_of(&snapshot.current_entry_id, &snapshot.entry_ids)
    }

    /// Reset hook: clear the address, pattern and index caches and the cached snapshot
    pub fn clear_route_caches(&self) {
        self.inner.addresses.lock().clear();
        self.inner.patterns.clear();
        self.inner.index.lock().clear();
        self.inner.snapshot.store(None);
        info!("Route caches cleared");
    }
}

impl ExternalStore for NavigationStore {
    type Snapshot = Arc<NavigationSnapshot>;

    fn subscribe(&self, callback: Callback) -> Subscription {
        NavigationStore::subscribe(self, callback)
    }

    fn get_snapshot(&self) -> Arc<NavigationSnapshot> {
        NavigationStore::get_snapshot(self)
    }
}

impl StoreInner {
    fn attach(self: &Arc<Self>, subs: &mut Subscribers) {
        let Some(backend) = self.platform.as_entry_list() else {
            return;
        };
        let weak: Weak<StoreInner> = Arc::downgrade(self);
        let listener: EventListener = Arc::new(move |kind| {
            if let Some(inner) = weak.upgrade() {
                inner.on_event(kind);
            }
        });
        for kind in NavigationEventKind::ALL {
            let id = backend.add_listener(kind, Arc::clone(&listener));
            subs.attached.push((kind, id));
        }
        debug!(listeners = subs.attached.len(), "Platform listeners attached");
    }

    fn detach(&self, subs: &mut Subscribers) {
        if let Some(backend) = self.platform.as_entry_list() {
            for (kind, id) in subs.attached.drain(..) {
                backend.remove_listener(kind, id);
            }
            debug!("Platform listeners detached");
        }
        subs.attached.clear();
    }

    fn unsubscribe(&self, id: u64) {
        let mut subs = self.subscribers.lock();
        let before = subs.callbacks.len();
        subs.callbacks.retain(|(sid, _)| *sid != id);
        if subs.callbacks.len() == before {
            return;
        }
        debug!(subscriber = id, subscribers = subs.callbacks.len(), "Unsubscribed");
        if subs.callbacks.is_empty() {
            self.detach(&mut subs);
        }
    }

    fn on_event(&self, kind: NavigationEventKind) {
        debug!(event = kind.as_str(), "Platform navigation event");
        self.refresh();
        self.notify();
    }

    fn notify(&self) {
        // callbacks may subscribe or unsubscribe; call them without the lock
        let callbacks: Vec<Callback> = self
            .subscribers
            .lock()
            .callbacks
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();
        for callback in callbacks {
            callback();
        }
    }

    fn refresh(&self) -> Arc<NavigationSnapshot> {
        let _guard = self.publish.lock();
        let previous = self.snapshot.load_full();
        let next = self.compute(previous.as_deref());

        if let Some(previous) = previous {
            if *previous == next {
                return previous;
            }
        }
        let next = Arc::new(next);
        self.snapshot.store(Some(Arc::clone(&next)));
        debug!(
            entry = %next.current_entry_id,
            address = %next.raw_address,
            entries = next.entry_ids.len(),
            "Snapshot published"
        );
        next
    }

    fn compute(&self, previous: Option<&NavigationSnapshot>) -> NavigationSnapshot {
        let config = self.config.load();
        let fallback = || {
            config
                .initial_location
                .clone()
                .unwrap_or_else(|| "/".to_string())
        };

        let (current_entry_id, back, forward, ids, raw_address, entry_state) = match &self.platform
        {
            HostPlatform::EntryList(backend) => {
                let entry = backend.current_entry();
                let (id, url, state) = match entry {
                    Some(e) => (e.id, e.url, e.state),
                    None => (SYNTHETIC_ENTRY_ID.to_string(), None, None),
                };
                (
                    id,
                    backend.can_go_back(),
                    backend.can_go_forward(),
                    backend.entry_ids(),
                    url.unwrap_or_else(fallback),
                    state,
                )
            }
            HostPlatform::Linear(backend) => (
                SYNTHETIC_ENTRY_ID.to_string(),
                false,
                false,
                vec![SYNTHETIC_ENTRY_ID.to_string()],
                backend.href().unwrap_or_else(fallback),
                backend.state(),
            ),
            HostPlatform::Detached => (
                SYNTHETIC_ENTRY_ID.to_string(),
                false,
                false,
                vec![SYNTHETIC_ENTRY_ID.to_string()],
                fallback(),
                None,
            ),
        };

        // keep the previous allocation so the index tracker sees the same identity
        let entry_ids: EntryIds = match previous {
            Some(prev) if prev.entry_ids[..] == ids[..] => Arc::clone(&prev.entry_ids),
            _ => ids.into(),
        };

        let address = self
            .addresses
            .lock()
            .parse(&raw_address, config.logger.as_ref());

        NavigationSnapshot {
            current_entry_id,
            can_go_back_flag: back,
            can_go_forward_flag: forward,
            entry_ids,
            raw_address,
            address,
            entry_state,
        }
    }
}

impl Drop for StoreInner {
    fn drop(&mut self) {
        let mut subs = std::mem::take(self.subscribers.get_mut());
        if !subs.attached.is_empty() {
            self.detach(&mut subs);
        }
    }
}
