//! # Navigation Operations
//!
//! [`RouteHandle`] binds one consumer (its matcher and section) to a
//! [`NavigationStore`] and exposes the imperative operations.
//!
//! ## Failure semantics
//!
//! | Situation | Outcome |
//! |---|---|
//! | target not root-relative and not `http`/`https` | `warn`, no-op |
//! | `go(0)` | silent no-op |
//! | `go` with a non-finite, fractional or out-of-range delta | `warn`, no-op |
//! | `go` past either end of the entry list | silent no-op |
//! | backend call fails or its commit rejects | `error`, no-op |
//! | linear history only | push/replace/traverse through the linear backend, then republish |
//! | no session history | no-op (`update_state` warns) |
//!
//! Nothing here returns an error to the caller; failures are visible only
//! through the configured [`crate::logging::Logger`] and an unchanged snapshot.
//!
//! ## Example
//!
//! ```rust
//! use navroute::{HostPlatform, NavigationStore, RouteConfig, RouteHandle};
//!
//! let store = NavigationStore::new(
//!     HostPlatform::Detached,
//!     RouteConfig::default().with_initial_location("http://localhost/users/42"),
//! );
//! let route = RouteHandle::with_pattern(&store, "/users/:id");
//! let state = route.state();
//! assert_eq!(state.matched, Some(true));
//! assert_eq!(state.params["id"], "42");
//! ```

use serde_json::Value;
use std::sync::Arc;
use tracing::debug;
use url::Url;

use crate::config::HistoryMode;
use crate::platform::{HostPlatform, NavigateRequest};
use crate::prefix::{self, PrefixOverride};
use crate::resolver::{PathMatch, RouteMatcher, RouteState};
use crate::store::{Callback, NavigationStore, Subscription};

/// Largest integer an `f64` represents exactly (2^53 - 1)
pub const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Per-consumer options
#[derive(Debug, Clone, Default)]
pub struct RouteOptions {
    pub matcher: Option<RouteMatcher>,
    /// Section appended to the global base for this consumer
    pub section: Option<String>,
    /// Case-insensitive pattern matching; ignored for custom matchers
    pub ignore_case: bool,
}

impl RouteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.matcher = Some(RouteMatcher::pattern(pattern));
        self
    }

    #[must_use]
    pub fn matcher<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> PathMatch + Send + Sync + 'static,
    {
        self.matcher = Some(RouteMatcher::custom(f));
        self
    }

    #[must_use]
    pub fn section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    #[must_use]
    pub fn ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }
}

/// Per-call options for [`RouteHandle::navigate`] and [`RouteHandle::replace`].
///
/// `base` and `section` distinguish "not given" (outer `None`) from
/// "given as nothing" (`Some(None)`): an explicit empty base writes without
/// any prefix, an explicit empty section writes relative to the app root.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavigateOptions {
    pub history: Option<HistoryMode>,
    pub state: Option<Value>,
    pub base: Option<Option<String>>,
    pub section: Option<Option<String>>,
}

impl NavigateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn history(mut self, mode: HistoryMode) -> Self {
        self.history = Some(mode);
        self
    }

    #[must_use]
    pub fn state(mut self, state: Value) -> Self {
        self.state = Some(state);
        self
    }

    /// Write under exactly this prefix, ignoring base and section
    #[must_use]
    pub fn base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(Some(base.into()));
        self
    }

    /// Write without any prefix
    #[must_use]
    pub fn without_base(mut self) -> Self {
        self.base = Some(None);
        self
    }

    /// Write under the global base plus this section
    #[must_use]
    pub fn section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(Some(section.into()));
        self
    }

    /// Write under the global base only
    #[must_use]
    pub fn app_root(mut self) -> Self {
        self.section = Some(None);
        self
    }

    /// Explicit base wins over explicit section
    #[must_use]
    pub fn prefix_override(&self) -> PrefixOverride {
        match (&self.base, &self.section) {
            (Some(base), _) => PrefixOverride::Base(base.clone()),
            (None, Some(section)) => PrefixOverride::Section(section.clone()),
            (None, None) => PrefixOverride::Inherit,
        }
    }
}

/// Whether `target` may be dispatched: root-relative, or absolute `http`/`https`
#[must_use]
pub fn is_valid_target(target: &str) -> bool {
    if target.starts_with("//") {
        return false;
    }
    if target.starts_with('/') {
        return true;
    }
    match Url::parse(target) {
        Ok(url) => matches!(url.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

fn valid_steps(steps: f64) -> bool {
    steps.is_finite() && steps >= 0.0 && steps <= MAX_SAFE_INTEGER
}

/// One consumer's view of the navigation store
#[derive(Clone)]
pub struct RouteHandle {
    store: NavigationStore,
    matcher: Option<RouteMatcher>,
    section: Option<String>,
}

impl RouteHandle {
    /// A consumer with no matcher and no section
    pub fn new(store: &NavigationStore) -> Self {
        Self::with_options(store, RouteOptions::default())
    }

    pub fn with_pattern(store: &NavigationStore, pattern: impl Into<String>) -> Self {
        Self::with_options(store, RouteOptions::new().pattern(pattern))
    }

    pub fn with_matcher<F>(store: &NavigationStore, f: F) -> Self
    where
        F: Fn(&str) -> PathMatch + Send + Sync + 'static,
    {
        Self::with_options(store, RouteOptions::new().matcher(f))
    }

    pub fn with_options(store: &NavigationStore, options: RouteOptions) -> Self {
        let matcher = options
            .matcher
            .map(|m| m.ignore_case(options.ignore_case));
        Self {
            store: store.clone(),
            matcher,
            section: options.section.filter(|s| !s.is_empty()),
        }
    }

    #[must_use]
    pub fn store(&self) -> &NavigationStore {
        &self.store
    }

    /// This consumer's default prefix (global base + section)
    #[must_use]
    pub fn prefix(&self) -> String {
        let config = self.store.config();
        prefix::combine(config.base.as_deref(), self.section.as_deref())
    }

    /// Current route state for this consumer
    pub fn state(&self) -> RouteState {
        self.store.resolve(&self.prefix(), self.matcher.as_ref())
    }

    /// Be told whenever the route state may have changed
    pub fn subscribe(&self, callback: Callback) -> Subscription {
        self.store.subscribe(callback)
    }

    /// Navigate to `to`; resolves once the backend acknowledges the commit
    pub async fn navigate(&self, to: &str, options: NavigateOptions) {
        let config = self.store.config();
        let history = options
            .history
            .or(config.default_history)
            .unwrap_or_default();
        self.dispatch(to, history, options).await;
    }

    /// Navigate to `to` replacing the current entry; `options.history` is ignored
    pub async fn replace(&self, to: &str, options: NavigateOptions) {
        self.dispatch(to, HistoryMode::Replace, options).await;
    }

    async fn dispatch(&self, to: &str, history: HistoryMode, options: NavigateOptions) {
        let config = self.store.config();
        let logger = config.logger.as_ref();

        if !is_valid_target(to) {
            logger.warn("Invalid URL rejected", &[("url", to.to_string())]);
            return;
        }
        let prefix = prefix::resolve(
            config.base.as_deref(),
            self.section.as_deref(),
            &options.prefix_override(),
        );
        let url = prefix::apply_prefix(to, &prefix);
        debug!(url = %url, history = %history, "Navigating");

        let backend = match self.store.platform() {
            HostPlatform::EntryList(backend) => backend,
            HostPlatform::Linear(backend) => {
                let result = match history {
                    HistoryMode::Replace => backend.replace_state(&url, options.state),
                    HistoryMode::Push | HistoryMode::Auto => backend.push_state(&url, options.state),
                };
                match result {
                    // linear history emits no change event
                    Ok(()) => self.store.publish(),
                    Err(e) => logger.error(
                        "Navigation failed",
                        &[("url", url), ("error", e.to_string())],
                    ),
                }
                return;
            }
            HostPlatform::Detached => {
                debug!(url = %url, "Navigate ignored without session history");
                return;
            }
        };

        let request = NavigateRequest {
            history,
            state: options.state,
        };
        let commit = match backend.navigate(&url, request) {
            Ok(commit) => commit,
            Err(e) => {
                logger.error(
                    "Navigation failed",
                    &[("url", url), ("error", e.to_string())],
                );
                return;
            }
        };
        if let Err(e) = commit.await {
            logger.error(
                "Navigation commit rejected",
                &[("url", url), ("error", e.to_string())],
            );
        }
    }

    pub fn back(&self) {
        let logger = Arc::clone(&self.store.config().logger);
        let result = match self.store.platform() {
            HostPlatform::EntryList(backend) => backend.back(),
            HostPlatform::Linear(backend) => backend.back(),
            HostPlatform::Detached => return,
        };
        match result {
            Ok(()) => self.republish_linear(),
            Err(e) => logger.error("Back navigation failed", &[("error", e.to_string())]),
        }
    }

    pub fn forward(&self) {
        let logger = Arc::clone(&self.store.config().logger);
        let result = match self.store.platform() {
            HostPlatform::EntryList(backend) => backend.forward(),
            HostPlatform::Linear(backend) => backend.forward(),
            HostPlatform::Detached => return,
        };
        match result {
            Ok(()) => self.republish_linear(),
            Err(e) => logger.error("Forward navigation failed", &[("error", e.to_string())]),
        }
    }

    /// Move `delta` entries through history (negative = back)
    pub fn go(&self, delta: f64) {
        if delta == 0.0 {
            return;
        }
        let logger = Arc::clone(&self.store.config().logger);
        if !delta.is_finite() || delta.abs() > MAX_SAFE_INTEGER || delta.fract() != 0.0 {
            logger.warn("Invalid delta rejected", &[("delta", delta.to_string())]);
            return;
        }
        let delta = delta as i64;

        let result = match self.store.platform() {
            HostPlatform::EntryList(backend) => {
                let snapshot = self.store.get_snapshot();
                let Some(index) = self.store.history_index(&snapshot) else {
                    debug!(delta = delta, "Go ignored: current entry not in entry list");
                    return;
                };
                let target = index as i64 + delta;
                let Some(entry_id) = usize::try_from(target)
                    .ok()
                    .and_then(|t| snapshot.entry_ids.get(t))
                else {
                    debug!(delta = delta, index = index, "Go ignored: target out of range");
                    return;
                };
                backend.traverse_to(entry_id)
            }
            HostPlatform::Linear(backend) => backend.go(delta),
            HostPlatform::Detached => return,
        };
        match result {
            Ok(()) => self.republish_linear(),
            Err(e) => logger.error(
                "History traversal failed",
                &[("delta", delta.to_string()), ("error", e.to_string())],
            ),
        }
    }

    /// Linear history emits no change events, so subscribers hear about
    /// its traversals from here
    fn republish_linear(&self) {
        if self.store.platform().as_linear().is_some() {
            self.store.publish();
        }
    }

    /// Replace the current entry's state and republish the snapshot
    pub fn update_state(&self, state: Option<Value>) {
        let logger = Arc::clone(&self.store.config().logger);
        let result = match self.store.platform() {
            HostPlatform::EntryList(backend) => backend.update_current_entry(state),
            HostPlatform::Linear(backend) => {
                let href = self.store.get_snapshot().raw_address.clone();
                backend.replace_state(&href, state)
            }
            HostPlatform::Detached => {
                logger.warn(
                    "updateState requires session history",
                    &[("platform", self.store.platform().kind().to_string())],
                );
                return;
            }
        };
        match result {
            Ok(()) => self.store.publish(),
            Err(e) => logger.error("State update failed", &[("error", e.to_string())]),
        }
    }

    #[must_use]
    pub fn can_go_back(&self) -> bool {
        self.can_go_back_by(1.0)
    }

    #[must_use]
    pub fn can_go_forward(&self) -> bool {
        self.can_go_forward_by(1.0)
    }

    /// Whether at least `steps` entries exist before the current one
    #[must_use]
    pub fn can_go_back_by(&self, steps: f64) -> bool {
        self.available_steps(steps)
            .is_some_and(|(before, _)| before as f64 >= steps)
    }

    /// Whether at least `steps` entries exist after the current one
    #[must_use]
    pub fn can_go_forward_by(&self, steps: f64) -> bool {
        self.available_steps(steps)
            .is_some_and(|(_, after)| after as f64 >= steps)
    }

    /// Entries before and after the current one, if steps can be checked at all
    fn available_steps(&self, steps: f64) -> Option<(usize, usize)> {
        if !valid_steps(steps) {
            return None;
        }
        self.store.platform().as_entry_list()?;
        let snapshot = self.store.get_snapshot();
        let index = self.store.history_index(&snapshot)?;
        let after = snapshot.entry_ids.len().saturating_sub(index + 1);
        Some((index, after))
    }
}
