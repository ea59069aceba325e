//! # navroute
//!
//! **navroute** keeps a consistent, reactive picture of "where the
//! application currently is" (address, path, query, history position,
//! per-entry state) and offers a small set of imperative operations to move
//! through session history, over whichever history facility the host
//! provides.
//!
//! ## Architecture
//!
//! - **[`address`]** - bounded LRU cache of parsed addresses
//! - **[`pattern`]** - path-pattern compiler with a native-primitive hook and a regex fallback
//! - **[`history_index`]** - entry id → position lookup
//! - **[`platform`]** - the host's history surface: entry-list, linear, or none
//! - **[`store`]** - the snapshot store: one platform subscription, many consumers
//! - **[`resolver`]** - snapshot → consumer route state
//! - **[`prefix`]** - base/section prefix composition
//! - **[`navigation`]** - per-consumer handle with navigate/back/forward/go/update-state
//! - **[`config`]**, **[`logging`]**, **[`error`]** - configuration, logger contract, typed errors
//!
//! ### Data Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Host as Host platform
//!     participant Store as NavigationStore
//!     participant Cache as AddressCache
//!     participant Handle as RouteHandle
//!     participant Patterns as PatternCache
//!
//!     Host->>Store: navigate / currententrychange
//!     Store->>Cache: parse(current address)
//!     Cache-->>Store: path + query
//!     Store->>Handle: notify (registration order)
//!     Handle->>Store: state()
//!     Store->>Patterns: get_or_compile(pattern)
//!     Patterns-->>Store: Matcher
//!     Store-->>Handle: RouteState
//!     Handle->>Host: navigate(prefix + target)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use navroute::{HostPlatform, NavigationStore, RouteConfig, RouteHandle, RouteOptions};
//!
//! let config = RouteConfig::default()
//!     .with_base("/app")
//!     .with_initial_location("http://localhost/app/dashboard/settings");
//! let store = NavigationStore::new(HostPlatform::Detached, config);
//!
//! let route = RouteHandle::with_options(
//!     &store,
//!     RouteOptions::new().pattern("/:page").section("/dashboard"),
//! );
//! let state = route.state();
//! assert_eq!(state.pathname, "/settings");
//! assert_eq!(state.params["page"], "settings");
//! ```
//!
//! ## Failure Model
//!
//! No public operation returns an error for a rejected target, a bad delta,
//! or a failing backend. Those are reported through the configured
//! [`logging::Logger`] and leave the observable route state unchanged.

pub mod address;
pub mod cli;
pub mod config;
pub mod error;
pub mod history_index;
pub mod logging;
pub mod navigation;
pub mod pattern;
pub mod platform;
pub mod prefix;
pub mod resolver;
pub mod store;

pub use address::{AddressCache, ParsedAddress, QueryParams};
pub use config::{HistoryMode, RouteConfig};
pub use error::{BackendError, PatternError};
pub use logging::{Logger, TracingLogger};
pub use navigation::{NavigateOptions, RouteHandle, RouteOptions};
pub use pattern::{Matcher, NativePattern, NativePatternFactory, PatternCache, RouteParams};
pub use platform::{
    EntryListBackend, HistoryEntry, HostPlatform, LinearHistoryBackend, NavigationEventKind,
};
pub use resolver::{PathMatch, RouteMatcher, RouteState};
pub use store::{ExternalStore, NavigationSnapshot, NavigationStore, Subscription};
