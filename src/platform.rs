//! # Platform Module
//!
//! The host's session-history surface, modelled as one capability set with
//! two variants instead of feature checks scattered through every operation.
//!
//! | Variant | Capabilities |
//! |---|---|
//! | [`HostPlatform::EntryList`] | entry list with stable ids, per-entry state, traversal by id, push/replace/auto navigation with a deferred commit, change events |
//! | [`HostPlatform::Linear`] | current document address and state, push/replace with state, back/forward/go-by-delta |
//! | [`HostPlatform::Detached`] | nothing (server or headless rendering) |
//!
//! Backends report failures as [`BackendError`]; the navigation layer logs
//! and absorbs them.

use futures::future::BoxFuture;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::config::HistoryMode;
use crate::error::BackendError;

/// Change notifications delivered by an entry-list backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavigationEventKind {
    /// A navigation was committed
    Navigate,
    /// The current entry changed (including traversals)
    CurrentEntryChange,
}

impl NavigationEventKind {
    pub const ALL: [NavigationEventKind; 2] = [
        NavigationEventKind::Navigate,
        NavigationEventKind::CurrentEntryChange,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NavigationEventKind::Navigate => "navigate",
            NavigationEventKind::CurrentEntryChange => "currententrychange",
        }
    }
}

/// Callback registered with a backend for one event kind
pub type EventListener = Arc<dyn Fn(NavigationEventKind) + Send + Sync>;

/// Backend-issued handle for a registered listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Deferred "address committed" signal returned by [`EntryListBackend::navigate`]
pub type CommitFuture = BoxFuture<'static, Result<(), BackendError>>;

/// One history entry as reported by the backend
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub id: String,
    /// Full address; `None` for entries the backend cannot expose
    pub url: Option<String>,
    /// Opaque per-entry state
    pub state: Option<Value>,
}

/// Options passed with a push/replace/auto navigation
#[derive(Debug, Clone, PartialEq)]
pub struct NavigateRequest {
    pub history: HistoryMode,
    pub state: Option<Value>,
}

/// Entry-list session history (the modern backend)
pub trait EntryListBackend: Send + Sync {
    fn current_entry(&self) -> Option<HistoryEntry>;
    /// Ids of all entries, oldest first
    fn entry_ids(&self) -> Vec<String>;
    fn can_go_back(&self) -> bool;
    fn can_go_forward(&self) -> bool;
    /// Start a navigation. `Err` means the call failed outright; the returned
    /// future resolves when the address is committed or rejects.
    fn navigate(&self, url: &str, request: NavigateRequest) -> Result<CommitFuture, BackendError>;
    fn back(&self) -> Result<(), BackendError>;
    fn forward(&self) -> Result<(), BackendError>;
    fn traverse_to(&self, entry_id: &str) -> Result<(), BackendError>;
    /// Replace the current entry's state without navigating. Emits no event.
    fn update_current_entry(&self, state: Option<Value>) -> Result<(), BackendError>;
    fn add_listener(&self, kind: NavigationEventKind, listener: EventListener) -> ListenerId;
    fn remove_listener(&self, kind: NavigationEventKind, id: ListenerId);
}

/// Linear session history (the legacy backend)
pub trait LinearHistoryBackend: Send + Sync {
    /// Current document address, if any
    fn href(&self) -> Option<String>;
    fn state(&self) -> Option<Value>;
    /// Append an entry and make it current. Emits no event.
    fn push_state(&self, url: &str, state: Option<Value>) -> Result<(), BackendError>;
    /// Overwrite the current entry's address and state. Emits no event.
    fn replace_state(&self, url: &str, state: Option<Value>) -> Result<(), BackendError>;
    fn back(&self) -> Result<(), BackendError>;
    fn forward(&self) -> Result<(), BackendError>;
    fn go(&self, delta: i64) -> Result<(), BackendError>;
}

/// Whichever history facility the host exposes
#[derive(Clone, Default)]
pub enum HostPlatform {
    EntryList(Arc<dyn EntryListBackend>),
    Linear(Arc<dyn LinearHistoryBackend>),
    #[default]
    Detached,
}

impl HostPlatform {
    pub fn entry_list(backend: Arc<dyn EntryListBackend>) -> Self {
        HostPlatform::EntryList(backend)
    }

    pub fn linear(backend: Arc<dyn LinearHistoryBackend>) -> Self {
        HostPlatform::Linear(backend)
    }

    /// The entry-list backend, if present
    #[must_use]
    pub fn as_entry_list(&self) -> Option<&Arc<dyn EntryListBackend>> {
        match self {
            HostPlatform::EntryList(backend) => Some(backend),
            _ => None,
        }
    }

    /// The linear backend, if present
    #[must_use]
    pub fn as_linear(&self) -> Option<&Arc<dyn LinearHistoryBackend>> {
        match self {
            HostPlatform::Linear(backend) => Some(backend),
            _ => None,
        }
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            HostPlatform::EntryList(_) => "entry_list",
            HostPlatform::Linear(_) => "linear",
            HostPlatform::Detached => "detached",
        }
    }
}

impl fmt::Debug for HostPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostPlatform::{}", self.kind())
    }
}
