pub mod memory_navigation {
    use futures::future::{self, FutureExt};
    use navroute::error::BackendError;
    use navroute::platform::{
        CommitFuture, EntryListBackend, EventListener, HistoryEntry, ListenerId, NavigateRequest,
        NavigationEventKind,
    };
    use navroute::HistoryMode;
    use parking_lot::Mutex;
    use serde_json::Value;
    use std::sync::Arc;

    const ORIGIN: &str = "http://localhost";

    /// One recorded backend call
    #[allow(dead_code)]
    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        Navigate {
            url: String,
            history: HistoryMode,
            state: Option<Value>,
        },
        Back,
        Forward,
        TraverseTo(String),
        UpdateCurrentEntry(Option<Value>),
    }

    /// Failure to inject into the next mutating call
    #[allow(dead_code)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Failure {
        /// The call returns `Err` immediately
        Throw,
        /// `navigate` returns a commit future that rejects
        RejectCommit,
    }

    struct History {
        entries: Vec<HistoryEntry>,
        current: usize,
        next_key: u64,
    }

    impl History {
        fn key(&mut self) -> String {
            let key = format!("key-{}", self.next_key);
            self.next_key += 1;
            key
        }
    }

    /// In-memory entry-list backend that records calls and dispatches events
    pub struct MemoryNavigation {
        history: Mutex<History>,
        listeners: Mutex<Vec<(NavigationEventKind, ListenerId, EventListener)>>,
        next_listener: Mutex<u64>,
        calls: Mutex<Vec<Call>>,
        failure: Mutex<Option<Failure>>,
    }

    fn absolute(url: &str) -> String {
        if url.starts_with('/') {
            format!("{}{}", ORIGIN, url)
        } else {
            url.to_string()
        }
    }

    impl MemoryNavigation {
        /// A history with a single entry at `url`
        pub fn new(url: &str) -> Arc<Self> {
            Self::with_entries(&[url], 0)
        }

        /// A history with one entry per url, positioned at `current`
        pub fn with_entries(urls: &[&str], current: usize) -> Arc<Self> {
            let mut history = History {
                entries: Vec::new(),
                current,
                next_key: 0,
            };
            for url in urls {
                let id = history.key();
                history.entries.push(HistoryEntry {
                    id,
                    url: Some(absolute(url)),
                    state: None,
                });
            }
            Arc::new(Self {
                history: Mutex::new(history),
                listeners: Mutex::new(Vec::new()),
                next_listener: Mutex::new(0),
                calls: Mutex::new(Vec::new()),
                failure: Mutex::new(None),
            })
        }

        #[allow(dead_code)]
        pub fn fail_next(&self, failure: Failure) {
            *self.failure.lock() = Some(failure);
        }

        #[allow(dead_code)]
        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().clone()
        }

        #[allow(dead_code)]
        pub fn traversal_count(&self) -> usize {
            self.calls
                .lock()
                .iter()
                .filter(|c| matches!(c, Call::TraverseTo(_) | Call::Back | Call::Forward))
                .count()
        }

        #[allow(dead_code)]
        pub fn navigated_urls(&self) -> Vec<String> {
            self.calls
                .lock()
                .iter()
                .filter_map(|c| match c {
                    Call::Navigate { url, .. } => Some(url.clone()),
                    _ => None,
                })
                .collect()
        }

        /// Listeners currently registered for `kind`
        #[allow(dead_code)]
        pub fn listener_count(&self, kind: NavigationEventKind) -> usize {
            self.listeners
                .lock()
                .iter()
                .filter(|(k, _, _)| *k == kind)
                .count()
        }

        #[allow(dead_code)]
        pub fn total_listeners(&self) -> usize {
            self.listeners.lock().len()
        }

        #[allow(dead_code)]
        pub fn current_index(&self) -> usize {
            self.history.lock().current
        }

        #[allow(dead_code)]
        pub fn len(&self) -> usize {
            self.history.lock().entries.len()
        }

        /// Deliver one event to every listener registered for `kind`
        pub fn dispatch(&self, kind: NavigationEventKind) {
            let targets: Vec<EventListener> = self
                .listeners
                .lock()
                .iter()
                .filter(|(k, _, _)| *k == kind)
                .map(|(_, _, l)| Arc::clone(l))
                .collect();
            for listener in targets {
                listener(kind);
            }
        }

        fn take_failure(&self) -> Option<Failure> {
            self.failure.lock().take()
        }

        fn record(&self, call: Call) {
            self.calls.lock().push(call);
        }

        fn committed(&self) {
            self.dispatch(NavigationEventKind::Navigate);
            self.dispatch(NavigationEventKind::CurrentEntryChange);
        }
    }

    impl EntryListBackend for MemoryNavigation {
        fn current_entry(&self) -> Option<HistoryEntry> {
            let history = self.history.lock();
            history.entries.get(history.current).cloned()
        }

        fn entry_ids(&self) -> Vec<String> {
            self.history
                .lock()
                .entries
                .iter()
                .map(|e| e.id.clone())
                .collect()
        }

        fn can_go_back(&self) -> bool {
            self.history.lock().current > 0
        }

        fn can_go_forward(&self) -> bool {
            let history = self.history.lock();
            history.current + 1 < history.entries.len()
        }

        fn navigate(
            &self,
            url: &str,
            request: NavigateRequest,
        ) -> Result<CommitFuture, BackendError> {
            self.record(Call::Navigate {
                url: url.to_string(),
                history: request.history,
                state: request.state.clone(),
            });
            match self.take_failure() {
                Some(Failure::Throw) => {
                    return Err(BackendError::call("navigate", "navigation aborted"))
                }
                Some(Failure::RejectCommit) => {
                    return Ok(future::ready(Err(BackendError::rejected("commit failed"))).boxed())
                }
                None => {}
            }

            {
                let mut history = self.history.lock();
                let entry_url = Some(absolute(url));
                match request.history {
                    HistoryMode::Replace => {
                        let current = history.current;
                        let entry = &mut history.entries[current];
                        entry.url = entry_url;
                        entry.state = request.state;
                    }
                    HistoryMode::Push | HistoryMode::Auto => {
                        let id = history.key();
                        let keep = history.current + 1;
                        history.entries.truncate(keep);
                        history.entries.push(HistoryEntry {
                            id,
                            url: entry_url,
                            state: request.state,
                        });
                        history.current = keep;
                    }
                }
            }
            self.committed();
            Ok(future::ready(Ok(())).boxed())
        }

        fn back(&self) -> Result<(), BackendError> {
            self.record(Call::Back);
            if self.take_failure().is_some() {
                return Err(BackendError::call("back", "traversal aborted"));
            }
            {
                let mut history = self.history.lock();
                if history.current == 0 {
                    return Err(BackendError::call("back", "cannot go back"));
                }
                history.current -= 1;
            }
            self.committed();
            Ok(())
        }

        fn forward(&self) -> Result<(), BackendError> {
            self.record(Call::Forward);
            if self.take_failure().is_some() {
                return Err(BackendError::call("forward", "traversal aborted"));
            }
            {
                let mut history = self.history.lock();
                if history.current + 1 >= history.entries.len() {
                    return Err(BackendError::call("forward", "cannot go forward"));
                }
                history.current += 1;
            }
            self.committed();
            Ok(())
        }

        fn traverse_to(&self, entry_id: &str) -> Result<(), BackendError> {
            self.record(Call::TraverseTo(entry_id.to_string()));
            if self.take_failure().is_some() {
                return Err(BackendError::call("traverse_to", "traversal aborted"));
            }
            {
                let mut history = self.history.lock();
                let Some(index) = history.entries.iter().position(|e| e.id == entry_id) else {
                    return Err(BackendError::call("traverse_to", "unknown entry"));
                };
                history.current = index;
            }
            self.committed();
            Ok(())
        }

        fn update_current_entry(&self, state: Option<Value>) -> Result<(), BackendError> {
            self.record(Call::UpdateCurrentEntry(state.clone()));
            if self.take_failure().is_some() {
                return Err(BackendError::call("update_current_entry", "update aborted"));
            }
            let mut history = self.history.lock();
            let current = history.current;
            history.entries[current].state = state;
            Ok(())
        }

        fn add_listener(&self, kind: NavigationEventKind, listener: EventListener) -> ListenerId {
            let id = {
                let mut next = self.next_listener.lock();
                *next += 1;
                ListenerId(*next)
            };
            self.listeners.lock().push((kind, id, listener));
            id
        }

        fn remove_listener(&self, kind: NavigationEventKind, id: ListenerId) {
            self.listeners
                .lock()
                .retain(|(k, lid, _)| !(*k == kind && *lid == id));
        }
    }
}

// resolver tests never build a linear history
#[allow(dead_code)]
pub mod memory_linear {
    use navroute::error::BackendError;
    use navroute::platform::LinearHistoryBackend;
    use parking_lot::Mutex;
    use serde_json::Value;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    struct Linear {
        entries: Vec<(String, Option<Value>)>,
        current: usize,
    }

    /// In-memory linear history; records every traversal delta
    pub struct MemoryLinearHistory {
        inner: Mutex<Linear>,
        deltas: Mutex<Vec<i64>>,
        fail_next: AtomicBool,
    }

    fn absolute(url: &str) -> String {
        if url.starts_with('/') {
            format!("http://localhost{url}")
        } else {
            url.to_string()
        }
    }

    impl MemoryLinearHistory {
        /// `state` belongs to the entry at `current`
        pub fn new(urls: &[&str], current: usize, state: Option<Value>) -> Arc<Self> {
            let entries = urls
                .iter()
                .enumerate()
                .map(|(i, u)| (u.to_string(), if i == current { state.clone() } else { None }))
                .collect();
            Arc::new(Self {
                inner: Mutex::new(Linear { entries, current }),
                deltas: Mutex::new(Vec::new()),
                fail_next: AtomicBool::new(false),
            })
        }

        /// Make the next push or replace fail
        pub fn fail_next(&self) {
            self.fail_next.store(true, Ordering::SeqCst);
        }

        pub fn deltas(&self) -> Vec<i64> {
            self.deltas.lock().clone()
        }

        pub fn len(&self) -> usize {
            self.inner.lock().entries.len()
        }

        fn check(&self, operation: &'static str) -> Result<(), BackendError> {
            if self.fail_next.swap(false, Ordering::SeqCst) {
                return Err(BackendError::call(operation, "security error"));
            }
            Ok(())
        }
    }

    impl LinearHistoryBackend for MemoryLinearHistory {
        fn href(&self) -> Option<String> {
            let inner = self.inner.lock();
            inner.entries.get(inner.current).map(|(url, _)| url.clone())
        }

        fn state(&self) -> Option<Value> {
            let inner = self.inner.lock();
            inner.entries.get(inner.current).and_then(|(_, state)| state.clone())
        }

        fn push_state(&self, url: &str, state: Option<Value>) -> Result<(), BackendError> {
            self.check("pushState")?;
            let mut inner = self.inner.lock();
            let keep = inner.current + 1;
            inner.entries.truncate(keep);
            inner.entries.push((absolute(url), state));
            inner.current = keep;
            Ok(())
        }

        fn replace_state(&self, url: &str, state: Option<Value>) -> Result<(), BackendError> {
            self.check("replaceState")?;
            let mut inner = self.inner.lock();
            let current = inner.current;
            if let Some(entry) = inner.entries.get_mut(current) {
                *entry = (absolute(url), state);
            }
            Ok(())
        }

        fn back(&self) -> Result<(), BackendError> {
            self.go(-1)
        }

        fn forward(&self) -> Result<(), BackendError> {
            self.go(1)
        }

        fn go(&self, delta: i64) -> Result<(), BackendError> {
            self.deltas.lock().push(delta);
            let mut inner = self.inner.lock();
            let target = inner.current as i64 + delta;
            // out-of-range traversals are ignored, as a browser does
            if target >= 0 && (target as usize) < inner.entries.len() {
                inner.current = target as usize;
            }
            Ok(())
        }
    }
}

pub mod recording_logger {
    use navroute::logging::{LogFields, Logger};
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Level {
        Debug,
        Info,
        Warn,
        Error,
    }

    #[derive(Debug, Clone)]
    pub struct Record {
        pub level: Level,
        pub message: String,
        #[allow(dead_code)]
        pub fields: Vec<(String, String)>,
    }

    /// Logger that keeps every call for inspection
    #[derive(Default)]
    pub struct RecordingLogger {
        records: Mutex<Vec<Record>>,
    }

    impl RecordingLogger {
        pub fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        #[allow(dead_code)]
        pub fn records(&self) -> Vec<Record> {
            self.records.lock().clone()
        }

        #[allow(dead_code)]
        pub fn count(&self, level: Level) -> usize {
            self.records.lock().iter().filter(|r| r.level == level).count()
        }

        pub fn messages(&self, level: Level) -> Vec<String> {
            self.records
                .lock()
                .iter()
                .filter(|r| r.level == level)
                .map(|r| r.message.clone())
                .collect()
        }

        #[allow(dead_code)]
        pub fn is_empty(&self) -> bool {
            self.records.lock().is_empty()
        }

        fn push(&self, level: Level, message: &str, fields: LogFields<'_>) {
            self.records.lock().push(Record {
                level,
                message: message.to_string(),
                fields: fields
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.clone()))
                    .collect(),
            });
        }
    }

    impl Logger for RecordingLogger {
        fn debug(&self, message: &str, fields: LogFields<'_>) {
            self.push(Level::Debug, message, fields);
        }

        fn info(&self, message: &str, fields: LogFields<'_>) {
            self.push(Level::Info, message, fields);
        }

        fn warn(&self, message: &str, fields: LogFields<'_>) {
            self.push(Level::Warn, message, fields);
        }

        fn error(&self, message: &str, fields: LogFields<'_>) {
            self.push(Level::Error, message, fields);
        }
    }
}

pub mod fixtures {
    use super::memory_linear::MemoryLinearHistory;
    use super::memory_navigation::MemoryNavigation;
    use super::recording_logger::RecordingLogger;
    use navroute::{HostPlatform, NavigationStore, RouteConfig};
    use std::sync::Arc;

    /// Store over an in-memory entry list, logging into a `RecordingLogger`
    pub fn entry_list_store(
        nav: &Arc<MemoryNavigation>,
        config: RouteConfig,
    ) -> (NavigationStore, Arc<RecordingLogger>) {
        let logger = RecordingLogger::new();
        let store = NavigationStore::new(
            HostPlatform::entry_list(nav.clone()),
            config.with_logger(logger.clone()),
        );
        (store, logger)
    }

    #[allow(dead_code)]
    pub fn linear_store(
        history: &Arc<MemoryLinearHistory>,
        config: RouteConfig,
    ) -> (NavigationStore, Arc<RecordingLogger>) {
        let logger = RecordingLogger::new();
        let store = NavigationStore::new(
            HostPlatform::linear(history.clone()),
            config.with_logger(logger.clone()),
        );
        (store, logger)
    }

    pub fn detached_store(config: RouteConfig) -> (NavigationStore, Arc<RecordingLogger>) {
        let logger = RecordingLogger::new();
        let store = NavigationStore::new(HostPlatform::Detached, config.with_logger(logger.clone()));
        (store, logger)
    }
}
