//! Entry-id → position lookup for the current history list.
//!
//! The map is rebuilt only when a *different* `entry_ids` allocation is seen
//! (compared with [`Arc::ptr_eq`]), so repeated resolutions against the same
//! snapshot cost one hash lookup each.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Ordered history-entry identifiers shared between snapshots
pub type EntryIds = Arc<[String]>;

#[derive(Default)]
pub struct HistoryIndexTracker {
    cached: Option<(EntryIds, HashMap<String, usize>)>,
    rebuilds: u64,
}

impl HistoryIndexTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Position of `entry_id` in `entry_ids`, or `None` if it is not listed
    pub fn index_of(&mut self, entry_id: &str, entry_ids: &EntryIds) -> Option<usize> {
        let stale = match &self.cached {
            Some((ids, _)) => !Arc::ptr_eq(ids, entry_ids),
            None => true,
        };

        if stale {
            let map: HashMap<String, usize> = entry_ids
                .iter()
                .enumerate()
                .map(|(index, id)| (id.clone(), index))
                .collect();
            self.rebuilds += 1;
            debug!(entries = entry_ids.len(), rebuilds = self.rebuilds, "History index rebuilt");
            self.cached = Some((Arc::clone(entry_ids), map));
        }

        self.cached
            .as_ref()
            .and_then(|(_, map)| map.get(entry_id).copied())
    }

    /// How many times the id map has been rebuilt
    #[must_use]
    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }

    pub fn clear(&mut self) {
        self.cached = None;
    }
}
