//! Process-wide cache of compiled patterns.
//!
//! Keyed by `(pattern text, ignore_case)`; the two case modes live in
//! separate maps so `/Docs/:slug` compiled case-insensitively never answers a
//! case-sensitive request. Entries live until [`PatternCache::clear`].

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use super::{compile, Matcher, NativePatternFactory};
use crate::error::PatternError;

#[derive(Default)]
struct Slots {
    case_sensitive: HashMap<String, Arc<Matcher>>,
    case_insensitive: HashMap<String, Arc<Matcher>>,
}

impl Slots {
    fn map(&self, ignore_case: bool) -> &HashMap<String, Arc<Matcher>> {
        if ignore_case {
            &self.case_insensitive
        } else {
            &self.case_sensitive
        }
    }

    fn map_mut(&mut self, ignore_case: bool) -> &mut HashMap<String, Arc<Matcher>> {
        if ignore_case {
            &mut self.case_insensitive
        } else {
            &mut self.case_sensitive
        }
    }
}

/// Thread-safe cache of compiled [`Matcher`]s
pub struct PatternCache {
    slots: RwLock<Slots>,
    native: Option<Arc<dyn NativePatternFactory>>,
}

impl Default for PatternCache {
    fn default() -> Self {
        Self::new(None)
    }
}

impl PatternCache {
    pub fn new(native: Option<Arc<dyn NativePatternFactory>>) -> Self {
        Self {
            slots: RwLock::new(Slots::default()),
            native,
        }
    }

    /// Get a cached matcher or compile and cache a new one.
    ///
    /// A failed compile is returned and not cached.
    pub fn get_or_compile(
        &self,
        pattern: &str,
        ignore_case: bool,
    ) -> Result<Arc<Matcher>, PatternError> {
        // Fast path: read lock only
        if let Some(hit) = self.slots.read().map(ignore_case).get(pattern) {
            debug!(pattern = %pattern, ignore_case = ignore_case, "Pattern cache hit");
            return Ok(Arc::clone(hit));
        }

        let compiled = Arc::new(compile(pattern, ignore_case, self.native.as_deref())?);

        let mut slots = self.slots.write();
        let map = slots.map_mut(ignore_case);
        // Another caller may have compiled while we waited for the write lock
        if let Some(existing) = map.get(pattern) {
            return Ok(Arc::clone(existing));
        }
        map.insert(pattern.to_string(), Arc::clone(&compiled));
        info!(
            pattern = %pattern,
            ignore_case = ignore_case,
            native = compiled.is_native(),
            cache_size = slots.case_sensitive.len() + slots.case_insensitive.len(),
            "Pattern compiled and cached"
        );
        Ok(compiled)
    }

    /// Number of cached matchers across both case modes
    #[must_use]
    pub fn len(&self) -> usize {
        let slots = self.slots.read();
        slots.case_sensitive.len() + slots.case_insensitive.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn contains(&self, pattern: &str, ignore_case: bool) -> bool {
        self.slots.read().map(ignore_case).contains_key(pattern)
    }

    pub fn clear(&self) {
        let mut slots = self.slots.write();
        slots.case_sensitive.clear();
        slots.case_insensitive.clear();
        info!("Pattern cache cleared");
    }
}
