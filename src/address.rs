//! # Address Cache Module
//!
//! Parses raw addresses (`http://host/a/b?x=1`, `/a/b?x=1`) into a path and
//! decoded query parameters, once per distinct address.
//!
//! ## Eviction
//!
//! The cache is a strict LRU bounded by [`crate::config::RouteConfig::url_cache_limit`]:
//! a hit promotes the entry to most-recently-used, and inserting into a full
//! cache evicts the least-recently-used entry. A failed parse is logged and
//! answered with the root path, but never inserted, so a transient bad
//! address cannot pin itself in the cache.

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::debug;
use url::Url;

use crate::config::DEFAULT_ORIGIN;
use crate::logging::Logger;

/// Decoded query string, in document order.
///
/// Keys may repeat (`?tag=a&tag=b`); [`QueryParams::get`] returns the first
/// value, [`QueryParams::get_all`] every value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }

    /// First value for `key`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// All values for `key`, in order
    #[must_use]
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Re-encode as `application/x-www-form-urlencoded` (no leading `?`)
    #[must_use]
    pub fn to_query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }
}

/// Path and query of one parsed address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAddress {
    /// Percent-encoded path, always starting with `/`
    pub path: String,
    /// Decoded query parameters
    pub query: QueryParams,
}

impl ParsedAddress {
    /// Representation of the root path `/` with no query
    #[must_use]
    pub fn root() -> Self {
        Self {
            path: "/".to_string(),
            query: QueryParams::default(),
        }
    }

    fn from_url(url: &Url) -> Self {
        Self {
            path: url.path().to_string(),
            query: QueryParams::new(url.query_pairs().into_owned().collect()),
        }
    }
}

/// Bounded, recency-ordered cache of parsed addresses
pub struct AddressCache {
    entries: LruCache<String, Arc<ParsedAddress>>,
    origin: Option<Url>,
}

impl AddressCache {
    /// Create a cache holding at most `capacity` entries (zero is treated as one).
    ///
    /// `origin` resolves root-relative addresses; an unparsable origin falls
    /// back to `http://localhost`.
    pub fn new(capacity: usize, origin: &str) -> Self {
        let origin = Url::parse(origin)
            .or_else(|_| Url::parse(DEFAULT_ORIGIN))
            .ok();
        Self {
            entries: LruCache::new(non_zero(capacity)),
            origin,
        }
    }

    /// Parse `raw`, consulting the cache first.
    ///
    /// Never fails: an address that cannot be parsed yields [`ParsedAddress::root`]
    /// and a `warn` through `logger`.
    pub fn parse(&mut self, raw: &str, logger: &dyn Logger) -> Arc<ParsedAddress> {
        if let Some(hit) = self.entries.get(raw) {
            debug!(address = %raw, "Address cache hit");
            return Arc::clone(hit);
        }

        match Url::options().base_url(self.origin.as_ref()).parse(raw) {
            Ok(url) => {
                let parsed = Arc::new(ParsedAddress::from_url(&url));
                if let Some((evicted, _)) = self.entries.push(raw.to_string(), Arc::clone(&parsed)) {
                    debug!(evicted = %evicted, "Address cache evicted LRU entry");
                }
                parsed
            }
            Err(e) => {
                logger.warn(
                    "Invalid URL",
                    &[("url", raw.to_string()), ("error", e.to_string())],
                );
                Arc::new(ParsedAddress::root())
            }
        }
    }

    /// Whether `raw` is currently cached (does not touch recency)
    #[must_use]
    pub fn contains(&self, raw: &str) -> bool {
        self.entries.contains(raw)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    /// Change the capacity, evicting LRU entries if it shrinks
    pub fn resize(&mut self, capacity: usize) {
        self.entries.resize(non_zero(capacity));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

fn non_zero(capacity: usize) -> NonZeroUsize {
    NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN)
}
