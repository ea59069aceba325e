//! # Route Resolver
//!
//! Turns a [`NavigationSnapshot`] into the consumer-facing [`RouteState`].
//!
//! ## Steps
//!
//! 1. Strip the consumer's prefix from the snapshot path (see [`crate::prefix`]).
//! 2. With no matcher, `matched` stays `None` and `params` is empty.
//! 3. With a [`RouteMatcher::Pattern`], the compiled matcher comes from the
//!    shared [`PatternCache`]; named parameters are extracted on a match.
//! 4. With a [`RouteMatcher::Custom`] function, its [`PathMatch`] is taken
//!    verbatim and the pattern cache is not consulted.
//! 5. `history_index` is looked up through the [`HistoryIndexTracker`].
//!
//! Resolution never fails: an uncompilable pattern is logged and reported
//! as not matched.

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::address::QueryParams;
use crate::history_index::HistoryIndexTracker;
use crate::logging::Logger;
use crate::pattern::{PatternCache, RouteParams};
use crate::prefix::strip_prefix;
use crate::store::NavigationSnapshot;

/// Result of a custom matcher function
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathMatch {
    pub matched: bool,
    pub params: RouteParams,
}

impl PathMatch {
    pub fn matched(params: RouteParams) -> Self {
        Self {
            matched: true,
            params,
        }
    }

    pub fn unmatched() -> Self {
        Self::default()
    }
}

/// Custom matcher: receives the prefix-stripped path
pub type MatchFn = Arc<dyn Fn(&str) -> PathMatch + Send + Sync>;

/// How a consumer decides whether the current path is "its" route
#[derive(Clone)]
pub enum RouteMatcher {
    /// A pattern string compiled through the pattern cache
    Pattern { pattern: String, ignore_case: bool },
    /// A caller-supplied function, bypassing the pattern grammar
    Custom(MatchFn),
}

impl RouteMatcher {
    pub fn pattern(pattern: impl Into<String>) -> Self {
        RouteMatcher::Pattern {
            pattern: pattern.into(),
            ignore_case: false,
        }
    }

    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&str) -> PathMatch + Send + Sync + 'static,
    {
        RouteMatcher::Custom(Arc::new(f))
    }

    /// Set case-insensitivity; no effect on custom matchers
    #[must_use]
    pub fn ignore_case(self, ignore_case: bool) -> Self {
        match self {
            RouteMatcher::Pattern { pattern, .. } => RouteMatcher::Pattern {
                pattern,
                ignore_case,
            },
            custom => custom,
        }
    }
}

impl fmt::Debug for RouteMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteMatcher::Pattern {
                pattern,
                ignore_case,
            } => f
                .debug_struct("RouteMatcher::Pattern")
                .field("pattern", pattern)
                .field("ignore_case", ignore_case)
                .finish(),
            RouteMatcher::Custom(_) => f.write_str("RouteMatcher::Custom"),
        }
    }
}

/// Consumer-facing route state, recomputed per resolution
#[derive(Debug, Clone, PartialEq)]
pub struct RouteState {
    /// Full current address
    pub location: String,
    /// Current path with the consumer's prefix removed
    pub pathname: String,
    pub query: QueryParams,
    /// Named parameters; empty unless the matcher matched
    pub params: RouteParams,
    /// Position of the current entry, `None` if unknown
    pub history_index: Option<usize>,
    /// Opaque state attached to the current entry
    pub state: Option<Value>,
    /// `None` when no matcher was given
    pub matched: Option<bool>,
}

/// Resolve `snapshot` for a consumer with the given `prefix` and matcher
pub fn resolve(
    snapshot: &NavigationSnapshot,
    prefix: &str,
    matcher: Option<&RouteMatcher>,
    patterns: &PatternCache,
    tracker: &mut HistoryIndexTracker,
    logger: &dyn Logger,
) -> RouteState {
    let pathname = strip_prefix(snapshot.path(), prefix).to_string();

    let (matched, params) = match matcher {
        None => (None, RouteParams::new()),
        Some(RouteMatcher::Custom(f)) => {
            let result = f(&pathname);
            (Some(result.matched), result.params)
        }
        Some(RouteMatcher::Pattern {
            pattern,
            ignore_case,
        }) => match patterns.get_or_compile(pattern, *ignore_case) {
            Ok(compiled) => match compiled.params(&pathname) {
                Some(params) => (Some(true), params),
                None => (Some(false), RouteParams::new()),
            },
            Err(e) => {
                logger.warn(
                    "Invalid route pattern",
                    &[("pattern", pattern.clone()), ("error", e.to_string())],
                );
                (Some(false), RouteParams::new())
            }
        },
    };

    RouteState {
        location: snapshot.raw_address.clone(),
        pathname,
        query: snapshot.query().clone(),
        params,
        history_index: tracker.index_of(&snapshot.current_entry_id, &snapshot.entry_ids),
        state: snapshot.entry_state.clone(),
        matched,
    }
}
