//! # Pattern Module
//!
//! Compiles path patterns into reusable matchers and caches them.
//!
//! ## Grammar
//!
//! | Syntax | Meaning |
//! |---|---|
//! | `:name` | required named segment |
//! | `:name(regex)` | named segment constrained by `regex` |
//! | `:name?` | optional named segment (a preceding `/` becomes optional too) |
//! | `*` | unnamed wildcard spanning one segment |
//! | `{...}?` | optional sub-sequence |
//! | `\x` | literal `x` |
//!
//! ## Compilation
//!
//! 1. If the host supplies a [`NativePatternFactory`], it is asked first.
//! 2. If it is absent or refuses the pattern, the pattern is tokenized and
//!    rendered into an anchored regex with named capture groups.
//!
//! Either way the result is a [`Matcher`]. Unnamed pieces (wildcards, bare
//! `(regex)` groups) may surface as numerically-keyed groups from a native
//! primitive; [`Matcher::params`] drops them so only named keys become
//! route parameters.
//!
//! ## Example
//!
//! ```rust
//! use navroute::pattern::compile;
//!
//! let m = compile("/blog/:year(\\d+)/:month(\\d+)", false, None).unwrap();
//! let params = m.params("/blog/2024/02").unwrap();
//! assert_eq!(params["year"], "2024");
//! assert_eq!(params["month"], "02");
//! assert!(!m.test("/blog/latest/02"));
//! ```

mod cache;
mod parse;

pub use cache::PatternCache;

use regex::{Regex, RegexBuilder};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

use crate::error::PatternError;

/// Route parameters: name → matched segment
pub type RouteParams = HashMap<String, String>;

/// Raw capture groups reported by a matcher; `None` marks a group that did
/// not participate in the match.
pub type Groups = HashMap<String, Option<String>>;

/// A host-provided compiled pattern (e.g. a platform URL-pattern object)
pub trait NativePattern: Send + Sync {
    fn test(&self, path: &str) -> bool;
    /// Detailed match; unnamed groups may use numeric keys (`"0"`, `"1"`, ...)
    fn exec(&self, path: &str) -> Option<Groups>;
}

/// Host-provided constructor for [`NativePattern`]s.
///
/// Returning `Err` (unsupported syntax, or the primitive is unavailable)
/// makes the compiler fall back to the regex matcher.
pub trait NativePatternFactory: Send + Sync {
    fn construct(
        &self,
        pattern: &str,
        ignore_case: bool,
    ) -> Result<Box<dyn NativePattern>, String>;
}

/// Regex-backed matcher built from the pattern grammar
pub struct RegexMatcher {
    regex: Regex,
    names: Vec<String>,
}

impl RegexMatcher {
    /// Anchored regex source this matcher runs
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Named parameters in declaration order
    #[must_use]
    pub fn param_names(&self) -> &[String] {
        &self.names
    }
}

/// A compiled, immutable path matcher
pub enum Matcher {
    Native(Box<dyn NativePattern>),
    Regex(RegexMatcher),
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Matcher::Native(_) => f.write_str("Matcher::Native"),
            Matcher::Regex(m) => f
                .debug_struct("Matcher::Regex")
                .field("regex", &m.regex.as_str())
                .field("names", &m.names)
                .finish(),
        }
    }
}

impl Matcher {
    /// Whether `path` matches in full
    #[must_use]
    pub fn test(&self, path: &str) -> bool {
        match self {
            Matcher::Native(native) => native.test(path),
            Matcher::Regex(m) => m.regex.is_match(path),
        }
    }

    /// Raw capture groups, or `None` if `path` does not match
    #[must_use]
    pub fn exec(&self, path: &str) -> Option<Groups> {
        match self {
            Matcher::Native(native) => native.exec(path),
            Matcher::Regex(m) => {
                let caps = m.regex.captures(path)?;
                Some(
                    m.names
                        .iter()
                        .map(|name| {
                            let value = caps.name(name).map(|v| v.as_str().to_string());
                            (name.clone(), value)
                        })
                        .collect(),
                )
            }
        }
    }

    /// Named route parameters for `path`, or `None` if it does not match.
    ///
    /// Numeric keys and non-participating groups are dropped.
    #[must_use]
    pub fn params(&self, path: &str) -> Option<RouteParams> {
        let groups = self.exec(path)?;
        Some(
            groups
                .into_iter()
                .filter(|(key, _)| !is_numeric_key(key))
                .filter_map(|(key, value)| value.map(|v| (key, v)))
                .collect(),
        )
    }

    #[must_use]
    pub fn is_native(&self) -> bool {
        matches!(self, Matcher::Native(_))
    }
}

fn is_numeric_key(key: &str) -> bool {
    !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit())
}

/// Build the regex fallback matcher for `pattern`
pub fn compile_regex(pattern: &str, ignore_case: bool) -> Result<RegexMatcher, PatternError> {
    let (tokens, names) = parse::tokenize(pattern)?;
    let mut source = String::with_capacity(pattern.len() + 16);
    source.push('^');
    source.push_str(&parse::to_regex_source(&tokens));
    source.push('$');

    let regex = RegexBuilder::new(&source)
        .case_insensitive(ignore_case)
        .build()
        .map_err(|e| PatternError::InvalidRegex {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;

    Ok(RegexMatcher { regex, names })
}

/// Compile `pattern`, preferring the host's native primitive when given
pub fn compile(
    pattern: &str,
    ignore_case: bool,
    native: Option<&dyn NativePatternFactory>,
) -> Result<Matcher, PatternError> {
    if let Some(factory) = native {
        match factory.construct(pattern, ignore_case) {
            Ok(compiled) => return Ok(Matcher::Native(compiled)),
            Err(reason) => {
                debug!(
                    pattern = %pattern,
                    ignore_case = ignore_case,
                    reason = %reason,
                    "Native pattern construction failed, using regex fallback"
                );
            }
        }
    }
    compile_regex(pattern, ignore_case).map(Matcher::Regex)
}
