//! Path-prefix composition.
//!
//! A consumer's effective prefix is built from three layers:
//!
//! 1. the global base from [`crate::config::RouteConfig::base`] (e.g. `/app`),
//! 2. the consumer's section (e.g. `/dashboard`), appended to the base,
//! 3. a per-call [`PrefixOverride`], which wins over both.
//!
//! The same prefix is stripped from the current path on read
//! ([`strip_prefix`]) and prepended to root-relative targets on write
//! ([`apply_prefix`]), so `/app/dashboard/settings` reads as `/settings` and
//! `navigate("/reports")` writes `/app/dashboard/reports`.

/// Normalise a prefix: ensure a leading `/`, drop trailing `/`; empty and `/` become `""`
#[must_use]
pub fn normalize(prefix: &str) -> String {
    let trimmed = prefix.trim_end_matches('/');
    if trimmed.is_empty() {
        return String::new();
    }
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

/// Combine the global base with an optional section.
///
/// An absent or empty section yields the normalised base alone.
#[must_use]
pub fn combine(global_base: Option<&str>, section: Option<&str>) -> String {
    let base = normalize(global_base.unwrap_or(""));
    match section.map(normalize) {
        Some(section) if !section.is_empty() => base + &section,
        _ => base,
    }
}

/// Remove `prefix` from the front of `path`.
///
/// `path == prefix` yields `/`; a path outside the prefix is returned unchanged.
#[must_use]
pub fn strip_prefix<'a>(path: &'a str, prefix: &str) -> &'a str {
    if prefix.is_empty() || prefix == "/" {
        return path;
    }
    if path == prefix {
        return "/";
    }
    match path.strip_prefix(prefix) {
        Some(rest) if rest.starts_with('/') => rest,
        _ => path,
    }
}

/// Whether `path` lies inside `prefix` (always true for an empty prefix)
#[must_use]
pub fn is_within(path: &str, prefix: &str) -> bool {
    prefix.is_empty()
        || prefix == "/"
        || path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Prepend `prefix` to a root-relative `target`.
///
/// Absolute addresses and network-path references (`//host`) pass through.
#[must_use]
pub fn apply_prefix(target: &str, prefix: &str) -> String {
    if prefix.is_empty() || !target.starts_with('/') || target.starts_with("//") {
        return target.to_string();
    }
    match target.as_bytes().get(1) {
        None => prefix.to_string(),
        Some(b'?') | Some(b'#') => format!("{}{}", prefix, &target[1..]),
        Some(_) => format!("{}{}", prefix, target),
    }
}

/// Per-call prefix selection for writes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PrefixOverride {
    /// Use the consumer's default (global base + its section)
    #[default]
    Inherit,
    /// Use exactly this prefix; `None` or empty means no prefix at all
    Base(Option<String>),
    /// Use the global base plus this section; `None` or empty means the app root
    Section(Option<String>),
}

/// Resolve the effective prefix: explicit base > explicit section > consumer default
#[must_use]
pub fn resolve(
    global_base: Option<&str>,
    default_section: Option<&str>,
    call: &PrefixOverride,
) -> String {
    match call {
        PrefixOverride::Base(base) => normalize(base.as_deref().unwrap_or("")),
        PrefixOverride::Section(section) => combine(global_base, section.as_deref()),
        PrefixOverride::Inherit => combine(global_base, default_section),
    }
}
