mod common;

use common::fixtures::{detached_store, entry_list_store};
use common::memory_navigation::MemoryNavigation;
use common::recording_logger::Level;
use navroute::{
    NativePattern, NativePatternFactory, NavigationStore, PathMatch, RouteConfig, RouteHandle,
    RouteOptions, RouteParams,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn at(location: &str) -> NavigationStore {
    detached_store(RouteConfig::default().with_initial_location(location)).0
}

fn params(pairs: &[(&str, &str)]) -> RouteParams {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_single_named_segment() {
    let state = RouteHandle::with_pattern(&at("/users/123"), "/users/:id").state();
    assert_eq!(state.matched, Some(true));
    assert_eq!(state.params, params(&[("id", "123")]));
}

#[test]
fn test_optional_group() {
    let pattern = "/cps/:cpId{/element/:elId}?";

    let short = RouteHandle::with_pattern(&at("/cps/1592813"), pattern).state();
    assert_eq!(short.matched, Some(true));
    assert_eq!(short.params, params(&[("cpId", "1592813")]));
    assert!(!short.params.contains_key("elId"));

    let long = RouteHandle::with_pattern(&at("/cps/1592813/element/5"), pattern).state();
    assert_eq!(long.params, params(&[("cpId", "1592813"), ("elId", "5")]));
}

#[test]
fn test_wildcard_contributes_no_key() {
    let state = RouteHandle::with_pattern(
        &at("/elements/123/456/789"),
        "/elements/:elementId/*/:subsubId",
    )
    .state();
    assert_eq!(state.params, params(&[("elementId", "123"), ("subsubId", "789")]));
}

#[test]
fn test_non_ascii_pattern_matches_its_address() {
    let state = RouteHandle::with_pattern(&at("http://localhost/café/7"), "/café/:id").state();
    assert_eq!(state.pathname, "/caf%C3%A9/7");
    assert_eq!(state.matched, Some(true));
    assert_eq!(state.params, params(&[("id", "7")]));
}

#[test]
fn test_no_pattern_leaves_matched_unset() {
    let state = RouteHandle::new(&at("/anything?x=1")).state();
    assert_eq!(state.matched, None);
    assert!(state.params.is_empty());
    assert_eq!(state.query.get("x"), Some("1"));
}

#[test]
fn test_unmatched_pattern() {
    let state = RouteHandle::with_pattern(&at("/posts/1"), "/users/:id").state();
    assert_eq!(state.matched, Some(false));
    assert!(state.params.is_empty());
}

#[test]
fn test_ignore_case_uses_separate_cache_slot() {
    let store = at("/Users/7");
    let strict = RouteHandle::with_pattern(&store, "/users/:id");
    let loose = RouteHandle::with_options(
        &store,
        RouteOptions::new().pattern("/users/:id").ignore_case(true),
    );

    assert_eq!(strict.state().matched, Some(false));
    assert_eq!(loose.state().params, params(&[("id", "7")]));
    assert!(store.patterns().contains("/users/:id", false));
    assert!(store.patterns().contains("/users/:id", true));
    assert_eq!(store.patterns().len(), 2);
}

#[test]
fn test_custom_matcher_bypasses_pattern_cache() {
    let store = at("/app/reports/2024");
    let route = RouteHandle::with_matcher(&store, |path| {
        match path.strip_prefix("/app/reports/") {
            Some(year) if year.len() == 4 => {
                let mut p = RouteParams::new();
                p.insert("year".to_string(), year.to_string());
                PathMatch::matched(p)
            }
            _ => PathMatch::unmatched(),
        }
    });

    let state = route.state();
    assert_eq!(state.matched, Some(true));
    assert_eq!(state.params, params(&[("year", "2024")]));
    assert!(store.patterns().is_empty());
}

#[test]
fn test_custom_matcher_ignores_case_flag() {
    let store = at("/A");
    let route = RouteHandle::with_options(
        &store,
        RouteOptions::new()
            .matcher(|path| PathMatch {
                matched: path == "/a",
                params: RouteParams::new(),
            })
            .ignore_case(true),
    );
    assert_eq!(route.state().matched, Some(false));
}

#[test]
fn test_section_matching() {
    let store = detached_store(
        RouteConfig::default()
            .with_base("/app")
            .with_initial_location("/app/dashboard/users/9"),
    )
    .0;
    let inside = RouteHandle::with_options(
        &store,
        RouteOptions::new().pattern("/users/:id").section("/dashboard"),
    );
    let outside = RouteHandle::with_options(
        &store,
        RouteOptions::new().pattern("/users/:id").section("/admin"),
    );

    assert_eq!(inside.state().params, params(&[("id", "9")]));
    assert_eq!(outside.state().pathname, "/app/dashboard/users/9");
    assert_eq!(outside.state().matched, Some(false));
}

#[test]
fn test_history_index_tracks_current_entry() {
    let nav = MemoryNavigation::with_entries(&["/a", "/b", "/c"], 1);
    let (store, _) = entry_list_store(&nav, RouteConfig::default());
    let route = RouteHandle::new(&store);
    assert_eq!(route.state().history_index, Some(1));
    route.go(1.0);
    assert_eq!(route.state().history_index, Some(2));
}

#[test]
fn test_invalid_pattern_logged_and_unmatched() {
    let (store, logger) = detached_store(RouteConfig::default().with_initial_location("/a"));
    let state = RouteHandle::with_pattern(&store, "/a/{b").state();
    assert_eq!(state.matched, Some(false));
    assert_eq!(logger.messages(Level::Warn), vec!["Invalid route pattern".to_string()]);
    assert!(store.patterns().is_empty());
}

struct PrefixOnlyNative {
    constructed: AtomicUsize,
}

struct StartsWith(String);

impl NativePattern for StartsWith {
    fn test(&self, path: &str) -> bool {
        path.starts_with(&self.0)
    }

    fn exec(&self, path: &str) -> Option<HashMap<String, Option<String>>> {
        if !self.test(path) {
            return None;
        }
        let mut groups = HashMap::new();
        groups.insert("0".to_string(), Some(path[self.0.len()..].to_string()));
        groups.insert("rest".to_string(), Some(path[self.0.len()..].to_string()));
        Some(groups)
    }
}

impl NativePatternFactory for PrefixOnlyNative {
    fn construct(
        &self,
        pattern: &str,
        _ignore_case: bool,
    ) -> Result<Box<dyn NativePattern>, String> {
        let prefix = pattern
            .strip_suffix("*")
            .ok_or_else(|| "only trailing wildcards".to_string())?;
        self.constructed.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(StartsWith(prefix.to_string())))
    }
}

#[test]
fn test_native_factory_preferred_with_numeric_keys_dropped() {
    let native = Arc::new(PrefixOnlyNative {
        constructed: AtomicUsize::new(0),
    });
    let store = navroute::NavigationStore::with_native_patterns(
        navroute::HostPlatform::Detached,
        RouteConfig::default().with_initial_location("/files/a/b"),
        Some(native.clone() as Arc<dyn NativePatternFactory>),
    );

    let native_route = RouteHandle::with_pattern(&store, "/files/*");
    let state = native_route.state();
    assert_eq!(state.matched, Some(true));
    assert_eq!(state.params, params(&[("rest", "a/b")]));

    // unsupported by the native primitive: regex fallback
    let fallback = RouteHandle::with_pattern(&store, "/files/:dir/:name");
    assert_eq!(fallback.state().params, params(&[("dir", "a"), ("name", "b")]));

    native_route.state();
    assert_eq!(native.constructed.load(Ordering::SeqCst), 1);
}
