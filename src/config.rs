//! # Route Configuration Module
//!
//! Global configuration consumed (read-only) by the navigation core.
//!
//! ## Sources
//!
//! - Builder methods on [`RouteConfig`]
//! - Environment variables via [`RouteConfig::from_env`]
//! - TOML via [`RouteConfig::from_toml_str`] / [`RouteConfig::from_file`]
//!
//! ## Environment Variables
//!
//! | Variable | Field | Default |
//! |---|---|---|
//! | `NAVROUTE_URL_CACHE_LIMIT` | `url_cache_limit` | `50` |
//! | `NAVROUTE_DEFAULT_HISTORY` | `default_history` | unset (`auto`) |
//! | `NAVROUTE_BASE` | `base` | unset |
//! | `NAVROUTE_INITIAL_LOCATION` | `initial_location` | unset |
//! | `NAVROUTE_ORIGIN` | `origin` | `http://localhost` |
//!
//! ## Example TOML
//!
//! ```toml
//! url_cache_limit = 100
//! default_history = "replace"
//! base = "/app"
//! initial_location = "http://localhost/app/posts?page=2"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::logging::{Logger, TracingLogger};

/// Default capacity of the address cache
pub const DEFAULT_URL_CACHE_LIMIT: usize = 50;

/// Origin used to resolve root-relative addresses when the host provides none
pub const DEFAULT_ORIGIN: &str = "http://localhost";

/// Whether a navigation adds an entry, replaces the current one, or lets the
/// platform decide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryMode {
    Push,
    Replace,
    #[default]
    Auto,
}

impl HistoryMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "push" => Some(HistoryMode::Push),
            "replace" => Some(HistoryMode::Replace),
            "auto" => Some(HistoryMode::Auto),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HistoryMode::Push => "push",
            HistoryMode::Replace => "replace",
            HistoryMode::Auto => "auto",
        }
    }
}

impl fmt::Display for HistoryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_url_cache_limit() -> usize {
    DEFAULT_URL_CACHE_LIMIT
}

fn default_origin() -> String {
    DEFAULT_ORIGIN.to_string()
}

fn default_logger() -> Arc<dyn Logger> {
    Arc::new(TracingLogger)
}

/// Global navigation configuration.
///
/// Owned by application startup code; the store holds it behind an `Arc`
/// and never mutates it.
#[derive(Clone, Serialize, Deserialize)]
pub struct RouteConfig {
    /// Maximum number of parsed addresses kept in the address cache
    #[serde(default = "default_url_cache_limit")]
    pub url_cache_limit: usize,
    /// Disposition used by `navigate` when the call does not specify one
    #[serde(default)]
    pub default_history: Option<HistoryMode>,
    /// Application base path (e.g. `/app`)
    #[serde(default)]
    pub base: Option<String>,
    /// Address used for snapshots when no host history is available
    #[serde(default)]
    pub initial_location: Option<String>,
    /// Origin against which root-relative addresses are parsed
    #[serde(default = "default_origin")]
    pub origin: String,
    /// Logger for rejections and backend failures
    #[serde(skip, default = "default_logger")]
    pub logger: Arc<dyn Logger>,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            url_cache_limit: DEFAULT_URL_CACHE_LIMIT,
            default_history: None,
            base: None,
            initial_location: None,
            origin: default_origin(),
            logger: default_logger(),
        }
    }
}

impl fmt::Debug for RouteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteConfig")
            .field("url_cache_limit", &self.url_cache_limit)
            .field("default_history", &self.default_history)
            .field("base", &self.base)
            .field("initial_location", &self.initial_location)
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}

impl RouteConfig {
    /// Load configuration from environment variables.
    ///
    /// Unparsable values fall back to their defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(limit) = env::var("NAVROUTE_URL_CACHE_LIMIT")
            .ok()
            .and_then(|v| v.trim().parse::<usize>().ok())
        {
            config.url_cache_limit = limit;
        }
        config.default_history = env::var("NAVROUTE_DEFAULT_HISTORY")
            .ok()
            .and_then(|v| HistoryMode::parse(&v));
        config.base = env::var("NAVROUTE_BASE").ok().filter(|v| !v.is_empty());
        config.initial_location = env::var("NAVROUTE_INITIAL_LOCATION")
            .ok()
            .filter(|v| !v.is_empty());
        if let Ok(origin) = env::var("NAVROUTE_ORIGIN") {
            if !origin.is_empty() {
                config.origin = origin;
            }
        }
        config
    }

    /// Parse configuration from a TOML document
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("Failed to parse navroute configuration")
    }

    /// Read and parse a TOML configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    pub fn with_url_cache_limit(mut self, limit: usize) -> Self {
        self.url_cache_limit = limit;
        self
    }

    pub fn with_default_history(mut self, mode: HistoryMode) -> Self {
        self.default_history = Some(mode);
        self
    }

    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    pub fn with_initial_location(mut self, location: impl Into<String>) -> Self {
        self.initial_location = Some(location.into());
        self
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    /// Cache capacity with zero coerced to one
    pub(crate) fn effective_cache_limit(&self) -> usize {
        self.url_cache_limit.max(1)
    }
}
