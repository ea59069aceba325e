//! Logging contract and `tracing` initialisation
//!
//! Navigation failures never surface as errors to the caller; they are
//! reported through a [`Logger`]. The default [`TracingLogger`] forwards every
//! call to `tracing` under the `navroute` target, so applications see
//! rejected URLs, bad deltas and backend failures in the same structured log
//! stream as the rest of their telemetry.
//!
//! ## Levels
//!
//! | Level   | Used for                                                   |
//! |---------|------------------------------------------------------------|
//! | `debug` | reserved for host diagnostics                              |
//! | `info`  | reserved for host diagnostics                              |
//! | `warn`  | rejected targets, rejected deltas, unparsable addresses    |
//! | `error` | caught backend failures (thrown calls, rejected commits)   |
//!
//! ## Subscriber setup
//!
//! ```no_run
//! use navroute::logging::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::from_env()).expect("logging");
//! ```

use anyhow::{Context, Result};
use std::env;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Structured key/value pairs attached to a log call
pub type LogFields<'a> = &'a [(&'static str, String)];

/// Four-level logger used by the navigation core.
///
/// Implementations must not panic; the core calls them from inside
/// failure-containment paths.
pub trait Logger: Send + Sync {
    fn debug(&self, message: &str, fields: LogFields<'_>);
    fn info(&self, message: &str, fields: LogFields<'_>);
    fn warn(&self, message: &str, fields: LogFields<'_>);
    fn error(&self, message: &str, fields: LogFields<'_>);
}

/// Default logger: forwards to `tracing` with target `navroute`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

fn render_fields(fields: LogFields<'_>) -> String {
    let mut out = String::new();
    for (i, (key, value)) in fields.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(key);
        out.push('=');
        out.push_str(value);
    }
    out
}

impl Logger for TracingLogger {
    fn debug(&self, message: &str, fields: LogFields<'_>) {
        tracing::debug!(target: "navroute", fields = %render_fields(fields), "{}", message);
    }

    fn info(&self, message: &str, fields: LogFields<'_>) {
        tracing::info!(target: "navroute", fields = %render_fields(fields), "{}", message);
    }

    fn warn(&self, message: &str, fields: LogFields<'_>) {
        tracing::warn!(target: "navroute", fields = %render_fields(fields), "{}", message);
    }

    fn error(&self, message: &str, fields: LogFields<'_>) {
        tracing::error!(target: "navroute", fields = %render_fields(fields), "{}", message);
    }
}

/// Log format: JSON for production, pretty-print for development
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            _ => LogFormat::Json,
        }
    }
}

/// Subscriber configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level: trace/debug/info/warn/error
    pub log_level: String,
    /// Log format: json/pretty
    pub format: LogFormat,
    /// Extra `EnvFilter` directives (comma-separated)
    pub target_filter: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            format: LogFormat::Json,
            target_filter: None,
        }
    }
}

impl LogConfig {
    /// Read `NAVROUTE_LOG_LEVEL`, `NAVROUTE_LOG_FORMAT` and `NAVROUTE_LOG_FILTER`
    pub fn from_env() -> Self {
        Self {
            log_level: env::var("NAVROUTE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: LogFormat::parse(
                &env::var("NAVROUTE_LOG_FORMAT").unwrap_or_else(|_| "json".to_string()),
            ),
            target_filter: env::var("NAVROUTE_LOG_FILTER").ok(),
        }
    }

    fn level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }
}

/// Install a global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over `config.log_level`. Output goes to
/// stderr. Fails if a global subscriber is already set.
pub fn init_logging(config: &LogConfig) -> Result<()> {
    let mut env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level().as_str()));

    if let Some(target_filter) = &config.target_filter {
        for filter in target_filter.split(',') {
            let filter = filter.trim();
            if filter.is_empty() {
                continue;
            }
            match filter.parse() {
                Ok(directive) => env_filter = env_filter.add_directive(directive),
                Err(_) => eprintln!("Warning: Invalid log filter directive: {}", filter),
            }
        }
    }

    let fmt_layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(())
}
