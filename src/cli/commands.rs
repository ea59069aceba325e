use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;

use crate::address::AddressCache;
use crate::config::{RouteConfig, DEFAULT_ORIGIN};
use crate::logging::TracingLogger;
use crate::navigation::{RouteHandle, RouteOptions};
use crate::pattern::{compile, Matcher};
use crate::platform::HostPlatform;
use crate::store::NavigationStore;

/// Command-line interface for navroute
#[derive(Parser)]
#[command(name = "navroute")]
#[command(about = "Inspect navroute pattern matching and address parsing", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Resolve a path against a pattern
    Match {
        /// Path pattern, e.g. "/users/:id"
        #[arg(short, long)]
        pattern: String,

        /// Address or path to resolve
        #[arg(long)]
        path: String,

        /// Match case-insensitively
        #[arg(short, long, default_value_t = false)]
        ignore_case: bool,

        /// Global base prefix, e.g. "/app"
        #[arg(long, env = "NAVROUTE_BASE")]
        base: Option<String>,

        /// Section appended to the base
        #[arg(long)]
        section: Option<String>,

        /// Print the report as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Split an address into path and query
    Parse {
        /// Address to parse
        #[arg(short, long)]
        address: String,

        /// Origin used for root-relative addresses
        #[arg(long, env = "NAVROUTE_ORIGIN", default_value = DEFAULT_ORIGIN)]
        origin: String,

        /// Print the report as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

/// Outcome of `navroute match`
#[derive(Debug, Serialize)]
pub struct MatchReport {
    pub pattern: String,
    pub path: String,
    pub prefix: String,
    pub pathname: String,
    pub matched: bool,
    pub params: BTreeMap<String, String>,
    /// Regex the fallback matcher runs
    pub regex: Option<String>,
}

/// Outcome of `navroute parse`
#[derive(Debug, Serialize)]
pub struct ParseReport {
    pub address: String,
    pub path: String,
    pub query: Vec<(String, String)>,
}

fn match_report(
    pattern: &str,
    path: &str,
    ignore_case: bool,
    base: Option<&str>,
    section: Option<&str>,
) -> Result<MatchReport> {
    let compiled =
        compile(pattern, ignore_case, None).with_context(|| format!("Invalid pattern '{}'", pattern))?;
    let regex = match &compiled {
        Matcher::Regex(m) => Some(m.as_str().to_string()),
        Matcher::Native(_) => None,
    };

    let mut config = RouteConfig::default().with_initial_location(path);
    if let Some(base) = base {
        config = config.with_base(base);
    }
    let store = NavigationStore::new(HostPlatform::Detached, config);
    let mut options = RouteOptions::new().pattern(pattern).ignore_case(ignore_case);
    if let Some(section) = section {
        options = options.section(section);
    }
    let route = RouteHandle::with_options(&store, options);
    let state = route.state();

    Ok(MatchReport {
        pattern: pattern.to_string(),
        path: path.to_string(),
        prefix: route.prefix(),
        pathname: state.pathname,
        matched: state.matched.unwrap_or(false),
        params: state.params.into_iter().collect(),
        regex,
    })
}

fn parse_report(address: &str, origin: &str) -> ParseReport {
    let mut cache = AddressCache::new(1, origin);
    let parsed = cache.parse(address, &TracingLogger);
    ParseReport {
        address: address.to_string(),
        path: parsed.path.clone(),
        query: parsed
            .query
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    }
}

fn write_match(out: &mut dyn Write, report: &MatchReport) -> Result<()> {
    writeln!(out, "pattern:  {}", report.pattern)?;
    writeln!(out, "path:     {}", report.path)?;
    if !report.prefix.is_empty() {
        writeln!(out, "prefix:   {}", report.prefix)?;
    }
    writeln!(out, "pathname: {}", report.pathname)?;
    writeln!(out, "matched:  {}", report.matched)?;
    for (name, value) in &report.params {
        writeln!(out, "  :{} = {}", name, value)?;
    }
    if let Some(regex) = &report.regex {
        writeln!(out, "regex:    {}", regex)?;
    }
    Ok(())
}

fn write_parse(out: &mut dyn Write, report: &ParseReport) -> Result<()> {
    writeln!(out, "path: {}", report.path)?;
    for (key, value) in &report.query {
        writeln!(out, "  {} = {}", key, value)?;
    }
    Ok(())
}

/// Execute `cli`, writing the report to `out`
pub fn run(cli: Cli, out: &mut dyn Write) -> Result<()> {
    match cli.command {
        Commands::Match {
            pattern,
            path,
            ignore_case,
            base,
            section,
            json,
        } => {
            let report = match_report(
                &pattern,
                &path,
                ignore_case,
                base.as_deref(),
                section.as_deref(),
            )?;
            if json {
                serde_json::to_writer_pretty(&mut *out, &report)?;
                writeln!(out)?;
            } else {
                write_match(out, &report)?;
            }
        }
        Commands::Parse {
            address,
            origin,
            json,
        } => {
            let report = parse_report(&address, &origin);
            if json {
                serde_json::to_writer_pretty(&mut *out, &report)?;
                writeln!(out)?;
            } else {
                write_parse(out, &report)?;
            }
        }
    }
    Ok(())
}

/// Parse the process arguments and run, printing to stdout
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    run(cli, &mut handle)
}
