//! # CLI Module
//!
//! Developer tooling for checking how patterns match and how addresses parse,
//! using the same pipeline the navigation store runs.
//!
//! ## Commands
//!
//! ### `match`
//!
//! Resolve a path against a pattern, optionally under a base and section:
//!
//! ```bash
//! navroute match --pattern "/users/:id" --path /app/users/42 --base /app
//! ```
//!
//! Options:
//! - `--pattern <PATTERN>` - Path pattern (required)
//! - `--path <PATH>` - Address or path to resolve (required)
//! - `--ignore-case` - Case-insensitive matching
//! - `--base <BASE>` - Global base prefix
//! - `--section <SECTION>` - Section appended to the base
//! - `--json` - Print the report as JSON
//!
//! ### `parse`
//!
//! Split an address into path and decoded query:
//!
//! ```bash
//! navroute parse --address "/search?q=a+b&tag=x&tag=y"
//! ```
//!
//! ## Usage from Code
//!
//! ```rust,ignore
//! use navroute::cli::{run, Cli};
//! use clap::Parser;
//!
//! let cli = Cli::parse();
//! run(cli, &mut std::io::stdout())?;
//! ```

mod commands;


pub use commands::{run, run_cli, Cli, Commands, MatchReport, ParseReport};
