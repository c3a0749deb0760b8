//! Command-line interface for regpm.
//!
//! Each command lives in its own module with its own argument struct and execution logic.
//!
//! # Available Commands
//!
//! ## Project Management
//! - `init` - Write `components.json` and optionally install items
//! - `add` - Resolve items and their registry dependencies and install them
//!
//! ## Registry Inspection
//! - `list` - Print the index of one or more registries
//! - `search` - Search registry indexes with fuzzy matching and pagination
//! - `view` - Print registry items without installing them
//!
//! # Output
//!
//! Read-only commands print a single line of JSON on success. Errors are rendered by `main`
//! as plain text on stdout, so a caller detects success by parsing the output as JSON.
//! Logs go to stderr.
//!
//! ```bash
//! regpm init
//! regpm add button @acme/login-form
//! regpm search @shadcn --query dialg --limit 5
//! regpm view @acme/login-form
//! ```

mod add;
pub mod common;
mod init;
mod list;
mod search;
mod view;


use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Settings derived from the global flags, passed explicitly to every command.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Log level for the tracing subscriber when `RUST_LOG` is not set.
    pub log_level: Option<String>,

    /// Hide spinners.
    pub no_progress: bool,

    /// Suppress non-essential output.
    pub quiet: bool,

    /// Project directory; the process working directory when `None`.
    pub cwd: Option<PathBuf>,
}

impl CliConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Project directory commands operate on, always absolute.
    pub fn project_dir(&self) -> Result<PathBuf> {
        let current = std::env::current_dir()?;
        match &self.cwd {
            Some(dir) if dir.is_absolute() => Ok(dir.clone()),
            Some(dir) => Ok(crate::utils::fs::normalize_path(&current.join(dir))),
            None => Ok(current),
        }
    }

    /// Whether spinners should be drawn.
    #[must_use]
    pub fn show_progress(&self) -> bool {
        !self.no_progress && !self.quiet
    }
}

/// Root command and its global options.
///
/// ```bash
/// regpm --verbose add button
/// regpm --cwd ./apps/web --no-progress add @acme/login-form
/// ```
#[derive(Parser)]
#[command(
    name = "regpm",
    about = "Registry package manager - resolve and install registry components",
    version,
    long_about = "regpm fetches components from shadcn-style registries, resolves their registry \
                  dependencies and installs them into a project."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Run as if started in this directory
    #[arg(short = 'c', long, global = true, value_name = "DIR")]
    cwd: Option<PathBuf>,

    /// Disable progress spinners
    #[arg(long, global = true)]
    no_progress: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write components.json and install items
    Init(init::InitCommand),

    /// Add items and their registry dependencies to the project
    Add(add::AddCommand),

    /// List the items of registries
    List(list::ListCommand),

    /// Search registries
    Search(search::SearchCommand),

    /// Print registry items as JSON
    View(view::ViewCommand),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    /// Translate the global flags into a [`CliConfig`].
    ///
    /// `--verbose` maps to `debug`, `--quiet` to `error`, and the default is `warn`.
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        };

        CliConfig {
            log_level: Some(log_level.to_string()),
            no_progress: self.no_progress,
            quiet: self.quiet,
            cwd: self.cwd.clone(),
        }
    }

    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        match self.command {
            Commands::Init(cmd) => cmd.execute_with_config(&config).await,
            Commands::Add(cmd) => cmd.execute_with_config(&config).await,
            Commands::List(cmd) => cmd.execute_with_config(&config).await,
            Commands::Search(cmd) => cmd.execute_with_config(&config).await,
            Commands::View(cmd) => cmd.execute_with_config(&config).await,
        }
    }
}
