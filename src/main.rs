//! regpm CLI entry point
//!
//! Parses arguments, installs the tracing subscriber, runs the command and renders errors.
//!
//! - `init` - Write components.json and optionally install items
//! - `add` - Resolve and install registry items
//! - `list` - Print registry indexes
//! - `search` - Search registry indexes
//! - `view` - Print registry items

use anyhow::Result;
use clap::Parser;
use regpm_cli::cli;
use regpm_cli::core::error::user_friendly_error;
use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = cli::Cli::parse();
    let config = cli.build_config();

    init_logging(config.log_level.as_deref());

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    // Scripted callers assert on plain text
    if !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    match cli.execute_with_config(config).await {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}

/// Log to stderr. `RUST_LOG` wins over the level derived from the flags.
fn init_logging(level: Option<&str>) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(format!("regpm_cli={}", level.unwrap_or("warn")))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();
}
