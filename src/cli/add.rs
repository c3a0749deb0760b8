//! Add registry items to a project.
//!
//! References are resolved together with their registry dependencies, then the installer
//! writes files, merges env vars, updates the stylesheet and declares npm packages.
//!
//! ```bash
//! regpm add button card
//! regpm add @acme/login-form --overwrite
//! regpm add https://example.com/r/hero.json --dry-run
//! regpm add ./local-item.json --path src/components/custom
//! ```

use anyhow::{Result, bail};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use crate::cli::CliConfig;
use crate::cli::common::{CommandContext, parse_references};
use crate::installer::{self, FileAction, InstallContext, InstallSummary};
use crate::project::ProjectInfo;
use crate::resolver::GraphResolver;
use crate::utils::progress::spinner_with_message;

/// Options shared by `add` and `init`.
#[derive(Debug, Clone, Default)]
pub(crate) struct InstallOptions {
    pub overwrite: bool,
    pub dry_run: bool,
    pub path: Option<PathBuf>,
}

#[derive(Args)]
pub struct AddCommand {
    /// Items to add: names, @namespace/name, URLs or local JSON files
    #[arg(required = true, value_name = "ITEMS")]
    items: Vec<String>,

    /// Replace existing files whose content differs
    #[arg(short, long)]
    overwrite: bool,

    /// Show what would change without writing anything
    #[arg(long)]
    dry_run: bool,

    /// Directory for components without an explicit target
    #[arg(short, long, value_name = "DIR")]
    path: Option<PathBuf>,
}

impl AddCommand {
    pub async fn execute_with_config(self, cli: &CliConfig) -> Result<()> {
        if self.items.is_empty() {
            bail!("No items to add");
        }

        let ctx = CommandContext::load(cli).await?;
        let options = InstallOptions {
            overwrite: self.overwrite,
            dry_run: self.dry_run,
            path: self.path,
        };
        let summary = install_items(&ctx, cli, &self.items, &options).await?;
        if !cli.quiet {
            print_summary(&summary);
        }
        Ok(())
    }
}

/// Resolve `items` and install the graph into the project of `ctx`.
pub(crate) async fn install_items(
    ctx: &CommandContext,
    cli: &CliConfig,
    items: &[String],
    options: &InstallOptions,
) -> Result<InstallSummary> {
    let references = parse_references(items)?;
    let client = ctx.client()?;

    let spinner = spinner_with_message(cli.show_progress(), "Resolving registry items");
    let graph = GraphResolver::new(&client).with_progress(spinner.clone()).resolve(&references).await;
    spinner.finish_and_clear();
    let graph = graph?;

    tracing::info!("Resolved {} items for {}", graph.items.len(), items.join(", "));

    let project = ProjectInfo::detect(&ctx.project_dir).await?;
    let install_ctx = InstallContext::builder(&project)
        .config(ctx.config.as_ref())
        .overwrite(options.overwrite)
        .dry_run(options.dry_run)
        .path_override(options.path.as_deref())
        .build();

    installer::install(&install_ctx, &graph).await
}

/// Human-readable report of an installation.
pub(crate) fn print_summary(summary: &InstallSummary) {
    if summary.dry_run {
        println!("{}", "Dry run - no files were changed".yellow());
    }

    let sections = [
        (FileAction::Created, "Created", "+".green()),
        (FileAction::Updated, "Updated", "~".yellow()),
        (FileAction::Skipped, "Skipped (use --overwrite to replace)", "-".dimmed()),
    ];
    for (action, label, marker) in sections {
        let paths = summary.paths(action);
        if paths.is_empty() {
            continue;
        }
        println!("{} {} file{}:", "✓".green(), label, if paths.len() == 1 { "" } else { "s" });
        for path in paths {
            println!("  {marker} {path}");
        }
    }

    let unchanged = summary.paths(FileAction::Unchanged).len();
    if unchanged > 0 {
        println!("{} {} file{} already up to date", "✓".green(), unchanged, if unchanged == 1 { "" } else { "s" });
    }

    for env in &summary.env {
        if env.added.is_empty() {
            continue;
        }
        let verb = if env.created { "Created" } else { "Updated" };
        println!("{} {} {}: {}", "✓".green(), verb, env.path.display(), env.added.join(", "));
    }

    if let Some(stylesheet) = &summary.stylesheet {
        println!("{} Updated {}", "✓".green(), stylesheet);
    }

    if let Some(config) = &summary.tailwind_config {
        println!("{} Updated {}", "✓".green(), config);
    }

    if let Some((config, fragment)) = &summary.tailwind_manual {
        println!("{} Add the following to {} by hand:", "!".yellow(), config.bright_white());
        println!("{}", serde_json::to_string_pretty(fragment).unwrap_or_default());
    }

    if let Some(packages) = &summary.packages {
        if !packages.dependencies.is_empty() {
            println!("{} Added dependencies: {}", "✓".green(), packages.dependencies.join(", "));
        }
        if !packages.dev_dependencies.is_empty() {
            println!("{} Added dev dependencies: {}", "✓".green(), packages.dev_dependencies.join(", "));
        }
        if !packages.is_empty() {
            println!("\n{} Run your package manager's install command", "Next steps:".cyan());
        }
    }

    if !summary.manual_dependencies.is_empty() {
        println!(
            "{} No package.json found. Install these packages manually: {}",
            "!".yellow(),
            summary.manual_dependencies.join(" ")
        );
    }

    for doc in &summary.docs {
        println!("\n{doc}");
    }

    if summary.files.is_empty()
        && summary.env.iter().all(|e| e.added.is_empty())
        && summary.stylesheet.is_none()
        && summary.tailwind_config.is_none()
    {
        println!("{}", "Nothing to install".dimmed());
    }
}
