//! Initialize a project configuration.
//!
//! `init` inspects the project (stylesheet, Tailwind JS config, `tsconfig.json` path
//! aliases, framework) and writes `components.json`. Items given on the command line are
//! then installed exactly as `add` would install them.
//!
//! ```bash
//! regpm init
//! regpm init --style default --base-color zinc
//! regpm init --css src/styles/app.css button card
//! regpm init --force
//! ```

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::cli::CliConfig;
use crate::cli::add::{InstallOptions, install_items, print_summary};
use crate::cli::common::CommandContext;
use crate::config::{Aliases, ProjectConfig, TailwindConfig};
use crate::constants::DEFAULT_STYLE;
use crate::core::RegistryError;
use crate::project::{Framework, ProjectInfo};

const SCHEMA_URL: &str = "https://ui.shadcn.com/schema.json";
const DEFAULT_BASE_COLOR: &str = "neutral";

#[derive(Args)]
pub struct InitCommand {
    /// Items to install after writing the configuration
    #[arg(value_name = "ITEMS")]
    items: Vec<String>,

    /// Overwrite an existing components.json
    #[arg(short, long)]
    force: bool,

    /// Component style
    #[arg(long)]
    style: Option<String>,

    /// Stylesheet that receives CSS variables
    #[arg(long, value_name = "PATH")]
    css: Option<String>,

    /// Base colour of the theme
    #[arg(long)]
    base_color: Option<String>,
}

impl InitCommand {
    pub async fn execute_with_config(self, cli: &CliConfig) -> Result<()> {
        let project_dir = cli.project_dir()?;
        let config_path = ProjectConfig::path_in(&project_dir);

        // registries survive a forced re-init
        let previous = if config_path.exists() {
            if !self.force {
                return Err(RegistryError::ConfigAlreadyExists {
                    path: config_path.display().to_string(),
                }
                .into());
            }
            ProjectConfig::load_from(&config_path).await.ok()
        } else {
            None
        };

        tokio::fs::create_dir_all(&project_dir).await?;
        let project = ProjectInfo::detect(&project_dir).await?;

        let mut config = self.build(&project);
        if let Some(previous) = previous {
            config.registries = previous.registries;
        }
        config.save_to(&config_path).await?;
        tracing::info!("Wrote {}", config_path.display());

        if !cli.quiet {
            println!("{} Initialized {}", "✓".green(), config_path.display());
            if config.tailwind.css.is_none() {
                println!("{} No stylesheet found; set tailwind.css to receive CSS variables", "!".yellow());
            }
        }

        if self.items.is_empty() {
            if !cli.quiet {
                println!("\n{}", "Next steps:".cyan());
                println!("  Add components with {}", "regpm add <item>".bright_white());
            }
            return Ok(());
        }

        let ctx = CommandContext {
            project_dir,
            config: Some(config),
        };
        let summary = install_items(&ctx, cli, &self.items, &InstallOptions::default()).await?;
        if !cli.quiet {
            print_summary(&summary);
        }
        Ok(())
    }

    /// Configuration for `project`, flags taking precedence over detection.
    fn build(&self, project: &ProjectInfo) -> ProjectConfig {
        let css = self.css.clone().or_else(|| project.find_stylesheet());
        let tailwind = TailwindConfig {
            config: Some(project.find_tailwind_config().unwrap_or_default()),
            css,
            base_color: Some(self.base_color.clone().unwrap_or_else(|| DEFAULT_BASE_COLOR.to_string())),
            ..TailwindConfig::default()
        };

        ProjectConfig {
            schema: Some(SCHEMA_URL.to_string()),
            style: Some(self.style.clone().unwrap_or_else(|| DEFAULT_STYLE.to_string())),
            tsx: project.typescript,
            rsc: project.framework == Framework::NextApp,
            tailwind,
            aliases: detect_aliases(project),
            ..ProjectConfig::default()
        }
    }
}

/// Aliases matching the project's path mapping; `~/*` projects get `~/` prefixes.
fn detect_aliases(project: &ProjectInfo) -> Aliases {
    let has = |pattern: &str| project.paths.iter().any(|(p, _)| p == pattern);
    let prefix = if !has("@/*") && has("~/*") { "~" } else { "@" };

    Aliases {
        components: Some(format!("{prefix}/components")),
        utils: Some(format!("{prefix}/lib/utils")),
        ui: Some(format!("{prefix}/components/ui")),
        lib: Some(format!("{prefix}/lib")),
        hooks: Some(format!("{prefix}/hooks")),
    }
}
