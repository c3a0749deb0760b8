//! Helpers shared by the command implementations.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::CliConfig;
use crate::config::{ProjectConfig, RegistryConfig};
use crate::constants::BUILTIN_NAMESPACE;
use crate::registry::{RegistryClient, RegistryReference, parse_namespace};

/// Everything a command needs to talk to registries on behalf of one project.
#[derive(Debug)]
pub struct CommandContext {
    pub project_dir: PathBuf,
    /// Parsed `components.json`, if the project has one.
    pub config: Option<ProjectConfig>,
}

impl CommandContext {
    /// Load the configuration of the project `cli` points at.
    pub async fn load(cli: &CliConfig) -> Result<Self> {
        let project_dir = cli.project_dir()?;
        let config = ProjectConfig::load(&project_dir).await?;
        Ok(Self {
            project_dir,
            config,
        })
    }

    /// A client for the built-in and configured registries.
    pub fn client(&self) -> Result<RegistryClient> {
        let registries = RegistryConfig::new(self.config.as_ref())?;
        Ok(RegistryClient::new(registries, &self.project_dir)?)
    }
}

/// Parse every reference; the first invalid one fails the whole batch.
pub fn parse_references(args: &[String]) -> Result<Vec<RegistryReference>> {
    args.iter()
        .map(|arg| RegistryReference::parse(arg).map_err(anyhow::Error::from))
        .collect()
}

/// Namespaces for `list`/`search`, `@shadcn` when none are given.
pub fn parse_namespaces(args: &[String]) -> Result<Vec<String>> {
    if args.is_empty() {
        return Ok(vec![BUILTIN_NAMESPACE.to_string()]);
    }
    args.iter().map(|arg| parse_namespace(arg).map_err(anyhow::Error::from)).collect()
}

/// Print `value` as a single line of JSON.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string(value).context("Failed to serialize output")?;
    println!("{rendered}");
    Ok(())
}
