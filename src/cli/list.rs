//! List the items of one or more registries.
//!
//! Prints `[{"registry": "@ns", "items": [{name, type, description}]}]` on one line.
//!
//! ```bash
//! regpm list
//! regpm list @acme @shadcn
//! ```

use anyhow::Result;
use clap::Args;

use crate::cli::CliConfig;
use crate::cli::common::{CommandContext, parse_namespaces, print_json};
use crate::search;

#[derive(Args)]
pub struct ListCommand {
    /// Registry namespaces, `@shadcn` when omitted
    #[arg(value_name = "NAMESPACES")]
    namespaces: Vec<String>,
}

impl ListCommand {
    pub async fn execute_with_config(self, cli: &CliConfig) -> Result<()> {
        let namespaces = parse_namespaces(&self.namespaces)?;
        let ctx = CommandContext::load(cli).await?;
        let client = ctx.client()?;

        let listings = search::list(&client, &namespaces).await?;
        tracing::debug!("Listed {} registries", listings.len());
        print_json(&listings)
    }
}
