//! Print registry items without installing them.
//!
//! Only the named items are fetched; registry dependencies are not followed. All references
//! are checked before any request is sent, so an unknown namespace fails without network
//! traffic.
//!
//! ```bash
//! regpm view button
//! regpm view @acme/login-form https://example.com/r/hero.json
//! ```

use anyhow::Result;
use clap::Args;
use futures::future::try_join_all;

use crate::cli::CliConfig;
use crate::cli::common::{CommandContext, parse_references, print_json};

#[derive(Args)]
pub struct ViewCommand {
    /// Items to print: names, @namespace/name, URLs or local JSON files
    #[arg(required = true, value_name = "ITEMS")]
    items: Vec<String>,
}

impl ViewCommand {
    pub async fn execute_with_config(self, cli: &CliConfig) -> Result<()> {
        let references = parse_references(&self.items)?;
        let ctx = CommandContext::load(cli).await?;
        let client = ctx.client()?;

        for reference in &references {
            client.check(reference)?;
        }

        let items = try_join_all(references.iter().map(|reference| client.fetch(reference))).await?;
        print_json(&items)
    }
}
