//! Search registry indexes.
//!
//! Prints `{"items": [...], "pagination": {total, offset, limit, hasMore}}` on one line.
//! Without `--query` every item matches; `--limit 0` means no limit.
//!
//! ```bash
//! regpm search --query dialg
//! regpm search @acme @shadcn --query button --limit 10 --offset 10
//! ```

use anyhow::Result;
use clap::Args;

use crate::cli::CliConfig;
use crate::cli::common::{CommandContext, parse_namespaces, print_json};
use crate::search::{self, SearchOptions};

#[derive(Args)]
pub struct SearchCommand {
    /// Registry namespaces, `@shadcn` when omitted
    #[arg(value_name = "NAMESPACES")]
    namespaces: Vec<String>,

    /// Text to match against item names and descriptions
    #[arg(short = 'Q', long)]
    query: Option<String>,

    /// Maximum number of items to return
    #[arg(short, long)]
    limit: Option<usize>,

    /// Number of matching items to skip
    #[arg(short, long)]
    offset: Option<usize>,
}

impl SearchCommand {
    fn options(&self) -> SearchOptions {
        SearchOptions {
            query: self.query.clone(),
            limit: self.limit,
            offset: self.offset,
        }
    }

    pub async fn execute_with_config(self, cli: &CliConfig) -> Result<()> {
        let namespaces = parse_namespaces(&self.namespaces)?;
        let ctx = CommandContext::load(cli).await?;
        let client = ctx.client()?;

        let results = search::search(&client, &namespaces, &self.options()).await?;
        tracing::debug!(
            "Search matched {} items, returning {}",
            results.pagination.total,
            results.items.len()
        );
        print_json(&results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    #[test]
    fn test_search_options_from_flags() {
        let cli = Cli::try_parse_from([
            "regpm", "search", "@acme", "--query", "dialg", "--limit", "5", "--offset", "10",
        ]);
        assert!(cli.is_ok());

        let cmd = SearchCommand {
            namespaces: vec!["@acme".to_string()],
            query: Some("dialg".to_string()),
            limit: Some(0),
            offset: None,
        };
        assert_eq!(
            cmd.options(),
            SearchOptions {
                query: Some("dialg".to_string()),
                limit: Some(0),
                offset: None,
            }
        );
    }
}
