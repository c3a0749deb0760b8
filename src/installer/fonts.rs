//! Font items.
//!
//! The first `registry:font` of a graph becomes the project's sans family. Next.js projects
//! load it through `next/font`, so the stylesheet only maps the variable in `@theme inline`.
//! Other frameworks get the `@fontsource-variable/<name>` package, its `@import`, and base
//! layer rules applying `font-sans`.

use crate::project::Framework;
use crate::resolver::{ResolvedGraph, merge_missing_json};
use serde_json::json;
use std::borrow::Cow;

/// npm package serving the variable build of `item`'s font.
#[must_use]
pub fn fontsource_package(item: &str) -> String {
    format!("@fontsource-variable/{}", item.strip_prefix("font-").unwrap_or(item))
}

/// Fold the graph's first font into its dependencies, CSS variables and rules.
#[must_use]
pub fn apply(graph: &ResolvedGraph, framework: Framework) -> Cow<'_, ResolvedGraph> {
    let Some((item, font)) = graph.fonts.first() else {
        return Cow::Borrowed(graph);
    };
    if graph.fonts.len() > 1 {
        tracing::warn!("{} fonts requested; only {} is applied", graph.fonts.len(), item);
    }

    let mut graph = graph.clone();
    let variable = font.variable.trim_start_matches("--").to_string();

    if matches!(framework, Framework::NextApp | Framework::NextPages) {
        graph.css_vars.theme.insert(variable.clone(), format!("var(--{variable})"));
        tracing::debug!("Mapped --{} for {} in @theme inline", variable, item);
        return Cow::Owned(graph);
    }

    let package = fontsource_package(item);
    if !graph.dependencies.contains(&package) {
        graph.dependencies.push(package.clone());
    }

    let mut rules = serde_json::Map::new();
    rules.insert(format!("@import \"{package}\""), json!({}));
    rules.insert(
        "@layer base".to_string(),
        json!({
            "html": {"@apply font-sans": {}},
            "body": {"@apply font-sans bg-background text-foreground": {}}
        }),
    );
    merge_missing_json(&mut graph.css, &rules);
    graph.css_vars.theme.insert(variable, font.family.clone());

    tracing::debug!("Using {} for {}", package, item);
    Cow::Owned(graph)
}
