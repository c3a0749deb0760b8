//! Installation of a resolved graph into a project.
//!
//! [`install`] walks the items of a [`ResolvedGraph`] in traversal order and applies them:
//!
//! 1. **Placement**: every file gets a destination ([`paths::Placement`]). Two files
//!    landing on the same path collapse to the one met last.
//! 2. **Files**: scripts get their imports rewritten to the project's aliases
//!    ([`imports`]); everything else is written verbatim. A file that already exists with
//!    the same content is left alone; one with different content is kept unless
//!    `overwrite` is set.
//! 3. **Env files**: never written over. Their keys, and the aggregated `envVars`, are merged
//!    into the project's preferred env file ([`env_file`]).
//! 4. **Stylesheet**: CSS variables and rules are merged into the configured stylesheet
//!    ([`css`]). On Tailwind v4 the Tailwind `config` fragment is expressed there too.
//! 5. **Tailwind config**: on v3 the fragment is merged into `tailwind.config.*`
//!    ([`tailwind_config`]).
//! 6. **package.json**: npm dependencies are declared ([`package_json`]).
//!
//! A `registry:font` item is folded into the dependencies and styling first ([`fonts`]).
//!
//! Installation is not transactional: a failure leaves the files written so far in place.
//! Each env-file merge is atomic with respect to other merges.

pub mod css;
pub mod env_file;
pub mod fonts;
pub mod imports;
pub mod package_json;
pub mod paths;
pub mod tailwind_config;

mod context;

pub use context::{InstallContext, InstallContextBuilder};
pub use env_file::EnvMerge;
pub use package_json::PackageUpdate;

use crate::config::ProjectConfig;
use crate::constants::DEFAULT_ENV_FILE;
use crate::core::RegistryError;
use crate::core::RegistryFile;
use crate::resolver::ResolvedGraph;
use crate::utils::fs::{display_relative, read_optional, safe_write};
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// What happened to one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileAction {
    Created,
    Updated,
    /// Already present with identical content.
    Unchanged,
    /// Present with different content and `overwrite` not set.
    Skipped,
}

/// One written (or planned) file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    /// Path relative to the project root, forward slashes.
    pub path: String,
    pub item: String,
    pub action: FileAction,
}

/// Result of an installation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstallSummary {
    pub dry_run: bool,
    pub files: Vec<FileOutcome>,
    pub env: Vec<EnvMerge>,
    /// Stylesheet that was (or would be) updated, relative to the root.
    pub stylesheet: Option<String>,
    /// Tailwind JS config that was (or would be) updated, relative to the root.
    pub tailwind_config: Option<String>,
    /// Tailwind fragment to add by hand, with the config's path, when it could not be merged.
    pub tailwind_manual: Option<(String, serde_json::Value)>,
    /// `None` when there was nothing to declare.
    pub packages: Option<PackageUpdate>,
    /// Packages to install by hand because the project has no `package.json`.
    pub manual_dependencies: Vec<String>,
    pub docs: Vec<String>,
}

impl InstallSummary {
    /// Paths with the given action.
    #[must_use]
    pub fn paths(&self, action: FileAction) -> Vec<&str> {
        self.files.iter().filter(|f| f.action == action).map(|f| f.path.as_str()).collect()
    }
}

struct PlannedFile<'g> {
    item: &'g str,
    file: &'g RegistryFile,
    destination: PathBuf,
}

/// Install every item of `graph`.
///
/// Without a project configuration only universal items (see
/// [`crate::core::RegistryItem::is_universal`]) can be installed; anything else fails
/// with [`RegistryError::ConfigMissing`] before a single file is written.
pub async fn install(ctx: &InstallContext<'_>, graph: &ResolvedGraph) -> Result<InstallSummary> {
    if ctx.config.is_none()
        && let Some(resolved) = graph.items.iter().find(|r| !r.item.is_universal())
    {
        tracing::debug!("{} needs a project configuration", resolved.key);
        return Err(RegistryError::ConfigMissing {
            path: ctx.root().display().to_string(),
        }
        .into());
    }

    let default_config = ProjectConfig::default();
    let config = ctx.config.unwrap_or(&default_config);
    let with_fonts = fonts::apply(graph, ctx.project.framework);
    let graph: &ResolvedGraph = &with_fonts;

    let mut summary = InstallSummary {
        dry_run: ctx.dry_run,
        docs: graph.docs.clone(),
        ..Default::default()
    };

    let planned = plan_files(ctx, config, graph)?;
    let mut env_files: Vec<(PathBuf, Vec<(String, String)>)> = Vec::new();

    for planned in &planned {
        if env_file::is_env_file(&planned.destination) {
            let vars = env_file::parse_env(&planned.file.content);
            env_files.push((planned.destination.clone(), vars));
            continue;
        }
        summary.files.push(write_file(ctx, config, planned)?);
    }

    for (destination, vars) in env_files {
        let target = env_file::find_existing(ctx.root()).unwrap_or(destination);
        summary.env.push(merge_env(ctx, &target, &vars).await?);
    }

    if !graph.env_vars.is_empty() {
        let target =
            env_file::find_existing(ctx.root()).unwrap_or_else(|| ctx.root().join(DEFAULT_ENV_FILE));
        summary.env.push(merge_env(ctx, &target, &graph.env_vars).await?);
    }

    summary.stylesheet = update_stylesheet(ctx, config, graph)?;
    update_tailwind_config(ctx, config, graph, &mut summary)?;

    if !graph.dependencies.is_empty() || !graph.dev_dependencies.is_empty() {
        let manifest = ctx.root().join("package.json");
        match package_json::update_file(&manifest, &graph.dependencies, &graph.dev_dependencies, ctx.dry_run)? {
            Some(update) => summary.packages = Some(update),
            None => {
                tracing::warn!("No package.json in {}; dependencies must be installed manually", ctx.root().display());
                summary.manual_dependencies =
                    graph.dependencies.iter().chain(&graph.dev_dependencies).cloned().collect();
            }
        }
    }

    tracing::debug!(
        "Install finished: {} created, {} updated, {} unchanged, {} skipped",
        summary.paths(FileAction::Created).len(),
        summary.paths(FileAction::Updated).len(),
        summary.paths(FileAction::Unchanged).len(),
        summary.paths(FileAction::Skipped).len()
    );

    Ok(summary)
}

/// Destinations for every file, last writer wins on collisions.
fn plan_files<'g>(
    ctx: &InstallContext<'_>,
    config: &ProjectConfig,
    graph: &'g ResolvedGraph,
) -> Result<Vec<PlannedFile<'g>>> {
    let placement =
        paths::Placement::new(ctx.project, &config.aliases).with_path_override(ctx.path_override.as_deref());

    let mut planned = Vec::new();
    for resolved in &graph.items {
        for file in &resolved.item.files {
            let destination = placement.destination(&resolved.item.name, file)?;
            planned.push(PlannedFile {
                item: &resolved.item.name,
                file,
                destination,
            });
        }
    }

    let mut seen = HashSet::new();
    let mut kept: Vec<PlannedFile<'g>> =
        planned.into_iter().rev().filter(|p| seen.insert(p.destination.clone())).collect();
    kept.reverse();
    Ok(kept)
}

fn write_file(ctx: &InstallContext<'_>, config: &ProjectConfig, planned: &PlannedFile<'_>) -> Result<FileOutcome> {
    let destination = &planned.destination;
    let content = if imports::is_script(destination) {
        imports::rewrite_imports(&planned.file.content, &config.aliases)
    } else {
        planned.file.content.clone()
    };

    let action = match read_optional(destination)? {
        None => FileAction::Created,
        Some(existing) if existing == content => FileAction::Unchanged,
        Some(_) if ctx.overwrite => FileAction::Updated,
        Some(_) => FileAction::Skipped,
    };

    if matches!(action, FileAction::Created | FileAction::Updated) && !ctx.dry_run {
        safe_write(destination, &content)
            .with_context(|| format!("Failed to write {} for {}", destination.display(), planned.item))?;
    }

    tracing::debug!("{:?} {} ({})", action, destination.display(), planned.item);

    Ok(FileOutcome {
        path: display_relative(ctx.root(), destination),
        item: planned.item.to_string(),
        action,
    })
}

async fn merge_env(ctx: &InstallContext<'_>, target: &Path, vars: &[(String, String)]) -> Result<EnvMerge> {
    if ctx.dry_run {
        return Ok(EnvMerge {
            path: target.to_path_buf(),
            added: env_file::pending_keys(target, vars)?,
            created: !target.exists(),
        });
    }
    env_file::merge_into(target, vars)
        .await
        .with_context(|| format!("Failed to merge environment variables into {}", target.display()))
}

fn update_stylesheet(ctx: &InstallContext<'_>, config: &ProjectConfig, graph: &ResolvedGraph) -> Result<Option<String>> {
    let edit = css::CssEdit {
        css_vars: &graph.css_vars,
        rules: &graph.css,
        tailwind_v4: config.tailwind.js_config().is_none(),
        css_variables: config.tailwind.css_variables,
        tailwind: graph.tailwind.as_ref(),
    };
    if edit.is_empty() {
        return Ok(None);
    }

    let configured = config.tailwind.css.as_deref().map(str::trim).filter(|c| !c.is_empty());
    let Some(relative) = configured.map(str::to_string).or_else(|| ctx.project.find_stylesheet()) else {
        tracing::warn!("No stylesheet configured or found; skipping CSS variables and rules");
        return Ok(None);
    };
    let path = ctx.root().join(&relative);

    let changed = if ctx.dry_run {
        let existing = read_optional(&path)?.unwrap_or_default();
        css::apply(&existing, &edit) != existing
    } else {
        css::update_file(&path, &edit).with_context(|| format!("Failed to update {}", path.display()))?
    };

    Ok(changed.then(|| display_relative(ctx.root(), &path)))
}

/// Merge the Tailwind fragment into a v3 JS config; v4 projects took it in the stylesheet.
fn update_tailwind_config(
    ctx: &InstallContext<'_>,
    config: &ProjectConfig,
    graph: &ResolvedGraph,
    summary: &mut InstallSummary,
) -> Result<()> {
    let Some(fragment) = graph.tailwind.as_ref().and_then(|f| f.as_object()).filter(|f| !f.is_empty()) else {
        return Ok(());
    };
    let Some(js_config) = config.tailwind.js_config() else {
        return Ok(());
    };

    let path = ctx.root().join(js_config);
    let updated = tailwind_config::update_file(&path, fragment, ctx.dry_run)
        .with_context(|| format!("Failed to update {}", path.display()))?;

    match updated {
        Some(true) => summary.tailwind_config = Some(display_relative(ctx.root(), &path)),
        Some(false) => tracing::debug!("{} already has the Tailwind fragment", js_config),
        None => {
            tracing::warn!(
                "Could not find the config object in {}; add the following by hand: {}",
                js_config,
                serde_json::to_string(fragment).unwrap_or_default()
            );
            summary.tailwind_manual = Some((js_config.to_string(), serde_json::Value::Object(fragment.clone())));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests;
