//! Recording npm dependencies in `package.json`.
//!
//! Packages are only declared, never installed. A package already present in
//! `dependencies`, `devDependencies` or `peerDependencies`, at any version, is left alone.

use crate::utils::fs::{read_optional, safe_write};
use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::path::Path;

const DECLARING_SECTIONS: [&str; 3] = ["dependencies", "devDependencies", "peerDependencies"];

/// Packages added by one update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageUpdate {
    pub dependencies: Vec<String>,
    pub dev_dependencies: Vec<String>,
}

impl PackageUpdate {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty() && self.dev_dependencies.is_empty()
    }
}

/// Split `name@version` into its parts. Scoped names keep their leading `@`; a missing
/// version is `latest`.
#[must_use]
pub fn split_spec(spec: &str) -> (&str, &str) {
    let spec = spec.trim();
    let search_from = usize::from(spec.starts_with('@'));
    match spec[search_from..].find('@') {
        Some(at) => {
            let at = at + search_from;
            let version = &spec[at + 1..];
            (&spec[..at], if version.is_empty() { "latest" } else { version })
        }
        None => (spec, "latest"),
    }
}

fn declared(manifest: &Map<String, Value>, name: &str) -> bool {
    DECLARING_SECTIONS
        .iter()
        .filter_map(|section| manifest.get(*section).and_then(Value::as_object))
        .any(|section| section.contains_key(name))
}

fn add_to(manifest: &mut Map<String, Value>, section: &str, specs: &[String]) -> Vec<String> {
    let mut added = Vec::new();

    for spec in specs {
        let (name, version) = split_spec(spec);
        if name.is_empty() || declared(manifest, name) {
            continue;
        }

        let entry = manifest.entry(section.to_string()).or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            tracing::warn!("\"{}\" in package.json is not an object; leaving it alone", section);
            break;
        }
        if let Value::Object(entries) = entry {
            entries.insert(name.to_string(), Value::String(version.to_string()));
            added.push(name.to_string());
        }
    }

    added
}

/// Add missing packages to a parsed `package.json`.
pub fn apply(manifest: &mut Map<String, Value>, dependencies: &[String], dev_dependencies: &[String]) -> PackageUpdate {
    PackageUpdate {
        dependencies: add_to(manifest, "dependencies", dependencies),
        dev_dependencies: add_to(manifest, "devDependencies", dev_dependencies),
    }
}

/// Update `package.json` at `path`. `None` when the project has no `package.json`.
///
/// With `dry_run`, the update is computed but not written.
pub fn update_file(
    path: &Path,
    dependencies: &[String],
    dev_dependencies: &[String],
    dry_run: bool,
) -> Result<Option<PackageUpdate>> {
    let Some(content) = read_optional(path)? else {
        return Ok(None);
    };

    let mut manifest: Map<String, Value> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    let update = apply(&mut manifest, dependencies, dev_dependencies);
    if update.is_empty() || dry_run {
        return Ok(Some(update));
    }

    let mut rendered = serde_json::to_string_pretty(&Value::Object(manifest))?;
    rendered.push('\n');
    safe_write(path, &rendered)?;

    tracing::debug!(
        "Added {} dependencies and {} dev dependencies to {}",
        update.dependencies.len(),
        update.dev_dependencies.len(),
        path.display()
    );
    Ok(Some(update))
}
