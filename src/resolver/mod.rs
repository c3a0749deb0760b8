//! Transitive resolution of registry dependencies.
//!
//! Given root references, [`GraphResolver::resolve`] fetches every item reachable through
//! `registryDependencies`, across as many registries as the graph spans, and returns a
//! [`ResolvedGraph`]:
//!
//! - items are ordered depth-first, roots in the order requested (pre-order), so installs
//!   are reproducible
//! - each [`ItemKey`] appears once; diamonds collapse and cycles terminate
//! - any failure (unknown namespace, unauthorized dependency three levels down, schema
//!   error) aborts the whole resolution; the error reported is the first one met in
//!   traversal order
//!
//! # Concurrency
//!
//! All roots are validated before the first request. Roots, and then the unvisited
//! dependencies of each item, are prefetched concurrently into a [`DashMap`] cache. The
//! visited set and the traversal stack belong to the driving loop alone, which is the
//! only place identities are marked as seen.


use crate::core::{CssVars, FontSpec, ItemType, RegistryError, RegistryItem};
use crate::registry::{ItemKey, RegistryFetcher, RegistryReference};
use crate::utils::progress::ProgressBar;
use dashmap::DashMap;
use futures::future::join_all;
use std::collections::HashSet;

/// One item of a resolved graph.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedItem {
    pub key: ItemKey,
    pub reference: RegistryReference,
    pub item: RegistryItem,
}

/// The outcome of a resolution: ordered items plus everything aggregated from them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedGraph {
    pub items: Vec<ResolvedItem>,
    /// npm `dependencies`, first-appearance order, no duplicates.
    pub dependencies: Vec<String>,
    /// npm `devDependencies`, first-appearance order, no duplicates.
    pub dev_dependencies: Vec<String>,
    /// Env declarations; the first item declaring a key wins.
    pub env_vars: Vec<(String, String)>,
    pub css_vars: CssVars,
    /// Nested CSS rules, deep-merged.
    pub css: serde_json::Map<String, serde_json::Value>,
    /// Tailwind `config` fragment, deep-merged.
    pub tailwind: Option<serde_json::Value>,
    /// `(item name, font)` of every `registry:font` item, in traversal order.
    pub fonts: Vec<(String, FontSpec)>,
    pub docs: Vec<String>,
}

impl ResolvedGraph {
    /// Build a graph from already ordered items, aggregating their metadata.
    #[must_use]
    pub fn from_items(items: Vec<ResolvedItem>) -> Self {
        let mut graph = ResolvedGraph::default();

        for resolved in &items {
            let item = &resolved.item;

            for dep in &item.dependencies {
                if !graph.dependencies.contains(dep) {
                    graph.dependencies.push(dep.clone());
                }
            }
            for dep in &item.dev_dependencies {
                if !graph.dev_dependencies.contains(dep) {
                    graph.dev_dependencies.push(dep.clone());
                }
            }
            for (key, value) in &item.env_vars {
                if !graph.env_vars.iter().any(|(k, _)| k == key) {
                    graph.env_vars.push((key.clone(), value.clone()));
                }
            }
            if let Some(css_vars) = &item.css_vars {
                graph.css_vars.merge_missing(css_vars);
            }
            if let Some(css) = &item.css {
                merge_missing_json(&mut graph.css, css);
            }
            if let Some(serde_json::Value::Object(config)) =
                item.tailwind.as_ref().and_then(|t| t.config.as_ref())
            {
                if let serde_json::Value::Object(target) =
                    graph.tailwind.get_or_insert_with(|| serde_json::json!({}))
                {
                    merge_missing_json(target, config);
                }
            }
            if item.item_type == ItemType::Font
                && let Some(font) = &item.font
            {
                graph.fonts.push((item.name.clone(), font.clone()));
            }
            if let Some(docs) = item.docs.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
                graph.docs.push(docs.to_string());
            }
        }

        graph.items = items;
        graph
    }

    #[must_use]
    pub fn contains(&self, key: &ItemKey) -> bool {
        self.items.iter().any(|i| &i.key == key)
    }
}

/// Add keys of `source` missing from `target`, recursing into objects present in both.
pub fn merge_missing_json(
    target: &mut serde_json::Map<String, serde_json::Value>,
    source: &serde_json::Map<String, serde_json::Value>,
) {
    for (key, value) in source {
        match (target.get_mut(key), value) {
            (None, _) => {
                target.insert(key.clone(), value.clone());
            }
            (Some(serde_json::Value::Object(existing)), serde_json::Value::Object(incoming)) => {
                merge_missing_json(existing, incoming);
            }
            _ => {}
        }
    }
}

/// Resolver over any [`RegistryFetcher`].
pub struct GraphResolver<'a, F: RegistryFetcher> {
    fetcher: &'a F,
    cache: DashMap<ItemKey, Result<RegistryItem, RegistryError>>,
    progress: Option<ProgressBar>,
}

impl<'a, F: RegistryFetcher> GraphResolver<'a, F> {
    pub fn new(fetcher: &'a F) -> Self {
        Self {
            fetcher,
            cache: DashMap::new(),
            progress: None,
        }
    }

    /// Report fetches on `progress`.
    #[must_use]
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Resolve `roots` and everything they depend on.
    pub async fn resolve(&self, roots: &[RegistryReference]) -> Result<ResolvedGraph, RegistryError> {
        for root in roots {
            self.fetcher.validate(root)?;
        }

        self.prefetch(roots).await;

        let mut visited: HashSet<ItemKey> = HashSet::new();
        let mut ordered: Vec<ResolvedItem> = Vec::new();
        let mut stack: Vec<RegistryReference> = roots.iter().rev().cloned().collect();

        while let Some(reference) = stack.pop() {
            let key = reference.key();
            if !visited.insert(key.clone()) {
                tracing::debug!("Skipping {} (already resolved)", key);
                continue;
            }

            let item = self.take(&reference).await?;
            tracing::debug!(
                "Resolved {} ({}, {} registry dependencies)",
                key,
                item.item_type,
                item.registry_dependencies.len()
            );

            let dependencies = item
                .registry_dependencies
                .iter()
                .map(|dep| RegistryReference::parse(dep))
                .collect::<Result<Vec<_>, _>>()?;

            let pending: Vec<RegistryReference> =
                dependencies.iter().filter(|d| !visited.contains(&d.key())).cloned().collect();
            self.prefetch(&pending).await;

            for dep in pending.into_iter().rev() {
                stack.push(dep);
            }

            ordered.push(ResolvedItem {
                key,
                reference,
                item,
            });
        }

        if let Some(progress) = &self.progress {
            progress.finish_and_clear();
        }

        tracing::debug!("Resolution returned {} items", ordered.len());
        Ok(ResolvedGraph::from_items(ordered))
    }

    /// Fetch every reference not yet cached, concurrently.
    async fn prefetch(&self, references: &[RegistryReference]) {
        let mut seen = HashSet::new();
        let batch: Vec<&RegistryReference> = references
            .iter()
            .filter(|r| !self.cache.contains_key(&r.key()) && seen.insert(r.key()))
            .collect();

        if batch.is_empty() {
            return;
        }

        if let Some(progress) = &self.progress {
            let names: Vec<String> = batch.iter().map(ToString::to_string).collect();
            progress.set_message(format!("Fetching {}", names.join(", ")));
        }

        join_all(batch.into_iter().map(|reference| async move {
            let result = self.fetcher.fetch_item(reference).await;
            if let Err(e) = &result {
                tracing::debug!("Fetching {} failed: {}", reference, e);
            }
            self.cache.insert(reference.key(), result);
        }))
        .await;
    }

    async fn take(&self, reference: &RegistryReference) -> Result<RegistryItem, RegistryError> {
        if let Some((_, result)) = self.cache.remove(&reference.key()) {
            return result;
        }
        self.fetcher.fetch_item(reference).await
    }
}
