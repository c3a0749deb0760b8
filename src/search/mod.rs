//! Listing and searching registry indexes.
//!
//! Each namespace's `registry` index is fetched and flattened into [`SearchRecord`]s. A query
//! keeps only matching records, ordered by match quality:
//!
//! | Tier | Match                                                          |
//! |------|----------------------------------------------------------------|
//! | 0    | name equals the query (case-insensitive)                       |
//! | 1    | name contains the query                                        |
//! | 2    | description contains the query                                 |
//! | 3    | one edit away (insert, delete, substitute, transpose) from the name or one of its tokens |
//! | 4    | query letters appear in order in the name, from a token start  |
//!
//! `-`, `_` and spaces are interchangeable, so `alert dialog` finds `alert-dialog`. Queries
//! shorter than three characters skip the typo tier. Within a tier, records keep registry
//! order, then index order.
//!
//! Every namespace is checked before the first request: one unknown namespace fails the
//! whole call.

use crate::core::{IndexEntry, RegistryError, SearchRecord};
use crate::registry::RegistryClient;
use futures::future::try_join_all;
use serde::Serialize;
use std::future::Future;

/// Where indexes come from.
pub trait IndexSource: Send + Sync {
    /// Offline check that `namespace` can be queried.
    fn check_namespace(&self, namespace: &str) -> Result<(), RegistryError>;

    fn fetch_index(&self, namespace: &str) -> impl Future<Output = Result<Vec<IndexEntry>, RegistryError>> + Send;
}

impl IndexSource for RegistryClient {
    fn check_namespace(&self, namespace: &str) -> Result<(), RegistryError> {
        self.registries().endpoint(namespace)?.check_env()
    }

    fn fetch_index(&self, namespace: &str) -> impl Future<Output = Result<Vec<IndexEntry>, RegistryError>> + Send {
        RegistryClient::fetch_index(self, namespace)
    }
}

/// Search parameters. `limit` of `None` or `0` means unlimited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOptions {
    pub query: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: usize,
    pub offset: usize,
    pub limit: usize,
    pub has_more: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResults {
    pub items: Vec<SearchRecord>,
    pub pagination: Pagination,
}

/// One namespace's index, as printed by `list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistryListing {
    pub registry: String,
    pub items: Vec<IndexEntry>,
}

async fn fetch_all<S: IndexSource>(
    source: &S,
    namespaces: &[String],
) -> Result<Vec<(String, Vec<IndexEntry>)>, RegistryError> {
    for namespace in namespaces {
        source.check_namespace(namespace)?;
    }

    try_join_all(namespaces.iter().map(|namespace| async move {
        let entries = source.fetch_index(namespace).await?;
        Ok::<_, RegistryError>((namespace.clone(), entries))
    }))
    .await
}

/// Indexes of `namespaces`, in the order given.
pub async fn list<S: IndexSource>(source: &S, namespaces: &[String]) -> Result<Vec<RegistryListing>, RegistryError> {
    Ok(fetch_all(source, namespaces)
        .await?
        .into_iter()
        .map(|(registry, items)| RegistryListing {
            registry,
            items,
        })
        .collect())
}

/// Search `namespaces` and paginate the matches.
pub async fn search<S: IndexSource>(
    source: &S,
    namespaces: &[String],
    options: &SearchOptions,
) -> Result<SearchResults, RegistryError> {
    let records: Vec<SearchRecord> = fetch_all(source, namespaces)
        .await?
        .into_iter()
        .flat_map(|(registry, entries)| {
            entries.into_iter().map(move |entry| SearchRecord {
                add_command_argument: format!("{registry}/{}", entry.name),
                name: entry.name,
                item_type: entry.item_type,
                description: entry.description,
                registry: registry.clone(),
            })
        })
        .collect();

    let filtered = match options.query.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        Some(query) => rank(records, query),
        None => records,
    };

    tracing::debug!("Search matched {} records", filtered.len());
    Ok(paginate(filtered, options.limit, options.offset))
}

fn normalize(text: &str) -> String {
    text.to_lowercase().replace([' ', '_'], "-")
}

fn compact(text: &str) -> String {
    normalize(text).replace('-', "")
}

/// Match tier of `record` for `query`, `None` when it does not match.
fn tier(record: &SearchRecord, query: &str) -> Option<u8> {
    let name = normalize(&record.name);
    let wanted = normalize(query);

    if name == wanted {
        return Some(0);
    }
    if name.contains(&wanted) || compact(&record.name).contains(&compact(query)) {
        return Some(1);
    }
    if let Some(description) = &record.description
        && description.to_lowercase().contains(&query.to_lowercase())
    {
        return Some(2);
    }

    let wanted_compact = compact(query);
    if wanted_compact.chars().count() >= 3 {
        let close = |candidate: &str| strsim::osa_distance(&wanted_compact, candidate) <= 1;
        if close(&compact(&record.name)) || name.split('-').filter(|t| !t.is_empty()).any(close) {
            return Some(3);
        }
    }

    if is_abbreviation(&name, &wanted_compact) {
        return Some(4);
    }

    None
}

/// Whether the letters of `query` occur in order in `name`, the first one at a token start.
fn is_abbreviation(name: &str, query: &str) -> bool {
    let mut letters = query.chars();
    let Some(first) = letters.next() else {
        return false;
    };
    if query.chars().count() < 2 {
        return false;
    }

    name.char_indices()
        .filter(|(i, c)| *c == first && (*i == 0 || name[..*i].ends_with('-')))
        .any(|(i, c)| {
            let mut rest = name[i + c.len_utf8()..].chars().filter(|ch| *ch != '-');
            letters.clone().all(|wanted| rest.any(|ch| ch == wanted))
        })
}

/// Matching records, best tier first; ties keep their input order.
#[must_use]
pub fn rank(records: Vec<SearchRecord>, query: &str) -> Vec<SearchRecord> {
    let mut scored: Vec<(u8, SearchRecord)> =
        records.into_iter().filter_map(|record| tier(&record, query).map(|t| (t, record))).collect();
    scored.sort_by_key(|(tier, _)| *tier);
    scored.into_iter().map(|(_, record)| record).collect()
}

/// Slice `records`; a missing or zero `limit` is unlimited and reported as the total.
#[must_use]
pub fn paginate(records: Vec<SearchRecord>, limit: Option<usize>, offset: Option<usize>) -> SearchResults {
    let total = records.len();
    let offset = offset.unwrap_or(0);
    let limit = limit.filter(|l| *l > 0).unwrap_or(total);

    let items: Vec<SearchRecord> = records.into_iter().skip(offset).take(limit).collect();
    let has_more = offset + items.len() < total;

    SearchResults {
        items,
        pagination: Pagination {
            total,
            offset,
            limit,
            has_more,
        },
    }
}
