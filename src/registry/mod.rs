//! Registry addressing and fetching.
//!
//! - [`reference`] parses `name`, `@namespace/name`, URLs and local `.json` paths
//! - [`client`] performs the HTTP requests and classifies failures
//!
//! The dependency resolver talks to registries only through [`RegistryFetcher`], so tests
//! can drive it with an in-memory registry.

pub mod client;
pub mod reference;

pub use client::RegistryClient;
pub use reference::{ItemKey, RegistryReference, is_valid_namespace, parse_namespace};

use crate::core::{RegistryError, RegistryItem};
use std::future::Future;

/// Source of registry items.
pub trait RegistryFetcher: Send + Sync {
    /// Checks that need no network: the namespace is configured and its placeholders
    /// resolve.
    fn validate(&self, reference: &RegistryReference) -> Result<(), RegistryError>;

    /// Fetch one item. Called at most once per identity during a resolution.
    fn fetch_item(
        &self,
        reference: &RegistryReference,
    ) -> impl Future<Output = Result<RegistryItem, RegistryError>> + Send;
}
