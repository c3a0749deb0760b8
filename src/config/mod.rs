//! Configuration for regpm
//!
//! Two layers live here:
//!
//! - [`project`] - the on-disk `components.json` model ([`ProjectConfig`])
//! - [`RegistryConfig`] - the namespace → endpoint view the registry client works from,
//!   built once per command from an optional [`ProjectConfig`] and passed explicitly to
//!   the client, the resolver and the search engine
//!
//! # Built-in Registry
//!
//! `@shadcn` is always available. Its items live at
//! `<base>/styles/<style>/<name>.json` and its index at `<base>/index.json`, where
//! `<base>` is `$REGISTRY_URL` when set and `https://ui.shadcn.com/r` otherwise. A
//! `registries["@shadcn"]` entry replaces the built-in endpoint.
//!
//! # Placeholders
//!
//! Templates contain `{name}` (required) and optionally `{style}`. URLs, header values
//! and parameter values may contain `${VAR}`; see [`env`]. Expansion happens each time a
//! request is built.
//!
//! # Examples
//!
//! ```rust
//! use regpm_cli::config::{ProjectConfig, RegistryConfig};
//! use std::path::Path;
//!
//! let config = ProjectConfig::parse(
//!     r#"{"registries": {"@acme": "https://r.acme.dev/{name}.json"}}"#,
//!     Path::new("components.json"),
//! ).unwrap();
//!
//! let registries = RegistryConfig::new(Some(&config)).unwrap();
//! let endpoint = registries.endpoint("@acme").unwrap();
//! assert_eq!(endpoint.item_url("ui/button").unwrap(), "https://r.acme.dev/ui/button.json");
//! ```

pub mod env;
pub mod project;

pub use project::{Aliases, ProjectConfig, RegistryEntry, TailwindConfig};

use crate::constants::{
    BUILTIN_NAMESPACE, DEFAULT_REGISTRY_BASE, DEFAULT_STYLE, REGISTRY_INDEX_ITEM,
    REGISTRY_URL_ENV,
};
use crate::core::RegistryError;
use crate::registry::reference::validate_namespace;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use std::collections::BTreeMap;

/// Characters escaped inside one path segment or query component.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

/// Where an endpoint's URLs come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointSource {
    /// The built-in registry, based at `$REGISTRY_URL` or the default base.
    Builtin,
    /// A configured template containing `{name}`.
    Template(String),
}

/// A configured registry namespace, ready to build requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEndpoint {
    pub namespace: String,
    pub source: EndpointSource,
    headers: BTreeMap<String, String>,
    params: BTreeMap<String, String>,
    style: String,
}

impl RegistryEndpoint {
    fn builtin(style: &str) -> Self {
        Self {
            namespace: BUILTIN_NAMESPACE.to_string(),
            source: EndpointSource::Builtin,
            headers: BTreeMap::new(),
            params: BTreeMap::new(),
            style: style.to_string(),
        }
    }

    /// Fail with [`RegistryError::MissingEnvVar`] if any placeholder cannot be expanded now.
    pub fn check_env(&self) -> Result<(), RegistryError> {
        let template = match &self.source {
            EndpointSource::Template(template) => Some(template.as_str()),
            EndpointSource::Builtin => None,
        };
        env::check_all(
            template
                .into_iter()
                .chain(self.headers.values().map(String::as_str))
                .chain(self.params.values().map(String::as_str)),
            &self.namespace,
        )
    }

    /// URL of item `name`. Each `/`-separated segment of the name is percent-encoded.
    pub fn item_url(&self, name: &str) -> Result<String, RegistryError> {
        let encoded = encode_name(name);
        let url = match &self.source {
            EndpointSource::Builtin => {
                format!("{}/styles/{}/{}.json", builtin_base(), self.style, encoded)
            }
            EndpointSource::Template(template) => env::expand(template, &self.namespace)?
                .replace("{style}", &self.style)
                .replace("{name}", &encoded),
        };
        self.append_params(url)
    }

    /// URL of the namespace's index document.
    pub fn index_url(&self) -> Result<String, RegistryError> {
        match &self.source {
            EndpointSource::Builtin => self.append_params(format!("{}/index.json", builtin_base())),
            EndpointSource::Template(_) => self.item_url(REGISTRY_INDEX_ITEM),
        }
    }

    /// Request headers with placeholders expanded. Headers that expand to blank are dropped.
    pub fn headers(&self) -> Result<Vec<(String, String)>, RegistryError> {
        let mut headers = Vec::with_capacity(self.headers.len());
        for (key, value) in &self.headers {
            let value = env::expand(value, &self.namespace)?;
            if !value.trim().is_empty() {
                headers.push((key.clone(), value));
            }
        }
        Ok(headers)
    }

    fn append_params(&self, mut url: String) -> Result<String, RegistryError> {
        let mut query = Vec::new();
        for (key, value) in &self.params {
            let value = env::expand(value, &self.namespace)?;
            if value.trim().is_empty() {
                continue;
            }
            query.push(format!(
                "{}={}",
                utf8_percent_encode(key, COMPONENT),
                utf8_percent_encode(&value, COMPONENT)
            ));
        }

        if !query.is_empty() {
            url.push(if url.contains('?') { '&' } else { '?' });
            url.push_str(&query.join("&"));
        }
        Ok(url)
    }
}

fn builtin_base() -> String {
    std::env::var(REGISTRY_URL_ENV)
        .ok()
        .filter(|base| !base.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_REGISTRY_BASE.to_string())
        .trim_end_matches('/')
        .to_string()
}

fn encode_name(name: &str) -> String {
    name.split('/')
        .map(|segment| utf8_percent_encode(segment, COMPONENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

/// Namespace → endpoint map for one command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    style: String,
    endpoints: BTreeMap<String, RegistryEndpoint>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        let mut endpoints = BTreeMap::new();
        endpoints.insert(BUILTIN_NAMESPACE.to_string(), RegistryEndpoint::builtin(DEFAULT_STYLE));
        Self {
            style: DEFAULT_STYLE.to_string(),
            endpoints,
        }
    }
}

impl RegistryConfig {
    /// Build the endpoint map from an optional project configuration.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::InvalidNamespace`] for a `registries` key that is not `@name`
    /// - [`RegistryError::InvalidUrl`] for a template without `{name}`
    pub fn new(config: Option<&ProjectConfig>) -> Result<Self, RegistryError> {
        let style = config.map_or(DEFAULT_STYLE, ProjectConfig::style).to_string();

        let mut endpoints = BTreeMap::new();
        endpoints.insert(BUILTIN_NAMESPACE.to_string(), RegistryEndpoint::builtin(&style));

        for (namespace, entry) in config.map(|c| &c.registries).into_iter().flatten() {
            validate_namespace(namespace)?;

            if !entry.url().contains("{name}") {
                return Err(RegistryError::InvalidUrl {
                    url: entry.url().to_string(),
                    reason: format!("the URL for {namespace} must include the {{name}} placeholder"),
                });
            }

            let (headers, params) = match entry {
                RegistryEntry::Url(_) => (BTreeMap::new(), BTreeMap::new()),
                RegistryEntry::Detailed {
                    headers,
                    params,
                    ..
                } => (headers.clone(), params.clone()),
            };

            endpoints.insert(
                namespace.clone(),
                RegistryEndpoint {
                    namespace: namespace.clone(),
                    source: EndpointSource::Template(entry.url().to_string()),
                    headers,
                    params,
                    style: style.clone(),
                },
            );
        }

        Ok(Self {
            style,
            endpoints,
        })
    }

    #[must_use]
    pub fn style(&self) -> &str {
        &self.style
    }

    #[must_use]
    pub fn is_configured(&self, namespace: &str) -> bool {
        self.endpoints.contains_key(namespace)
    }

    /// Endpoint for `namespace`.
    ///
    /// # Errors
    ///
    /// [`RegistryError::UnknownRegistry`], whose message includes a config snippet.
    pub fn endpoint(&self, namespace: &str) -> Result<&RegistryEndpoint, RegistryError> {
        self.endpoints.get(namespace).ok_or_else(|| RegistryError::UnknownRegistry {
            namespace: namespace.to_string(),
        })
    }
}
