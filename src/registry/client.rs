//! HTTP client for registry endpoints.
//!
//! [`RegistryClient`] turns a [`RegistryReference`] into one `GET` request and classifies
//! the outcome:
//!
//! | Response                                         | Error                             |
//! |--------------------------------------------------|-----------------------------------|
//! | 401, 403, or any non-2xx `{"error":"Unauthorized"}` | [`RegistryError::Unauthorized`] |
//! | 404                                              | [`RegistryError::NotFound`]       |
//! | other non-2xx                                    | [`RegistryError::RegistryHttpError`] |
//! | 2xx that fails the item schema                   | [`RegistryError::ValidationError`] |
//! | connect/DNS/timeout                              | [`RegistryError::TransportError`] |
//!
//! There are no retries. Every request is bounded by the client's total and connect
//! timeouts.

use crate::config::RegistryConfig;
use crate::constants::{CONNECT_TIMEOUT, REGISTRY_INDEX_ITEM, REQUEST_TIMEOUT};
use crate::core::{IndexEntry, RegistryError, RegistryIndex, RegistryItem};
use crate::registry::RegistryFetcher;
use crate::registry::reference::RegistryReference;
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// `{ "error": ..., "message": ... }` bodies registries send with error statuses.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Registry client bound to one command's configuration.
///
/// Cloning is cheap; clones share the connection pool and the configuration.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    http: reqwest::Client,
    registries: Arc<RegistryConfig>,
    base_dir: PathBuf,
}

impl RegistryClient {
    /// Client with the default timeouts. `base_dir` anchors relative file references.
    pub fn new(registries: RegistryConfig, base_dir: &Path) -> Result<Self, RegistryError> {
        Self::with_timeout(registries, base_dir, REQUEST_TIMEOUT, CONNECT_TIMEOUT)
    }

    pub fn with_timeout(
        registries: RegistryConfig,
        base_dir: &Path,
        request_timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self, RegistryError> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .connect_timeout(connect_timeout)
            .user_agent(concat!("regpm/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RegistryError::Other {
                message: format!("Failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            http,
            registries: Arc::new(registries),
            base_dir: base_dir.to_path_buf(),
        })
    }

    #[must_use]
    pub fn registries(&self) -> &RegistryConfig {
        &self.registries
    }

    /// Offline checks for a reference: namespace configured, placeholders resolvable.
    pub fn check(&self, reference: &RegistryReference) -> Result<(), RegistryError> {
        if let Some(namespace) = reference.namespace() {
            self.registries.endpoint(namespace)?.check_env()?;
        }
        Ok(())
    }

    /// Fetch and validate one item.
    pub async fn fetch(&self, reference: &RegistryReference) -> Result<RegistryItem, RegistryError> {
        match reference {
            RegistryReference::File {
                path,
            } => self.read_file(path).await,
            RegistryReference::Url {
                url,
            } => self.get_json(url, &[], &reference.to_string()).await,
            RegistryReference::Name {
                ..
            }
            | RegistryReference::Namespaced {
                ..
            } => {
                let namespace = reference.namespace().unwrap_or_default();
                let name = reference.name().unwrap_or_default();
                let endpoint = self.registries.endpoint(namespace)?;
                let url = endpoint.item_url(name)?;
                let headers = endpoint.headers()?;
                self.get_json(&url, &headers, &reference.key().to_string()).await
            }
        }
    }

    /// Fetch the metadata index of `namespace`.
    ///
    /// Entries keep only name, type and description.
    pub async fn fetch_index(&self, namespace: &str) -> Result<Vec<IndexEntry>, RegistryError> {
        let endpoint = self.registries.endpoint(namespace)?;
        endpoint.check_env()?;
        let url = endpoint.index_url()?;
        let headers = endpoint.headers()?;
        let label = format!("{namespace}/{REGISTRY_INDEX_ITEM}");

        let index: RegistryIndex = self.get_json(&url, &headers, &label).await?;
        let entries = index.into_entries();
        tracing::debug!("Index of {} lists {} items", namespace, entries.len());
        Ok(entries)
    }

    async fn read_file(&self, path: &Path) -> Result<RegistryItem, RegistryError> {
        let full = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        };
        tracing::debug!("Reading item from {}", full.display());

        let content = tokio::fs::read(&full).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                RegistryError::NotFound {
                    reference: path.display().to_string(),
                    url: full.display().to_string(),
                }
            } else {
                RegistryError::Other {
                    message: format!("Failed to read {}: {e}", full.display()),
                }
            }
        })?;

        serde_json::from_slice(&content).map_err(|e| RegistryError::ValidationError {
            reference: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        headers: &[(String, String)],
        reference: &str,
    ) -> Result<T, RegistryError> {
        let parsed = reqwest::Url::parse(url).map_err(|e| RegistryError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        tracing::debug!("GET {} ({})", url, reference);

        let mut request = self.http.get(parsed);
        for (key, value) in headers {
            request = request.header(key.as_str(), value.as_str());
        }

        let response = request.send().await.map_err(|e| transport_error(url, &e))?;
        let status = response.status();
        let body = response.bytes().await.map_err(|e| transport_error(url, &e))?;

        tracing::debug!("{} answered {}", url, status);

        if !status.is_success() {
            return Err(classify_failure(url, reference, status, &body));
        }

        serde_json::from_slice(&body).map_err(|e| RegistryError::ValidationError {
            reference: reference.to_string(),
            reason: e.to_string(),
        })
    }
}

impl RegistryFetcher for RegistryClient {
    fn validate(&self, reference: &RegistryReference) -> Result<(), RegistryError> {
        self.check(reference)
    }

    fn fetch_item(
        &self,
        reference: &RegistryReference,
    ) -> impl Future<Output = Result<RegistryItem, RegistryError>> + Send {
        self.fetch(reference)
    }
}

/// Map a non-2xx response to its error class.
fn classify_failure(url: &str, reference: &str, status: StatusCode, body: &[u8]) -> RegistryError {
    let parsed: ErrorBody = serde_json::from_slice(body).unwrap_or_default();
    let says_unauthorized = parsed.error.as_deref() == Some("Unauthorized");

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN || says_unauthorized {
        return RegistryError::Unauthorized {
            url: url.to_string(),
            message: parsed.message,
        };
    }

    if status == StatusCode::NOT_FOUND {
        return RegistryError::NotFound {
            reference: reference.to_string(),
            url: url.to_string(),
        };
    }

    let message = match (parsed.error, parsed.message) {
        (Some(error), Some(message)) => Some(format!("{error}: {message}")),
        (error, message) => error.or(message),
    };
    RegistryError::RegistryHttpError {
        url: url.to_string(),
        status: status.as_u16(),
        message,
    }
}

fn transport_error(url: &str, error: &reqwest::Error) -> RegistryError {
    let mut reason = if error.is_timeout() {
        "request timed out".to_string()
    } else {
        error.to_string()
    };

    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        let text = cause.to_string();
        if !reason.contains(&text) {
            reason.push_str(": ");
            reason.push_str(&text);
        }
        source = cause.source();
    }

    RegistryError::TransportError {
        url: url.to_string(),
        reason,
    }
}
