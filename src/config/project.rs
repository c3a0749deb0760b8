//! `components.json` - the per-project configuration file.
//!
//! Every key is optional. A file that only declares `registries` (a "shadow config") is
//! valid and behaves like a full configuration with defaults for everything else.
//!
//! ```json
//! {
//!   "style": "new-york",
//!   "tailwind": { "css": "app/globals.css", "cssVariables": true },
//!   "aliases": { "components": "@/components", "ui": "@/components/ui" },
//!   "registries": {
//!     "@acme": "https://registry.acme.dev/r/{name}.json",
//!     "@private": {
//!       "url": "https://private.acme.dev/r/{name}.json",
//!       "headers": { "Authorization": "Bearer ${ACME_TOKEN}" },
//!       "params": { "version": "latest" }
//!     }
//!   }
//! }
//! ```

use crate::constants::{CONFIG_FILE_NAME, DEFAULT_STYLE};
use crate::core::RegistryError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;

fn default_true() -> bool {
    true
}

fn is_true(value: &bool) -> bool {
    *value
}

/// Tailwind section of the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TailwindConfig {
    /// Path of a JavaScript/TypeScript Tailwind config (v3). Empty or absent means v4.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<String>,
    /// Stylesheet that receives CSS variables and rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_color: Option<String>,
    #[serde(default = "default_true")]
    pub css_variables: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}

impl Default for TailwindConfig {
    fn default() -> Self {
        Self {
            config: None,
            css: None,
            base_color: None,
            css_variables: true,
            prefix: None,
        }
    }
}

impl TailwindConfig {
    /// The JS config path, ignoring the empty string that v4 projects write.
    #[must_use]
    pub fn js_config(&self) -> Option<&str> {
        self.config.as_deref().map(str::trim).filter(|c| !c.is_empty())
    }
}

/// Import aliases used by the project. Missing entries take the conventional defaults.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Aliases {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utils: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lib: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hooks: Option<String>,
}

impl Aliases {
    #[must_use]
    pub fn components(&self) -> String {
        self.components.clone().unwrap_or_else(|| "@/components".to_string())
    }

    #[must_use]
    pub fn utils(&self) -> String {
        self.utils.clone().unwrap_or_else(|| format!("{}/utils", self.lib()))
    }

    #[must_use]
    pub fn ui(&self) -> String {
        self.ui.clone().unwrap_or_else(|| format!("{}/ui", self.components()))
    }

    #[must_use]
    pub fn lib(&self) -> String {
        self.lib.clone().unwrap_or_else(|| {
            // `@/lib/utils` implies a `@/lib` directory
            self.utils
                .as_deref()
                .and_then(|u| u.strip_suffix("/utils"))
                .map_or_else(|| "@/lib".to_string(), str::to_string)
        })
    }

    #[must_use]
    pub fn hooks(&self) -> String {
        self.hooks.clone().unwrap_or_else(|| "@/hooks".to_string())
    }
}

/// A `registries` value: a bare URL template or a detailed entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RegistryEntry {
    Url(String),
    Detailed {
        url: String,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        headers: BTreeMap<String, String>,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        params: BTreeMap<String, String>,
    },
}

impl RegistryEntry {
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            RegistryEntry::Url(url) => url,
            RegistryEntry::Detailed {
                url, ..
            } => url,
        }
    }
}

/// Parsed `components.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub tsx: bool,
    #[serde(default)]
    pub rsc: bool,
    #[serde(default)]
    pub tailwind: TailwindConfig,
    #[serde(default)]
    pub aliases: Aliases,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub registries: BTreeMap<String, RegistryEntry>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            schema: None,
            style: None,
            tsx: true,
            rsc: false,
            tailwind: TailwindConfig::default(),
            aliases: Aliases::default(),
            registries: BTreeMap::new(),
        }
    }
}

impl ProjectConfig {
    /// Configuration file path inside `project_dir`.
    #[must_use]
    pub fn path_in(project_dir: &Path) -> PathBuf {
        project_dir.join(CONFIG_FILE_NAME)
    }

    /// Load `components.json` from `project_dir`, or `None` when the file does not exist.
    ///
    /// # Errors
    ///
    /// [`RegistryError::ConfigParseError`] when the file exists but is not valid JSON for
    /// this schema; I/O failures are returned with context.
    pub async fn load(project_dir: &Path) -> Result<Option<Self>> {
        let path = Self::path_in(project_dir);
        if !path.exists() {
            tracing::debug!("No {} in {}", CONFIG_FILE_NAME, project_dir.display());
            return Ok(None);
        }
        Self::load_from(&path).await.map(Some)
    }

    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read configuration from {}", path.display()))?;

        let config = Self::parse(&content, path)?;
        tracing::debug!(
            "Loaded {} with {} registr{}",
            path.display(),
            config.registries.len(),
            if config.registries.len() == 1 { "y" } else { "ies" }
        );
        Ok(config)
    }

    /// Parse configuration text; `path` only labels errors.
    pub fn parse(content: &str, path: &Path) -> Result<Self, RegistryError> {
        serde_json::from_str(content).map_err(|e| RegistryError::ConfigParseError {
            file: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    pub async fn save_to(&self, path: &Path) -> Result<()> {
        let mut content =
            serde_json::to_string_pretty(self).context("Failed to serialize configuration")?;
        content.push('\n');

        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || crate::utils::fs::safe_write(&path, &content))
            .await
            .context("Failed to spawn blocking task for configuration write")??;
        Ok(())
    }

    /// Style substituted into `{style}` placeholders.
    #[must_use]
    pub fn style(&self) -> &str {
        self.style.as_deref().filter(|s| !s.is_empty()).unwrap_or(DEFAULT_STYLE)
    }
}
