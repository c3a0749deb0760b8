//! Registry item model for regpm
//!
//! This module defines the payload types that registries serve and that the rest of the
//! engine passes around: [`RegistryItem`], its [`RegistryFile`]s, the validated
//! [`ItemType`] discriminant, and the listing projections used by `list`/`search`.
//!
//! # Parse Boundary
//!
//! Registry payloads vary in which optional fields they carry (`tailwind`, `cssVars`,
//! `registryDependencies`, ...). They are decoded into structs with explicit optional
//! fields; the `type` discriminant is a closed enum, so a missing or unknown `type`
//! is rejected by `serde_json` at the boundary instead of leaking an untyped map into
//! the resolver or installer.
//!
//! # Examples
//!
//! ```rust
//! use regpm_cli::core::{ItemType, RegistryItem};
//!
//! let item: RegistryItem = serde_json::from_str(r#"{
//!     "name": "button",
//!     "type": "registry:ui",
//!     "files": [{ "path": "ui/button.tsx", "content": "export {}", "type": "registry:ui" }]
//! }"#).unwrap();
//!
//! assert_eq!(item.item_type, ItemType::Ui);
//! assert_eq!(item.files.len(), 1);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Discriminant carried by every registry item and every registry file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemType {
    #[serde(rename = "registry:lib")]
    Lib,
    #[serde(rename = "registry:block")]
    Block,
    #[serde(rename = "registry:component")]
    Component,
    #[serde(rename = "registry:ui")]
    Ui,
    #[serde(rename = "registry:hook")]
    Hook,
    #[serde(rename = "registry:page")]
    Page,
    #[serde(rename = "registry:file")]
    File,
    #[serde(rename = "registry:style")]
    Style,
    #[serde(rename = "registry:theme")]
    Theme,
    #[serde(rename = "registry:item")]
    Item,
    #[serde(rename = "registry:example")]
    Example,
    #[serde(rename = "registry:font")]
    Font,
    #[serde(rename = "registry:base")]
    Base,
    #[serde(rename = "registry:internal")]
    Internal,
}

impl ItemType {
    /// The wire form, e.g. `registry:ui`.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Lib => "registry:lib",
            ItemType::Block => "registry:block",
            ItemType::Component => "registry:component",
            ItemType::Ui => "registry:ui",
            ItemType::Hook => "registry:hook",
            ItemType::Page => "registry:page",
            ItemType::File => "registry:file",
            ItemType::Style => "registry:style",
            ItemType::Theme => "registry:theme",
            ItemType::Item => "registry:item",
            ItemType::Example => "registry:example",
            ItemType::Font => "registry:font",
            ItemType::Base => "registry:base",
            ItemType::Internal => "registry:internal",
        }
    }

    /// Directory segment that conventionally precedes files of this type inside
    /// `file.path` (used to keep sub-paths such as `ui/forms/input.tsx`).
    #[must_use]
    pub fn path_segment(&self) -> Option<&'static str> {
        match self {
            ItemType::Ui => Some("ui"),
            ItemType::Lib => Some("lib"),
            ItemType::Hook => Some("hooks"),
            ItemType::Component | ItemType::Block | ItemType::Example => Some("components"),
            _ => None,
        }
    }

    /// Whether files of this type can only be placed through an explicit `target`.
    #[must_use]
    pub fn requires_target(&self) -> bool {
        matches!(self, ItemType::File | ItemType::Item)
    }
}

impl std::fmt::Display for ItemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ItemType {
    type Err = crate::core::RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(s.to_string())).map_err(|e| {
            crate::core::RegistryError::ValidationError {
                reference: s.to_string(),
                reason: e.to_string(),
            }
        })
    }
}

/// A single file shipped by a registry item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryFile {
    pub path: String,
    #[serde(default)]
    pub content: String,
    #[serde(rename = "type")]
    pub file_type: ItemType,
    /// Explicit destination, relative to the project root (`~/` prefix allowed).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

impl RegistryFile {
    /// The explicit target, ignoring empty strings some registries emit.
    #[must_use]
    pub fn explicit_target(&self) -> Option<&str> {
        self.target.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}

/// CSS variables grouped by the stylesheet section they land in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CssVars {
    /// `@theme inline` entries.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub theme: BTreeMap<String, String>,
    /// `:root` entries.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub light: BTreeMap<String, String>,
    /// `.dark` entries.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dark: BTreeMap<String, String>,
}

impl CssVars {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.theme.is_empty() && self.light.is_empty() && self.dark.is_empty()
    }

    /// Add every key of `other` that is not present yet. Existing keys keep their value.
    pub fn merge_missing(&mut self, other: &CssVars) {
        for (target, source) in [
            (&mut self.theme, &other.theme),
            (&mut self.light, &other.light),
            (&mut self.dark, &other.dark),
        ] {
            for (key, value) in source {
                target.entry(key.clone()).or_insert_with(|| value.clone());
            }
        }
    }
}

/// Tailwind configuration fragment shipped by an item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TailwindFragment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<serde_json::Value>,
}

/// The `font` block of a `registry:font` item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontSpec {
    /// CSS `font-family` value, e.g. `'Inter Variable', sans-serif`.
    pub family: String,
    /// CSS variable the family is exposed through, e.g. `--font-sans`.
    pub variable: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// Export name in `next/font/google`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subsets: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub weight: Vec<String>,
}

/// A registry item as served by a registry endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryItem {
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dev_dependencies: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub registry_dependencies: Vec<String>,
    #[serde(default)]
    pub files: Vec<RegistryFile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tailwind: Option<TailwindFragment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css_vars: Option<CssVars>,
    /// Nested CSS rules: selector or at-rule keys mapping to declarations or further rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css: Option<serde_json::Map<String, serde_json::Value>>,
    /// `envVars` in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty", with = "ordered_env")]
    pub env_vars: Vec<(String, String)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    /// Only on `registry:font` items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<FontSpec>,
    /// Project configuration carried by `registry:base` items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<serde_json::Value>,
}

impl RegistryItem {
    /// An item is universal when it can be installed without project configuration:
    /// every file is a plain file with an explicit target.
    #[must_use]
    pub fn is_universal(&self) -> bool {
        !self.files.is_empty()
            && self
                .files
                .iter()
                .all(|file| file.file_type.requires_target() && file.explicit_target().is_some())
    }
}

/// `envVars` objects as ordered pairs; key order is the declaration order.
mod ordered_env {
    use serde::de::Error;
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::{Map, Value};

    pub fn serialize<S: Serializer>(vars: &[(String, String)], serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(vars.len()))?;
        for (key, value) in vars {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<(String, String)>, D::Error> {
        Map::<String, Value>::deserialize(deserializer)?
            .into_iter()
            .map(|(key, value)| match value {
                Value::String(text) => Ok((key, text)),
                other => Err(D::Error::custom(format!("envVars.{key} must be a string, got {other}"))),
            })
            .collect()
    }
}

/// Metadata row of a registry index. Everything except name/type/description is dropped
/// at deserialization time, so listings can never leak files or styling payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The `registry` document of a namespace.
///
/// Registries publish either a wrapped document (`{ name, homepage, items }`) or, like the
/// built-in registry's `index.json`, a bare array of entries. Entries this build cannot
/// read (an item type it does not know, a missing name) are skipped rather than failing
/// the whole listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryIndex {
    pub name: Option<String>,
    pub homepage: Option<String>,
    pub items: Vec<IndexEntry>,
    /// Entries that were skipped.
    pub skipped: usize,
}

impl RegistryIndex {
    #[must_use]
    pub fn into_entries(self) -> Vec<IndexEntry> {
        self.items
    }
}

impl<'de> Deserialize<'de> for RegistryIndex {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error;
        use serde_json::Value;

        let (name, homepage, raw) = match Value::deserialize(deserializer)? {
            Value::Array(raw) => (None, None, raw),
            Value::Object(mut document) => {
                let Some(Value::Array(raw)) = document.remove("items") else {
                    return Err(D::Error::custom("registry index has no \"items\" array"));
                };
                let text = |value: Option<Value>| match value {
                    Some(Value::String(text)) => Some(text),
                    _ => None,
                };
                (text(document.remove("name")), text(document.remove("homepage")), raw)
            }
            _ => return Err(D::Error::custom("registry index must be an object or an array")),
        };

        let mut index = RegistryIndex {
            name,
            homepage,
            ..Default::default()
        };
        for entry in raw {
            match serde_json::from_value::<IndexEntry>(entry) {
                Ok(entry) => index.items.push(entry),
                Err(e) => {
                    tracing::debug!("Skipping index entry: {}", e);
                    index.skipped += 1;
                }
            }
        }
        Ok(index)
    }
}

/// Read-only search projection of an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub registry: String,
    pub add_command_argument: String,
}
