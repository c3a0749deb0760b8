//! Destination rules for registry files.
//!
//! A file with a `target` goes exactly there (relative to the project root). Without one, the
//! file type picks an alias directory and the published path contributes the sub-path that
//! follows its type segment, so `registry/new-york/ui/forms/input.tsx` of a `registry:ui`
//! item lands at `<ui>/forms/input.tsx`.

use crate::config::project::Aliases;
use crate::core::{ItemType, RegistryError, RegistryFile};
use crate::project::ProjectInfo;
use crate::utils::fs::{is_within, normalize_path};
use std::path::{Path, PathBuf};

/// Computes where files of resolved items are written.
#[derive(Debug, Clone)]
pub struct Placement<'a> {
    project: &'a ProjectInfo,
    aliases: &'a Aliases,
    path_override: Option<PathBuf>,
}

impl<'a> Placement<'a> {
    pub fn new(project: &'a ProjectInfo, aliases: &'a Aliases) -> Self {
        Self {
            project,
            aliases,
            path_override: None,
        }
    }

    /// Directory (relative to the root, or absolute) for ui/component/block files without
    /// a target.
    #[must_use]
    pub fn with_path_override(mut self, dir: Option<&Path>) -> Self {
        self.path_override = dir.map(Path::to_path_buf);
        self
    }

    /// Absolute destination of `file`, shipped by the item named `item`.
    pub fn destination(&self, item: &str, file: &RegistryFile) -> Result<PathBuf, RegistryError> {
        let root = &self.project.root;

        let destination = match file.explicit_target() {
            Some(target) => self.targeted(target, file.file_type),
            None => self.conventional(item, file)?,
        };
        let destination = normalize_path(&destination);

        if !is_within(root, &destination) {
            return Err(RegistryError::InvalidTarget {
                item: item.to_string(),
                target: file.explicit_target().unwrap_or(&file.path).to_string(),
            });
        }

        Ok(destination)
    }

    fn targeted(&self, target: &str, file_type: ItemType) -> PathBuf {
        let target = target.strip_prefix("~/").unwrap_or(target);
        let target = target.trim_start_matches("./");

        if file_type == ItemType::Page && self.project.src_dir && !target.starts_with("src/") {
            return self.project.root.join("src").join(target);
        }
        self.project.root.join(target)
    }

    fn conventional(&self, item: &str, file: &RegistryFile) -> Result<PathBuf, RegistryError> {
        let dir = match file.file_type {
            ItemType::File | ItemType::Item => {
                return Err(RegistryError::MissingTarget {
                    item: item.to_string(),
                    path: file.path.clone(),
                    file_type: file.file_type.to_string(),
                });
            }
            ItemType::Page => {
                let pages = self.project.pages_dir().ok_or_else(|| RegistryError::UnsupportedPageTarget {
                    item: item.to_string(),
                    path: file.path.clone(),
                })?;
                let sub = sub_path(&file.path, &["app", "pages"]);
                return Ok(pages.join(sub));
            }
            ItemType::Ui | ItemType::Component | ItemType::Block => match &self.path_override {
                Some(dir) => self.project.root.join(dir),
                None if file.file_type == ItemType::Ui => self.project.alias_dir(&self.aliases.ui()),
                None => self.project.alias_dir(&self.aliases.components()),
            },
            ItemType::Lib => self.project.alias_dir(&self.aliases.lib()),
            ItemType::Hook => self.project.alias_dir(&self.aliases.hooks()),
            ItemType::Example
            | ItemType::Style
            | ItemType::Theme
            | ItemType::Font
            | ItemType::Base
            | ItemType::Internal => {
                self.project.alias_dir(&self.aliases.components())
            }
        };

        let segments: Vec<&str> = file.file_type.path_segment().into_iter().collect();
        Ok(dir.join(sub_path(&file.path, &segments)))
    }
}

/// The part of `path` after the first of `segments`, or its file name.
fn sub_path(path: &str, segments: &[&str]) -> String {
    let parts: Vec<&str> = path.split(['/', '\\']).filter(|p| !p.is_empty() && *p != ".").collect();

    if let Some(index) = parts.iter().position(|p| segments.contains(p))
        && index + 1 < parts.len()
    {
        return parts[index + 1..].join("/");
    }

    parts.last().map(|p| (*p).to_string()).unwrap_or_default()
}
