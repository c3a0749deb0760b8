//! Installation context.

use crate::config::ProjectConfig;
use crate::project::ProjectInfo;
use std::path::{Path, PathBuf};

/// Installation context containing the parameters shared by every file of an install.
///
/// # Fields
///
/// * `project` - Detected layout of the target project
/// * `config` - Parsed `components.json`, if the project has one
/// * `overwrite` - Replace existing files whose content differs
/// * `dry_run` - Compute the plan without touching the disk
/// * `path_override` - Directory for ui/component/block files without a target
pub struct InstallContext<'a> {
    pub project: &'a ProjectInfo,
    pub config: Option<&'a ProjectConfig>,
    pub overwrite: bool,
    pub dry_run: bool,
    pub path_override: Option<PathBuf>,
}

/// Builder for creating InstallContext instances with a fluent API.
pub struct InstallContextBuilder<'a> {
    project: &'a ProjectInfo,
    config: Option<&'a ProjectConfig>,
    overwrite: bool,
    dry_run: bool,
    path_override: Option<PathBuf>,
}

impl<'a> InstallContextBuilder<'a> {
    pub fn new(project: &'a ProjectInfo) -> Self {
        Self {
            project,
            config: None,
            overwrite: false,
            dry_run: false,
            path_override: None,
        }
    }

    /// Set the project configuration.
    pub fn config(mut self, config: Option<&'a ProjectConfig>) -> Self {
        self.config = config;
        self
    }

    /// Set whether differing files are replaced.
    pub fn overwrite(mut self, value: bool) -> Self {
        self.overwrite = value;
        self
    }

    /// Set dry-run mode.
    pub fn dry_run(mut self, value: bool) -> Self {
        self.dry_run = value;
        self
    }

    /// Set the `--path` directory.
    pub fn path_override(mut self, path: Option<&Path>) -> Self {
        self.path_override = path.map(Path::to_path_buf);
        self
    }

    #[must_use]
    pub fn build(self) -> InstallContext<'a> {
        InstallContext {
            project: self.project,
            config: self.config,
            overwrite: self.overwrite,
            dry_run: self.dry_run,
            path_override: self.path_override,
        }
    }
}

impl<'a> InstallContext<'a> {
    /// Create a new builder for InstallContext.
    pub fn builder(project: &'a ProjectInfo) -> InstallContextBuilder<'a> {
        InstallContextBuilder::new(project)
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.project.root
    }
}
