//! Workspace context
//!
//! Bundles the working directory, the base path sibling packages are resolved
//! against and the workspace [`Settings`]. Passed explicitly to everything that
//! needs to locate packages.

use std::path::{Path, PathBuf};

use crate::core::manifest::Manifest;
use crate::core::project::Project;
use crate::core::registry::PackageRegistry;
use crate::core::settings::Settings;
use crate::error::{ProjectError, SettingsError};

/// Where packages live and how they are ordered
#[derive(Debug, Clone)]
pub struct Workspace {
    cwd: PathBuf,
    base_path: PathBuf,
    settings: Settings,
    registry: PackageRegistry,
}

impl Workspace {
    /// Create a workspace from explicit parts
    pub fn new(cwd: PathBuf, base_path: PathBuf, settings: Settings) -> Self {
        let registry = PackageRegistry::new(settings.namespace_prefix());
        Self {
            cwd,
            base_path,
            settings,
            registry,
        }
    }

    /// Create a workspace rooted at `base_path`, loading `arpadroid.toml` from it
    pub fn discover(cwd: &Path, base_path: &Path) -> Result<Self, SettingsError> {
        let settings = Settings::load(base_path)?;
        Ok(Self::new(cwd.to_path_buf(), base_path.to_path_buf(), settings))
    }

    /// Current working directory
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Base path packages are resolved against
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Workspace settings
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Namespace registry
    pub fn registry(&self) -> &PackageRegistry {
        &self.registry
    }

    /// Build priority list
    pub fn build_order(&self) -> Vec<String> {
        self.settings.build_order()
    }

    /// Style priority list
    pub fn style_order(&self) -> Vec<String> {
        self.settings.style_order()
    }

    /// Conventional location of package `name`
    ///
    /// When the working directory is the package itself it is used directly;
    /// otherwise the package is looked up under the configured packages directory.
    pub fn project_path(&self, name: &str) -> PathBuf {
        if self.cwd.file_name().and_then(|n| n.to_str()) == Some(name) {
            return self.cwd.clone();
        }
        self.base_path.join(self.settings.packages_dir()).join(name)
    }

    /// Descriptor for package `name` at its conventional location
    pub fn project(&self, name: &str) -> Project {
        Project::load(name, self.project_path(name), &self.registry)
    }

    /// Descriptor for package `name` at an explicit location
    pub fn project_at(&self, name: &str, path: PathBuf) -> Project {
        Project::load(name, path, &self.registry)
    }

    /// Name of the package in the working directory
    pub fn current_project_name(&self) -> Option<String> {
        if let Ok(manifest) = Manifest::load("", &self.cwd) {
            if let Some(name) = manifest
                .name
                .as_deref()
                .and_then(|full| self.registry.strip_namespace(full))
            {
                return Some(name.to_string());
            }
        }
        self.cwd
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
    }

    /// Manifest of the workspace root
    pub fn root_manifest(&self) -> Result<Manifest, ProjectError> {
        Manifest::load("workspace", &self.base_path)
    }

    /// Install location of the shared `arpadroid` tooling package
    pub fn tooling_path(&self) -> PathBuf {
        self.project_path("arpadroid")
    }
}
