//! Project descriptors
//!
//! A [`Project`] is one buildable package of the family: where it lives, what its
//! manifest declares, which themes it ships and which build scripts it offers.
//! Descriptors are created per build invocation and never cached.

use std::path::{Path, PathBuf};

use crate::core::manifest::Manifest;
use crate::core::registry::PackageRegistry;
use crate::error::ProjectError;

/// Build scripts a package may declare
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildScript {
    /// `build`
    Build,
    /// `build:slim`
    BuildSlim,
    /// `build:watch`
    Watch,
    /// `build:watch:slim`
    WatchSlim,
}

impl BuildScript {
    /// Script name as it appears in package.json
    pub fn script_name(self) -> &'static str {
        match self {
            Self::Build => "build",
            Self::BuildSlim => "build:slim",
            Self::Watch => "build:watch",
            Self::WatchSlim => "build:watch:slim",
        }
    }
}

/// Script capabilities of a package, computed once from its manifest
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// Generic build script
    pub build: bool,
    /// Dependency-mode build script
    pub build_slim: bool,
    /// Watch build script
    pub watch: bool,
    /// Dependency-mode watch build script
    pub watch_slim: bool,
}

impl Capabilities {
    /// Probe a manifest's scripts
    pub fn from_manifest(manifest: &Manifest) -> Self {
        Self {
            build: manifest.has_script(BuildScript::Build.script_name()),
            build_slim: manifest.has_script(BuildScript::BuildSlim.script_name()),
            watch: manifest.has_script(BuildScript::Watch.script_name()),
            watch_slim: manifest.has_script(BuildScript::WatchSlim.script_name()),
        }
    }

    /// Pick the script to run for the requested mode
    ///
    /// The watch script wins when watching is requested and available; otherwise the
    /// generic build script is used. Slim variants are preferred when `slim` is set.
    pub fn select(self, watch: bool, slim: bool) -> Option<BuildScript> {
        if watch && self.watch {
            return Some(if slim && self.watch_slim {
                BuildScript::WatchSlim
            } else {
                BuildScript::Watch
            });
        }
        if self.build {
            return Some(if slim && self.build_slim {
                BuildScript::BuildSlim
            } else {
                BuildScript::Build
            });
        }
        None
    }
}

/// Why a present manifest could not be used
#[derive(Debug, Clone)]
enum ManifestFault {
    Read(String),
    Parse(String),
}

/// A buildable package
#[derive(Debug, Clone)]
pub struct Project {
    name: String,
    path: PathBuf,
    manifest: Option<Manifest>,
    manifest_fault: Option<ManifestFault>,
    dependencies: Vec<String>,
    themes: Vec<String>,
    capabilities: Capabilities,
}

impl Project {
    /// Create a descriptor for `name` located at `path`
    ///
    /// Never fails: a missing or broken manifest leaves the descriptor invalid, which
    /// [`Project::validate`] reports.
    pub fn load(name: &str, path: PathBuf, registry: &PackageRegistry) -> Self {
        let (manifest, manifest_fault) = match Manifest::load(name, &path) {
            Ok(manifest) => (Some(manifest), None),
            Err(ProjectError::ManifestRead { error, .. }) => (None, Some(ManifestFault::Read(error))),
            Err(ProjectError::ManifestParse { error, .. }) => (None, Some(ManifestFault::Parse(error))),
            Err(_) => (None, None),
        };

        let dependencies = manifest
            .as_ref()
            .map(|m| registry.namespace_packages(m))
            .unwrap_or_default();
        let capabilities = manifest
            .as_ref()
            .map(Capabilities::from_manifest)
            .unwrap_or_default();
        let themes = list_themes(&path.join("src").join("themes"));

        Self {
            name: name.to_string(),
            path,
            manifest,
            manifest_fault,
            dependencies,
            themes,
            capabilities,
        }
    }

    /// Package name without scope
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Absolute package location
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parsed manifest, if one was found
    pub fn manifest(&self) -> Option<&Manifest> {
        self.manifest.as_ref()
    }

    /// Script capabilities
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Check that the package exists and has a readable manifest
    pub fn validate(&self) -> Result<(), ProjectError> {
        if !self.path.exists() {
            return Err(ProjectError::ProjectNotFound {
                name: self.name.clone(),
                path: self.path.clone(),
            });
        }
        match &self.manifest_fault {
            Some(ManifestFault::Read(error)) => {
                return Err(ProjectError::ManifestRead {
                    name: self.name.clone(),
                    path: self.path.join("package.json"),
                    error: error.clone(),
                });
            }
            Some(ManifestFault::Parse(error)) => {
                return Err(ProjectError::ManifestParse {
                    name: self.name.clone(),
                    error: error.clone(),
                });
            }
            None => {}
        }
        if self.manifest.is_none() {
            return Err(ProjectError::ManifestNotFound {
                name: self.name.clone(),
                path: self.path.join("package.json"),
            });
        }
        Ok(())
    }

    /// Whether validation passes
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Declared namespace dependencies in manifest order
    pub fn declared_dependencies(&self) -> &[String] {
        &self.dependencies
    }

    /// Declared dependencies ordered by a priority list
    pub fn dependencies(&self, sort_order: &[String]) -> Vec<String> {
        crate::core::registry::sort_by_priority(self.dependencies.clone(), sort_order, |name| {
            name.as_str()
        })
    }

    /// Whether the package ships theme sources
    pub fn has_styles(&self) -> bool {
        self.themes_source_dir().is_dir()
    }

    /// Theme names found under `src/themes`, sorted
    pub fn themes(&self) -> &[String] {
        &self.themes
    }

    /// Build script for the requested mode
    pub fn build_script(&self, watch: bool, slim: bool) -> Option<BuildScript> {
        self.capabilities.select(watch, slim)
    }

    /// Shell command that builds this package, e.g. `npm run build:slim`
    pub fn build_command(&self, runner: &str, watch: bool, slim: bool) -> Option<String> {
        self.build_script(watch, slim)
            .map(|script| format!("{runner} {}", script.script_name()))
    }

    /// Output directory
    pub fn dist_dir(&self) -> PathBuf {
        self.path.join("dist")
    }

    /// Theme sources directory
    pub fn themes_source_dir(&self) -> PathBuf {
        self.path.join("src").join("themes")
    }

    /// Compiled theme directory
    pub fn theme_output_dir(&self, theme: &str) -> PathBuf {
        self.dist_dir().join("themes").join(theme)
    }

    /// Minified stylesheet produced by the stylesheet compiler
    pub fn minified_theme_file(&self, theme: &str) -> PathBuf {
        self.theme_output_dir(theme).join(format!("{theme}.min.css"))
    }

    /// Non-minified stylesheet produced by the stylesheet compiler
    pub fn bundled_theme_file(&self, theme: &str) -> PathBuf {
        self.theme_output_dir(theme)
            .join(format!("{theme}.bundled.css"))
    }

    /// Component sources directory
    pub fn components_dir(&self) -> PathBuf {
        self.path.join("src").join("components")
    }

    /// Public source entry point
    pub fn source_entry(&self) -> PathBuf {
        self.path.join("src").join("index.js")
    }

    /// Type declaration entry point
    pub fn types_entry(&self) -> PathBuf {
        self.path.join("src").join("types.d.ts")
    }

    /// Compiled bundle
    pub fn bundle_file(&self) -> PathBuf {
        self.dist_dir().join(format!("arpadroid-{}.js", self.name))
    }

    /// Optional i18n compiler script
    pub fn i18n_script(&self) -> PathBuf {
        self.path.join("scripts").join("build-i18n.mjs")
    }

    /// i18n sources copied into fat bundles
    pub fn i18n_dir(&self) -> PathBuf {
        self.path.join("src").join("i18n")
    }
}

/// List theme directories, sorted; empty when `dir` is absent
fn list_themes(dir: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut themes: Vec<String> = entries
        .filter_map(Result::ok)
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .collect();
    themes.sort();
    themes
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn registry() -> PackageRegistry {
        PackageRegistry::new("@arpadroid/")
    }

    fn write_manifest(dir: &Path, content: &str) {
        std::fs::create_dir_all(dir).unwrap();
        std::fs::write(dir.join("package.json"), content).unwrap();
    }

    #[test]
    fn test_capabilities_prefer_watch_then_slim() {
        let all = Capabilities {
            build: true,
            build_slim: true,
            watch: true,
            watch_slim: true,
        };
        assert_eq!(all.select(true, true), Some(BuildScript::WatchSlim));
        assert_eq!(all.select(true, false), Some(BuildScript::Watch));
        assert_eq!(all.select(false, true), Some(BuildScript::BuildSlim));
        assert_eq!(all.select(false, false), Some(BuildScript::Build));
    }

    #[test]
    fn test_capabilities_fall_back_to_build() {
        let build_only = Capabilities {
            build: true,
            ..Capabilities::default()
        };
        assert_eq!(build_only.select(true, true), Some(BuildScript::Build));
        assert_eq!(Capabilities::default().select(false, false), None);
    }

    #[test]
    fn test_load_reads_dependencies_themes_and_scripts() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("lists");
        write_manifest(
            &path,
            r#"{
                "scripts": { "build": "rollup -c", "build:slim": "rollup -c --slim" },
                "peerDependencies": { "@arpadroid/ui": "*", "@arpadroid/tools": "*", "lit": "*" }
            }"#,
        );
        std::fs::create_dir_all(path.join("src/themes/mobile")).unwrap();
        std::fs::create_dir_all(path.join("src/themes/default")).unwrap();

        let project = Project::load("lists", path.clone(), &registry());

        assert!(project.validate().is_ok());
        assert_eq!(project.declared_dependencies(), ["ui", "tools"]);
        assert_eq!(project.themes(), ["default", "mobile"]);
        assert!(project.has_styles());
        assert_eq!(
            project.build_command("npm run", false, true).as_deref(),
            Some("npm run build:slim")
        );
        assert_eq!(
            project.minified_theme_file("default"),
            path.join("dist/themes/default/default.min.css")
        );
        assert_eq!(project.bundle_file(), path.join("dist/arpadroid-lists.js"));
    }

    #[test]
    fn test_missing_path_is_project_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let project = Project::load("ghost", temp_dir.path().join("ghost"), &registry());

        assert!(matches!(
            project.validate(),
            Err(ProjectError::ProjectNotFound { .. })
        ));
        assert!(project.themes().is_empty());
        assert!(!project.has_styles());
    }

    #[test]
    fn test_missing_manifest_is_invalid() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bare");
        std::fs::create_dir_all(&path).unwrap();

        let project = Project::load("bare", path, &registry());
        assert!(matches!(
            project.validate(),
            Err(ProjectError::ManifestNotFound { .. })
        ));
    }

    #[test]
    fn test_broken_manifest_reports_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken");
        write_manifest(&path, "{ nope");

        let project = Project::load("broken", path, &registry());
        assert!(matches!(
            project.validate(),
            Err(ProjectError::ManifestParse { .. })
        ));
    }

    #[test]
    fn test_unreadable_manifest_reports_read_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("locked");
        std::fs::create_dir_all(path.join("package.json")).unwrap();

        let project = Project::load("locked", path.clone(), &registry());
        match project.validate() {
            Err(ProjectError::ManifestRead { name, path: manifest, .. }) => {
                assert_eq!(name, "locked");
                assert_eq!(manifest, path.join("package.json"));
            }
            other => panic!("expected a read error, got {other:?}"),
        }
    }

    #[test]
    fn test_dependencies_sorted_by_priority() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("form");
        write_manifest(
            &path,
            r#"{ "peerDependencies": { "@arpadroid/messages": "*", "@arpadroid/ui": "*", "@arpadroid/tools": "*" } }"#,
        );

        let project = Project::load("form", path, &registry());
        let order = vec!["tools".to_string(), "ui".to_string()];
        assert_eq!(project.dependencies(&order), vec!["tools", "ui", "messages"]);
    }
}
