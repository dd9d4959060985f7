//! Compiler configuration
//!
//! Build kinds ([`BuildTarget`]) turn a project and its options into a
//! [`CompilerConfig`]: the entry set, plugin list, externals and output that the
//! package compiler receives. The configuration is plain data; serializing it is
//! how it reaches the bundler process.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::core::options::BuildOptions;
use crate::core::project::Project;
use crate::core::workspace::Workspace;
use crate::error::BuildError;

/// Module alias handed to the alias plugin
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Alias {
    /// Import specifier to rewrite
    pub find: String,
    /// Replacement path
    pub replacement: PathBuf,
}

/// File copy handed to the copy plugin
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CopyTarget {
    /// Source path
    pub src: PathBuf,
    /// Destination directory
    pub dest: PathBuf,
}

/// Bundler plugins the build kinds use
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "name", rename_all = "kebab-case")]
pub enum Plugin {
    /// JSON imports
    Json,
    /// Minification
    Terser { keep_classnames: bool },
    /// Mark peer dependencies as external
    PeerDepsExternal,
    /// Rewrite import specifiers
    Alias { entries: Vec<Alias> },
    /// Resolve bare imports from node_modules
    NodeResolve { browser: bool, prefer_builtins: bool },
    /// Rebuild when files under `dir` change
    Watch { dir: PathBuf },
    /// Merge several entry points into one bundle
    MultiEntry,
    /// Bundle size report
    BundleStats,
    /// Copy static files
    Copy { targets: Vec<CopyTarget> },
    /// Emit a gzipped copy of the bundle
    Gzip,
}

/// Bundle output
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct OutputConfig {
    /// Bundle file
    pub file: PathBuf,
    /// Module format
    pub format: String,
}

/// Everything the package compiler needs for one bundle
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CompilerConfig {
    /// Package name
    pub project: String,
    /// Package directory the compiler runs in
    pub cwd: PathBuf,
    /// Entry points
    pub input: Vec<PathBuf>,
    /// Plugins in application order
    pub plugins: Vec<Plugin>,
    /// Import specifiers left unresolved
    pub external: Vec<String>,
    /// Bundle output
    pub output: OutputConfig,
    /// Tree shaking
    pub treeshake: bool,
    /// Slim (dependency) build
    pub slim: bool,
    /// Requested dependency bundles that were not found on disk
    #[serde(skip)]
    pub missing_deps: Vec<String>,
}

impl CompilerConfig {
    /// Serialize for the bundler process
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Directories watched by the configured watch plugins
    pub fn watch_dirs(&self) -> Vec<PathBuf> {
        self.plugins
            .iter()
            .filter_map(|plugin| match plugin {
                Plugin::Watch { dir } => Some(dir.clone()),
                _ => None,
            })
            .collect()
    }
}

/// Produces the compiler configuration for a build kind
pub trait CompilerConfigFactory: Send + Sync {
    /// Build kind name
    fn name(&self) -> &'static str;

    /// Compiler configuration for `project`
    fn create(&self, project: &Project, workspace: &Workspace, options: &BuildOptions)
        -> CompilerConfig;
}

/// Named build kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildTarget {
    /// Web component package
    #[default]
    UiComponent,
}

impl BuildTarget {
    /// All build kinds
    pub const ALL: &'static [BuildTarget] = &[BuildTarget::UiComponent];

    /// Name used on the command line
    pub fn name(self) -> &'static str {
        match self {
            Self::UiComponent => "ui-component",
        }
    }

    /// Configuration factory for this kind
    pub fn factory(self) -> Box<dyn CompilerConfigFactory> {
        match self {
            Self::UiComponent => Box::new(UiComponentBuild),
        }
    }
}

impl fmt::Display for BuildTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BuildTarget {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace('_', "-").to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|target| target.name() == normalized || normalized == "uicomponent")
            .ok_or_else(|| BuildError::InvalidBuildTarget {
                name: s.to_string(),
                available: Self::ALL.iter().map(|t| t.name().to_string()).collect(),
            })
    }
}

/// Web component package build
#[derive(Debug, Clone, Copy, Default)]
pub struct UiComponentBuild;

impl UiComponentBuild {
    /// Entry points: the source entry, plus pre-built dependency bundles in fat mode
    fn input(
        project: &Project,
        workspace: &Workspace,
        options: &BuildOptions,
    ) -> (Vec<PathBuf>, Vec<String>) {
        let mut input = vec![project.source_entry()];
        let mut missing = Vec::new();
        if options.slim {
            return (input, missing);
        }

        for dep in &options.deps {
            let bundle = workspace.project(dep).bundle_file();
            if bundle.is_file() {
                input.push(bundle);
            } else {
                tracing::warn!(
                    "Dependency {dep} not found for {}: {}",
                    project.name(),
                    bundle.display()
                );
                missing.push(dep.clone());
            }
        }
        (input, missing)
    }

    fn alias(workspace: &Workspace, name: &str, replacement: PathBuf) -> Alias {
        Alias {
            find: format!("{}{name}", workspace.registry().prefix()),
            replacement,
        }
    }

    fn slim_plugins(project: &Project, workspace: &Workspace, options: &BuildOptions) -> Vec<Plugin> {
        let mut entries = vec![Self::alias(workspace, project.name(), project.source_entry())];
        if let Some(parent) = options.parent.as_deref() {
            let parent_entry = workspace.project(parent).source_entry();
            entries.push(Self::alias(workspace, parent, parent_entry));
        }
        vec![Plugin::PeerDepsExternal, Plugin::Alias { entries }]
    }

    fn fat_plugins(project: &Project, workspace: &Workspace, options: &BuildOptions) -> Vec<Plugin> {
        let mut plugins = vec![Plugin::NodeResolve {
            browser: true,
            prefer_builtins: false,
        }];

        if options.watch {
            if project.themes_source_dir().is_dir() {
                plugins.push(Plugin::Watch {
                    dir: project.themes_source_dir(),
                });
            }
            let mut watched: Vec<&String> = options.deps.iter().collect();
            for dep in project.declared_dependencies() {
                if !watched.contains(&dep) {
                    watched.push(dep);
                }
            }
            for dep in watched {
                let themes = workspace.project(dep).themes_source_dir();
                if themes.is_dir() {
                    plugins.push(Plugin::Watch { dir: themes });
                }
            }
        }

        if !options.deps.is_empty() {
            plugins.push(Plugin::MultiEntry);
        }
        plugins.push(Plugin::BundleStats);
        plugins.push(Plugin::Alias {
            entries: vec![Self::alias(workspace, project.name(), project.source_entry())],
        });
        plugins.push(Plugin::Copy {
            targets: vec![CopyTarget {
                src: project.i18n_dir(),
                dest: project.dist_dir(),
            }],
        });
        plugins
    }

    fn external(project: &Project, workspace: &Workspace, options: &BuildOptions) -> Vec<String> {
        if !options.slim {
            return Vec::new();
        }
        project
            .declared_dependencies()
            .iter()
            .map(|dep| format!("{}{dep}", workspace.registry().prefix()))
            .collect()
    }
}

impl CompilerConfigFactory for UiComponentBuild {
    fn name(&self) -> &'static str {
        BuildTarget::UiComponent.name()
    }

    fn create(
        &self,
        project: &Project,
        workspace: &Workspace,
        options: &BuildOptions,
    ) -> CompilerConfig {
        let (input, missing_deps) = Self::input(project, workspace, options);

        let mut plugins = vec![Plugin::Json, Plugin::Terser { keep_classnames: true }];
        if options.slim {
            plugins.extend(Self::slim_plugins(project, workspace, options));
        } else {
            plugins.extend(Self::fat_plugins(project, workspace, options));
        }
        plugins.push(Plugin::Gzip);

        CompilerConfig {
            project: project.name().to_string(),
            cwd: project.path().to_path_buf(),
            input,
            plugins,
            external: Self::external(project, workspace, options),
            output: OutputConfig {
                file: project.bundle_file(),
                format: "es".to_string(),
            },
            treeshake: true,
            slim: options.slim,
            missing_deps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::settings::Settings;
    use std::path::Path;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Workspace) {
        let temp_dir = TempDir::new().unwrap();
        let workspace = Workspace::new(
            temp_dir.path().to_path_buf(),
            temp_dir.path().to_path_buf(),
            Settings::default(),
        );
        (temp_dir, workspace)
    }

    fn create_package(root: &Path, name: &str, peers: &[&str]) {
        let dir = root.join("node_modules/@arpadroid").join(name);
        std::fs::create_dir_all(dir.join("src")).unwrap();
        let peers: Vec<String> = peers
            .iter()
            .map(|p| format!("\"@arpadroid/{p}\": \"*\""))
            .collect();
        std::fs::write(
            dir.join("package.json"),
            format!("{{ \"peerDependencies\": {{ {} }} }}", peers.join(", ")),
        )
        .unwrap();
    }

    #[test]
    fn test_build_target_parse() {
        assert_eq!(
            "ui-component".parse::<BuildTarget>().unwrap(),
            BuildTarget::UiComponent
        );
        assert_eq!(
            "uiComponent".parse::<BuildTarget>().unwrap(),
            BuildTarget::UiComponent
        );
        let err = "website".parse::<BuildTarget>().unwrap_err();
        assert!(matches!(err, BuildError::InvalidBuildTarget { .. }));
    }

    #[test]
    fn test_slim_config_externalizes_siblings_and_aliases_parent() {
        let (temp_dir, workspace) = setup();
        create_package(temp_dir.path(), "ui", &["tools"]);
        let project = workspace.project("ui");
        let options = BuildOptions::default().for_dependency("lists");

        let config = UiComponentBuild.create(&project, &workspace, &options);

        assert!(config.slim);
        assert_eq!(config.input, vec![project.source_entry()]);
        assert_eq!(config.external, vec!["@arpadroid/tools"]);
        assert!(config.plugins.contains(&Plugin::PeerDepsExternal));
        let aliases = config
            .plugins
            .iter()
            .find_map(|p| match p {
                Plugin::Alias { entries } => Some(entries.clone()),
                _ => None,
            })
            .unwrap();
        assert!(aliases.iter().any(|a| a.find == "@arpadroid/ui"));
        assert!(aliases.iter().any(|a| a.find == "@arpadroid/lists"));
        assert_eq!(config.plugins.last(), Some(&Plugin::Gzip));
    }

    #[test]
    fn test_fat_config_bundles_existing_deps_and_skips_missing() {
        let (temp_dir, workspace) = setup();
        create_package(temp_dir.path(), "form", &["ui"]);
        create_package(temp_dir.path(), "ui", &[]);
        let ui = workspace.project("ui");
        std::fs::create_dir_all(ui.dist_dir()).unwrap();
        std::fs::write(ui.bundle_file(), "export {};").unwrap();

        let project = workspace.project("form");
        let options = BuildOptions {
            deps: vec!["ui".to_string(), "messages".to_string()],
            ..BuildOptions::default()
        };

        let config = UiComponentBuild.create(&project, &workspace, &options);

        assert_eq!(config.input, vec![project.source_entry(), ui.bundle_file()]);
        assert_eq!(config.missing_deps, vec!["messages"]);
        assert!(config.plugins.contains(&Plugin::MultiEntry));
        assert!(!config.plugins.contains(&Plugin::PeerDepsExternal));
        assert!(config.external.is_empty());
    }

    #[test]
    fn test_fat_watch_config_watches_theme_dirs() {
        let (temp_dir, workspace) = setup();
        create_package(temp_dir.path(), "lists", &["ui"]);
        create_package(temp_dir.path(), "ui", &[]);
        let ui = workspace.project("ui");
        std::fs::create_dir_all(ui.themes_source_dir().join("default")).unwrap();

        let project = workspace.project("lists");
        let options = BuildOptions {
            watch: true,
            ..BuildOptions::default()
        };

        let config = UiComponentBuild.create(&project, &workspace, &options);
        assert_eq!(config.watch_dirs(), vec![ui.themes_source_dir()]);
    }

    #[test]
    fn test_config_serializes_plugins_by_name() {
        let (temp_dir, workspace) = setup();
        create_package(temp_dir.path(), "ui", &[]);
        let project = workspace.project("ui");

        let config = UiComponentBuild.create(&project, &workspace, &BuildOptions::default());
        let json: serde_json::Value = serde_json::from_str(&config.to_json().unwrap()).unwrap();

        assert_eq!(json["plugins"][0]["name"], "json");
        assert_eq!(json["plugins"][1]["name"], "terser");
        assert_eq!(json["output"]["format"], "es");
        assert!(json.get("missing_deps").is_none());
    }
}
