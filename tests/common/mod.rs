//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests: a temporary
//! workspace with package fixtures, and fake toolchain collaborators that record
//! what they were asked to do.

#![allow(dead_code)]

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc, Mutex};

use arpadroid_build::core::compiler::CompilerConfig;
use arpadroid_build::core::project::Project;
use arpadroid_build::core::settings::Settings;
use arpadroid_build::core::toolchain::{
    DeclarationCompiler, I18nCompiler, PackageCompiler, StyleBundleRequest, StylesheetCompiler,
    RebuildHook, Toolchain, WatchEvent, WatchLauncher, WatchSession,
};
use arpadroid_build::core::workspace::Workspace;
use arpadroid_build::error::BuildError;
use tempfile::TempDir;

/// Test project context
///
/// Creates a temporary workspace root and provides utilities for setting up
/// packages under `node_modules/@arpadroid`.
pub struct TestProject {
    /// Temporary directory for the workspace
    pub dir: TempDir,
}

impl TestProject {
    /// Create a new workspace in a temporary directory
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Get the path to the workspace root
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Create a file in the workspace
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Check if a file exists in the workspace
    pub fn file_exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }

    /// Read a file from the workspace
    pub fn read_file(&self, name: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(name)).expect("Failed to read file")
    }

    /// Relative location of package `name`
    pub fn package_dir(name: &str) -> String {
        format!("node_modules/@arpadroid/{name}")
    }

    /// Absolute location of package `name`
    pub fn package_path(&self, name: &str) -> PathBuf {
        self.path().join(Self::package_dir(name))
    }

    /// Start describing package `name`
    pub fn package(&self, name: &str) -> PackageFixture<'_> {
        PackageFixture {
            project: self,
            name: name.to_string(),
            peers: Vec::new(),
            scripts: Vec::new(),
            themes: Vec::new(),
        }
    }

    /// Write the workspace root package.json with namespace peers
    pub fn root_manifest(&self, peers: &[&str]) {
        self.create_file("package.json", &manifest_json("workspace", peers, &[]));
    }

    /// Workspace rooted at the temp dir with default settings
    pub fn workspace(&self) -> Workspace {
        Workspace::new(self.path(), self.path(), Settings::default())
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for one package of the workspace
pub struct PackageFixture<'a> {
    project: &'a TestProject,
    name: String,
    peers: Vec<String>,
    scripts: Vec<(String, String)>,
    themes: Vec<String>,
}

impl PackageFixture<'_> {
    /// Declare a namespace peer dependency
    pub fn peer(mut self, name: &str) -> Self {
        self.peers.push(name.to_string());
        self
    }

    /// Declare a package.json script
    pub fn script(mut self, name: &str, command: &str) -> Self {
        self.scripts.push((name.to_string(), command.to_string()));
        self
    }

    /// Add a theme source directory
    pub fn theme(mut self, name: &str) -> Self {
        self.themes.push(name.to_string());
        self
    }

    /// Write the package and return its directory
    pub fn create(self) -> PathBuf {
        let dir = TestProject::package_dir(&self.name);
        let peers: Vec<&str> = self.peers.iter().map(String::as_str).collect();
        let scripts: Vec<(&str, &str)> = self
            .scripts
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        self.project.create_file(
            &format!("{dir}/package.json"),
            &manifest_json(&format!("@arpadroid/{}", self.name), &peers, &scripts),
        );
        self.project
            .create_file(&format!("{dir}/src/index.js"), "export default {};\n");
        for theme in &self.themes {
            self.project.create_file(
                &format!("{dir}/src/themes/{theme}/{theme}.css"),
                &format!(".{theme} {{}}\n"),
            );
        }
        self.project.package_path(&self.name)
    }
}

fn manifest_json(name: &str, peers: &[&str], scripts: &[(&str, &str)]) -> String {
    let mut manifest = serde_json::json!({ "name": name, "version": "1.0.0" });
    let peers: serde_json::Map<String, serde_json::Value> = peers
        .iter()
        .map(|p| (format!("@arpadroid/{p}"), serde_json::json!("^1.0.0")))
        .collect();
    let scripts: serde_json::Map<String, serde_json::Value> = scripts
        .iter()
        .map(|(k, v)| ((*k).to_string(), serde_json::json!(v)))
        .collect();
    manifest["peerDependencies"] = serde_json::Value::Object(peers);
    manifest["scripts"] = serde_json::Value::Object(scripts);
    serde_json::to_string_pretty(&manifest).expect("Failed to serialize manifest")
}

/// Toolchain double recording every call as `<tool>:<package>`
///
/// The compiler writes the bundle file and the stylesheet bundler writes
/// `<theme>.min.css` and `<theme>.bundled.css` for every requested theme.
#[derive(Clone, Default)]
pub struct FakeTools {
    calls: Arc<Mutex<Vec<String>>>,
    failing: Arc<Mutex<HashSet<String>>>,
    hooks: Arc<Mutex<Vec<(String, RebuildHook)>>>,
}

impl FakeTools {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the compiler fail for `package`
    pub fn fail_compile(&self, package: &str) {
        self.failing.lock().unwrap().insert(package.to_string());
    }

    /// Act as a watch session of `package` whose sources changed
    pub fn rebuild(&self, package: &str) -> Result<(), BuildError> {
        let hooks = self.hooks.lock().unwrap();
        let (_, hook) = hooks
            .iter()
            .find(|(name, _)| name == package)
            .unwrap_or_else(|| panic!("{package} is not being watched"));
        hook()
    }

    /// Calls recorded so far
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Whether `call` was recorded
    pub fn called(&self, call: &str) -> bool {
        self.calls().iter().any(|c| c == call)
    }

    /// Toolchain backed by this double
    pub fn toolchain(&self) -> Toolchain {
        Toolchain {
            compiler: Arc::new(self.clone()),
            stylesheets: Arc::new(self.clone()),
            declarations: Arc::new(self.clone()),
            i18n: Arc::new(self.clone()),
            watcher: Arc::new(self.clone()),
        }
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

impl PackageCompiler for FakeTools {
    fn compile(&self, config: &CompilerConfig) -> Result<(), BuildError> {
        let mode = if config.slim { "slim" } else { "fat" };
        self.record(format!("compile:{}:{mode}", config.project));
        if self.failing.lock().unwrap().contains(&config.project) {
            return Err(BuildError::ExternalToolFailure {
                package: config.project.clone(),
                tool: "rollup".to_string(),
                code: Some(1),
            });
        }
        write(&config.output.file, "export default {};\n");
        Ok(())
    }
}

impl StylesheetCompiler for FakeTools {
    fn bundle(&self, request: &StyleBundleRequest) -> Result<(), BuildError> {
        self.record(format!("styles:{}", request.project));
        for theme_dir in &request.themes {
            let theme = theme_dir.file_name().unwrap().to_string_lossy().to_string();
            let out = request.export_path.join(&theme);
            write(
                &out.join(format!("{theme}.min.css")),
                &format!("/*{}:{theme}*/", request.project),
            );
            write(
                &out.join(format!("{theme}.bundled.css")),
                &format!("/* {} {theme} bundled */\n", request.project),
            );
        }
        Ok(())
    }
}

impl DeclarationCompiler for FakeTools {
    fn compile(&self, project: &Project, _staging: &Path, out_dir: &Path) -> Result<(), BuildError> {
        self.record(format!("types:{}", project.name()));
        write(&out_dir.join("types.d.ts"), "export {};\n");
        Ok(())
    }
}

impl I18nCompiler for FakeTools {
    fn compile(&self, project: &Project, _script: &Path) -> Result<Vec<PathBuf>, BuildError> {
        self.record(format!("i18n:{}", project.name()));
        Ok(vec![project.dist_dir().join("i18n/en.json")])
    }
}

impl WatchLauncher for FakeTools {
    fn watch(
        &self,
        config: &CompilerConfig,
        after_rebuild: RebuildHook,
    ) -> Result<WatchSession, BuildError> {
        self.record(format!("watch:{}", config.project));
        self.hooks
            .lock()
            .unwrap()
            .push((config.project.clone(), after_rebuild));
        let (tx, rx) = mpsc::channel();
        tx.send(WatchEvent::Started).unwrap();
        Ok(WatchSession::new(config.project.clone(), rx, tx))
    }
}

fn write(path: &Path, content: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}
