//! Build coordination
//!
//! Drives one package through its build phases:
//!
//! ```text
//! Init -> CleaningOutput -> BuildingDependencies -> BundlingStyles -> BundlingI18n
//!      -> Compiling -> BuildingTypes -> Watching -> Done | Failed
//! ```
//!
//! Slim (dependency) builds skip dependencies, i18n, types and watching. A failing
//! phase ends the build; nothing after it runs. Watch rebuilds refresh the
//! package's stylesheets after every successful recompile.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::core::compiler::{BuildTarget, CompilerConfig, CompilerConfigFactory};
use crate::core::options::BuildOptions;
use crate::core::project::Project;
use crate::core::styles::{AggregateReport, StyleAggregator};
use crate::core::toolchain::{
    RebuildHook, StyleBundleRequest, StylesheetCompiler, Toolchain, WatchSession,
};
use crate::core::workspace::Workspace;
use crate::error::BuildError;
use crate::infra::filesystem;

/// Compiled declarations entry written into `dist/`
pub const TYPES_OUTPUT: &str = "types.compiled.d.ts";

/// Build phases in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildPhase {
    Init,
    CleaningOutput,
    BuildingDependencies,
    BundlingStyles,
    BundlingI18n,
    Compiling,
    BuildingTypes,
    Watching,
    Done,
    Failed,
}

impl fmt::Display for BuildPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Init => "init",
            Self::CleaningOutput => "cleaning output",
            Self::BuildingDependencies => "building dependencies",
            Self::BundlingStyles => "bundling styles",
            Self::BundlingI18n => "bundling i18n",
            Self::Compiling => "compiling",
            Self::BuildingTypes => "building types",
            Self::Watching => "watching",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Artifacts a build phase reports back
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildPayload {
    /// A dependency built ahead of the package
    Dependency(String),
    /// Aggregated theme stylesheets
    Styles(AggregateReport),
    /// Files produced by the i18n compiler
    I18n(Vec<PathBuf>),
    /// Compiled declarations entry
    Types(PathBuf),
}

/// Outcome of a successful build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildResult {
    /// Always true for a returned result; failures are errors
    pub success: bool,
    /// Summary line
    pub message: String,
    /// Phase artifacts in the order they were produced
    pub payloads: Vec<BuildPayload>,
    /// Phases entered, in order
    pub phases: Vec<BuildPhase>,
}

impl BuildResult {
    /// Aggregated stylesheets, if the style phase produced any
    pub fn styles(&self) -> Option<&AggregateReport> {
        self.payloads.iter().find_map(|payload| match payload {
            BuildPayload::Styles(report) => Some(report),
            _ => None,
        })
    }

    /// Dependencies built ahead of the package
    pub fn dependencies(&self) -> Vec<&str> {
        self.payloads
            .iter()
            .filter_map(|payload| match payload {
                BuildPayload::Dependency(name) => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }
}

#[derive(Default)]
struct BuildState {
    phases: Vec<BuildPhase>,
    payloads: Vec<BuildPayload>,
}

impl BuildState {
    fn enter(&mut self, project: &Project, phase: BuildPhase) {
        tracing::info!("{}: {phase}", project.name());
        self.phases.push(phase);
    }

    fn current(&self) -> BuildPhase {
        self.phases.last().copied().unwrap_or(BuildPhase::Init)
    }
}

/// Builds packages and their dependency chains
pub struct BuildCoordinator {
    workspace: Workspace,
    toolchain: Toolchain,
    factory: Box<dyn CompilerConfigFactory>,
    sessions: Vec<WatchSession>,
    last_phases: Vec<BuildPhase>,
}

impl BuildCoordinator {
    /// Create a coordinator using the default build kind
    pub fn new(workspace: Workspace, toolchain: Toolchain) -> Self {
        Self {
            workspace,
            toolchain,
            factory: BuildTarget::default().factory(),
            sessions: Vec::new(),
            last_phases: Vec::new(),
        }
    }

    /// Use `target`'s compiler configuration
    #[must_use]
    pub fn with_target(self, target: BuildTarget) -> Self {
        self.with_factory(target.factory())
    }

    /// Use a custom compiler configuration factory
    #[must_use]
    pub fn with_factory(mut self, factory: Box<dyn CompilerConfigFactory>) -> Self {
        self.factory = factory;
        self
    }

    /// Workspace packages are resolved against
    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Watch sessions started so far
    pub fn watch_sessions(&self) -> &[WatchSession] {
        &self.sessions
    }

    /// Phases entered by the most recently finished build, successful or not
    pub fn last_phases(&self) -> &[BuildPhase] {
        &self.last_phases
    }

    /// Hand over the running watch sessions
    pub fn take_watch_sessions(&mut self) -> Vec<WatchSession> {
        std::mem::take(&mut self.sessions)
    }

    /// Build `project` and, unless slim, its dependencies first
    pub fn build(
        &mut self,
        project: &Project,
        options: &BuildOptions,
    ) -> Result<BuildResult, BuildError> {
        tracing::info!(
            "Building {} ({}, target {})",
            project.name(),
            options.mode(),
            self.factory.name()
        );

        let mut state = BuildState::default();
        state.enter(project, BuildPhase::Init);
        let outcome = match project.validate() {
            Ok(()) => self.run_phases(project, options, &mut state),
            Err(e) => Err(e.into()),
        };

        if let Err(e) = outcome {
            tracing::error!("{}: build failed while {}", project.name(), state.current());
            state.enter(project, BuildPhase::Failed);
            self.last_phases = state.phases;
            return Err(e);
        }
        state.enter(project, BuildPhase::Done);
        self.last_phases = state.phases.clone();

        Ok(BuildResult {
            success: true,
            message: format!("Built {} ({})", project.name(), options.mode()),
            payloads: state.payloads,
            phases: state.phases,
        })
    }

    fn run_phases(
        &mut self,
        project: &Project,
        options: &BuildOptions,
        state: &mut BuildState,
    ) -> Result<(), BuildError> {
        state.enter(project, BuildPhase::CleaningOutput);
        filesystem::recreate_dir(&project.dist_dir())
            .map_err(|e| BuildError::fs(project.name(), e))?;

        if !options.slim {
            state.enter(project, BuildPhase::BuildingDependencies);
            self.build_dependencies(project, options, state)?;
        }

        state.enter(project, BuildPhase::BundlingStyles);
        let styles = bundle_styles(
            &self.workspace,
            self.toolchain.stylesheets.as_ref(),
            project,
            options,
        )?;
        state.payloads.push(BuildPayload::Styles(styles));

        if !options.slim {
            state.enter(project, BuildPhase::BundlingI18n);
            if let Some(files) = self.bundle_i18n(project)? {
                state.payloads.push(BuildPayload::I18n(files));
            }
        }

        state.enter(project, BuildPhase::Compiling);
        let config = self.compile(project, options)?;

        if !options.slim && project.types_entry().is_file() {
            state.enter(project, BuildPhase::BuildingTypes);
            let entry = self.build_types(project)?;
            state.payloads.push(BuildPayload::Types(entry));
        }

        if options.watch && !options.slim {
            state.enter(project, BuildPhase::Watching);
            let refresh = style_refresh(
                self.workspace.clone(),
                Arc::clone(&self.toolchain.stylesheets),
                project,
                options,
            );
            let session = self.toolchain.watcher.watch(&config, refresh)?;
            self.sessions.push(session);
        }
        Ok(())
    }

    /// Build each dependency in slim mode, one after another
    fn build_dependencies(
        &mut self,
        project: &Project,
        options: &BuildOptions,
        state: &mut BuildState,
    ) -> Result<(), BuildError> {
        let dependencies = project.dependencies(&self.workspace.build_order());
        let dep_options = options.for_dependency(project.name());

        for name in dependencies {
            if name == project.name() || options.exceptions.contains(&name) {
                tracing::debug!("Skipping dependency {name} of {}", project.name());
                continue;
            }

            let dependency = self.workspace.project(&name);
            if let Err(e) = dependency.validate() {
                tracing::error!("{e}");
                continue;
            }

            self.build(&dependency, &dep_options)
                .map_err(|e| BuildError::DependencyBuildFailure {
                    package: project.name().to_string(),
                    dependency: name.clone(),
                    source: Box::new(e),
                })?;
            state.payloads.push(BuildPayload::Dependency(name));
        }
        Ok(())
    }

    fn bundle_i18n(&self, project: &Project) -> Result<Option<Vec<PathBuf>>, BuildError> {
        let script = project.i18n_script();
        if !script.is_file() {
            tracing::debug!("No i18n script for {}", project.name());
            return Ok(None);
        }
        self.toolchain.i18n.compile(project, &script).map(Some)
    }

    fn compile(
        &self,
        project: &Project,
        options: &BuildOptions,
    ) -> Result<CompilerConfig, BuildError> {
        let config = self.factory.create(project, &self.workspace, options);
        tracing::debug!(
            "{}: compiling {} entr(ies) into {}",
            project.name(),
            config.input.len(),
            config.output.file.display()
        );
        self.toolchain.compiler.compile(&config)?;
        Ok(config)
    }

    /// Stage `*.d.ts` sources, compile them and write the public declarations entry
    fn build_types(&self, project: &Project) -> Result<PathBuf, BuildError> {
        let fs_err = |e| BuildError::fs(project.name(), e);
        let src_dir = project.path().join("src");
        let staging = project.path().join(".tmp").join("types");
        let out_dir = project.dist_dir().join("@types");

        filesystem::recreate_dir(&staging).map_err(fs_err)?;
        for file in filesystem::find_files(&src_dir, ".d.ts") {
            let relative = file.strip_prefix(&src_dir).unwrap_or(&file);
            filesystem::copy_file(&file, &staging.join(relative)).map_err(fs_err)?;
        }

        self.toolchain
            .declarations
            .compile(project, &staging, &out_dir)?;

        let entry = project.dist_dir().join(TYPES_OUTPUT);
        let content = "export * from './@types/types';\nexport * from './@types/index';\n";
        filesystem::write_file(&entry, content).map_err(fs_err)?;
        filesystem::remove_dir_all(&staging).map_err(fs_err)?;
        Ok(entry)
    }
}

impl fmt::Debug for BuildCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildCoordinator")
            .field("workspace", &self.workspace)
            .field("target", &self.factory.name())
            .field("sessions", &self.sessions)
            .finish_non_exhaustive()
    }
}

/// Bundle `project`'s themes, then merge its dependencies' stylesheets with its own
fn bundle_styles(
    workspace: &Workspace,
    stylesheets: &dyn StylesheetCompiler,
    project: &Project,
    options: &BuildOptions,
) -> Result<AggregateReport, BuildError> {
    if project.has_styles() && !project.themes().is_empty() {
        let mut patterns = vec![format!("{}/**/*", project.components_dir().display())];
        patterns.extend(options.style_patterns.iter().cloned());

        let request = StyleBundleRequest {
            project: project.name().to_string(),
            cwd: project.path().to_path_buf(),
            export_path: project.dist_dir().join("themes"),
            minify: options.minify,
            patterns,
            themes: project
                .themes()
                .iter()
                .map(|theme| project.themes_source_dir().join(theme))
                .collect(),
            slim: options.slim,
        };
        stylesheets.bundle(&request)?;
    }

    StyleAggregator::new(workspace).aggregate(project)
}

/// Hook re-running the style phase for a watched package
///
/// The package is reloaded each time so themes added while watching are picked up.
fn style_refresh(
    workspace: Workspace,
    stylesheets: Arc<dyn StylesheetCompiler>,
    project: &Project,
    options: &BuildOptions,
) -> RebuildHook {
    let name = project.name().to_string();
    let path = project.path().to_path_buf();
    let options = options.clone();
    Box::new(move || {
        let project = workspace.project_at(&name, path.clone());
        let report = bundle_styles(&workspace, stylesheets.as_ref(), &project, &options)?;
        tracing::info!("{name}: refreshed {} theme(s)", report.themes.len());
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_display() {
        assert_eq!(BuildPhase::BuildingDependencies.to_string(), "building dependencies");
        assert_eq!(BuildPhase::Done.to_string(), "done");
    }

    #[test]
    fn test_result_accessors() {
        let result = BuildResult {
            success: true,
            message: "Built lists (fat)".to_string(),
            payloads: vec![
                BuildPayload::Dependency("ui".to_string()),
                BuildPayload::Styles(AggregateReport::default()),
            ],
            phases: vec![BuildPhase::Init, BuildPhase::Done],
        };
        assert_eq!(result.dependencies(), vec!["ui"]);
        assert!(result.styles().is_some());
    }
}
