//! External collaborator interfaces
//!
//! The coordinator never talks to Rollup, the stylesheet bundler, `tsc` or the
//! i18n script directly. It goes through these traits; [`crate::infra`] provides
//! the subprocess-backed implementations.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use crate::core::compiler::CompilerConfig;
use crate::core::project::Project;
use crate::error::BuildError;

/// Input for one stylesheet bundler run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleBundleRequest {
    /// Package name
    pub project: String,
    /// Package directory
    pub cwd: PathBuf,
    /// Directory receiving `<theme>/<theme>.min.css` and `.bundled.css`
    pub export_path: PathBuf,
    /// Minify output
    pub minify: bool,
    /// Source globs
    pub patterns: Vec<String>,
    /// Theme source directories
    pub themes: Vec<PathBuf>,
    /// Dependency-mode build
    pub slim: bool,
}

/// Bundler
pub trait PackageCompiler: Send + Sync {
    /// Compile and write the bundle described by `config`
    fn compile(&self, config: &CompilerConfig) -> Result<(), BuildError>;
}

/// Stylesheet bundler
pub trait StylesheetCompiler: Send + Sync {
    /// Produce per-theme minified and bundled stylesheets
    fn bundle(&self, request: &StyleBundleRequest) -> Result<(), BuildError>;
}

/// Type declaration compiler
pub trait DeclarationCompiler: Send + Sync {
    /// Emit `.d.ts` files for `project` from `staging` into `out_dir`
    fn compile(&self, project: &Project, staging: &Path, out_dir: &Path) -> Result<(), BuildError>;
}

/// i18n compiler
pub trait I18nCompiler: Send + Sync {
    /// Run `script` for `project`, returning the files it produced
    fn compile(&self, project: &Project, script: &Path) -> Result<Vec<PathBuf>, BuildError>;
}

/// Work run after each successful watch recompile
pub type RebuildHook = Box<dyn Fn() -> Result<(), BuildError> + Send>;

/// Starts background watch sessions
pub trait WatchLauncher: Send + Sync {
    /// Watch `config`'s sources; on change recompile, then run `after_rebuild`
    fn watch(
        &self,
        config: &CompilerConfig,
        after_rebuild: RebuildHook,
    ) -> Result<WatchSession, BuildError>;
}

/// Events emitted by a watch session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// Session is running
    Started,
    /// A rebuild finished
    Rebuilt { changed: Vec<PathBuf> },
    /// A rebuild failed; the session keeps running
    Error(String),
}

/// Handle to a running watch session
///
/// The session lives as long as this handle; dropping it stops watching.
pub struct WatchSession {
    project: String,
    events: mpsc::Receiver<WatchEvent>,
    _guard: Box<dyn Send>,
}

impl WatchSession {
    /// Wrap a running watcher
    ///
    /// `guard` owns whatever keeps the watcher alive.
    pub fn new(
        project: impl Into<String>,
        events: mpsc::Receiver<WatchEvent>,
        guard: impl Send + 'static,
    ) -> Self {
        Self {
            project: project.into(),
            events,
            _guard: Box::new(guard),
        }
    }

    /// Package being watched
    pub fn project(&self) -> &str {
        &self.project
    }

    /// Events received so far, without blocking
    pub fn drain_events(&self) -> Vec<WatchEvent> {
        self.events.try_iter().collect()
    }

    /// Block until the next event; `None` once the watcher is gone
    pub fn next_event(&self) -> Option<WatchEvent> {
        self.events.recv().ok()
    }

    /// Like [`WatchSession::next_event`], giving up after `timeout`
    pub fn next_event_timeout(&self, timeout: Duration) -> Option<WatchEvent> {
        self.events.recv_timeout(timeout).ok()
    }
}

impl std::fmt::Debug for WatchSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchSession")
            .field("project", &self.project)
            .finish_non_exhaustive()
    }
}

/// The full set of collaborators a build needs
#[derive(Clone)]
pub struct Toolchain {
    /// Bundler
    pub compiler: Arc<dyn PackageCompiler>,
    /// Stylesheet bundler
    pub stylesheets: Arc<dyn StylesheetCompiler>,
    /// Type declaration compiler
    pub declarations: Arc<dyn DeclarationCompiler>,
    /// i18n compiler
    pub i18n: Arc<dyn I18nCompiler>,
    /// Watch session launcher
    pub watcher: Arc<dyn WatchLauncher>,
}
