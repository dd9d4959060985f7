//! Source watching
//!
//! Recompiles a package whenever its sources or watched theme directories
//! change, then runs the caller's rebuild hook. Changes are debounced; output
//! under `dist/` is ignored.

use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc};
use std::time::Duration;

use notify::RecursiveMode;
use notify_debouncer_full::{new_debouncer, DebounceEventResult};

use crate::core::compiler::CompilerConfig;
use crate::core::toolchain::{
    PackageCompiler, RebuildHook, WatchEvent, WatchLauncher, WatchSession,
};
use crate::error::BuildError;

/// Watch launcher recompiling through a [`PackageCompiler`]
#[derive(Clone)]
pub struct RebuildWatcher {
    compiler: Arc<dyn PackageCompiler>,
    debounce: Duration,
}

impl RebuildWatcher {
    /// Create a launcher rebuilding with `compiler` after `debounce` of quiet
    pub fn new(compiler: Arc<dyn PackageCompiler>, debounce: Duration) -> Self {
        Self { compiler, debounce }
    }
}

impl WatchLauncher for RebuildWatcher {
    fn watch(
        &self,
        config: &CompilerConfig,
        after_rebuild: RebuildHook,
    ) -> Result<WatchSession, BuildError> {
        let (tx, rx) = mpsc::channel();
        let compiler = Arc::clone(&self.compiler);
        let rebuild_config = config.clone();
        let dist = config.cwd.join("dist");
        let events = tx.clone();

        let watch_error = |e: notify::Error| BuildError::ToolLaunch {
            package: config.project.clone(),
            tool: "watcher".to_string(),
            error: e.to_string(),
        };

        let mut debouncer = new_debouncer(self.debounce, None, move |result: DebounceEventResult| {
            let event = match result {
                Ok(batch) => {
                    let changed = changed_paths(batch.iter().flat_map(|e| e.paths.iter()), &dist);
                    if changed.is_empty() {
                        return;
                    }
                    tracing::info!("{}: rebuilding after {} change(s)", rebuild_config.project, changed.len());
                    match compiler.compile(&rebuild_config).and_then(|()| after_rebuild()) {
                        Ok(()) => WatchEvent::Rebuilt { changed },
                        Err(e) => {
                            tracing::error!("{e}");
                            WatchEvent::Error(e.to_string())
                        }
                    }
                }
                Err(errors) => {
                    let message = errors
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join("; ");
                    tracing::error!("{}: watch error: {message}", rebuild_config.project);
                    WatchEvent::Error(message)
                }
            };
            let _ = events.send(event);
        })
        .map_err(watch_error)?;

        for dir in watch_roots(config) {
            tracing::debug!("{}: watching {}", config.project, dir.display());
            debouncer
                .watch(&dir, RecursiveMode::Recursive)
                .map_err(watch_error)?;
        }

        let _ = tx.send(WatchEvent::Started);
        Ok(WatchSession::new(config.project.clone(), rx, debouncer))
    }
}

/// Package sources plus every watch plugin directory that exists
fn watch_roots(config: &CompilerConfig) -> Vec<PathBuf> {
    let mut roots = vec![config.cwd.join("src")];
    for dir in config.watch_dirs() {
        if !roots.iter().any(|root| dir.starts_with(root)) {
            roots.push(dir);
        }
    }
    roots.retain(|dir| dir.is_dir());
    roots
}

/// Deduplicated changed paths outside `dist`
fn changed_paths<'a>(paths: impl Iterator<Item = &'a PathBuf>, dist: &Path) -> Vec<PathBuf> {
    let mut changed: Vec<PathBuf> = Vec::new();
    for path in paths {
        if path.starts_with(dist) || changed.contains(path) {
            continue;
        }
        changed.push(path.clone());
    }
    changed
}
