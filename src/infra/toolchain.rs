//! Subprocess-backed toolchain
//!
//! Wires the external tools into a [`Toolchain`] for a workspace, honouring the
//! command overrides in `arpadroid.toml`.

use std::sync::Arc;
use std::time::Duration;

use crate::config::defaults;
use crate::core::toolchain::{PackageCompiler, Toolchain};
use crate::core::workspace::Workspace;
use crate::infra::declarations::TscCompiler;
use crate::infra::i18n::NodeI18nCompiler;
use crate::infra::process::resolve_tool;
use crate::infra::rollup::RollupCompiler;
use crate::infra::stylesheets::ThemesBundler;
use crate::infra::watch::RebuildWatcher;

/// Toolchain running the real tools for `workspace`
pub fn toolchain_for(workspace: &Workspace, verbose: bool) -> Toolchain {
    let settings = workspace.settings();
    let tooling = workspace.tooling_path();

    let rollup = settings
        .rollup()
        .map_or_else(|| resolve_tool(defaults::ROLLUP_COMMAND, &tooling), str::to_string);
    let tsc = settings
        .tsc()
        .map_or_else(|| resolve_tool(defaults::TSC_COMMAND, &tooling), str::to_string);

    let compiler: Arc<dyn PackageCompiler> = Arc::new(RollupCompiler::new(
        rollup,
        tooling.join(defaults::ROLLUP_CONFIG),
        verbose,
    ));

    Toolchain {
        compiler: Arc::clone(&compiler),
        stylesheets: Arc::new(
            ThemesBundler::new(settings.node(), verbose)
                .with_command(settings.stylesheet_bundler().map(str::to_string)),
        ),
        declarations: Arc::new(TscCompiler::new(tsc, verbose)),
        i18n: Arc::new(NodeI18nCompiler::new(settings.node(), verbose)),
        watcher: Arc::new(RebuildWatcher::new(
            compiler,
            Duration::from_millis(defaults::WATCH_DEBOUNCE_MS),
        )),
    }
}
