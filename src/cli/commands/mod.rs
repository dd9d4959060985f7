//! CLI command implementations
//!
//! Each command is implemented in its own submodule.

pub mod build;
pub mod build_all;
pub mod deps;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Subcommand;

use crate::cli::output::OutputConfig;
use crate::config::defaults;
use crate::core::project::Project;
use crate::core::workspace::Workspace;

/// Where a command runs and how it reports
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// Current working directory
    pub cwd: PathBuf,
    /// Directory sibling packages are resolved against
    pub base_path: PathBuf,
    /// Output settings
    pub output: OutputConfig,
}

impl CommandContext {
    /// Load the workspace and its settings
    pub fn workspace(&self) -> Result<Workspace> {
        Workspace::discover(&self.cwd, &self.base_path).with_context(|| {
            format!(
                "Failed to load workspace settings from {}",
                self.base_path.display()
            )
        })
    }

    /// Resolve the package a command targets
    ///
    /// Without `--project` the package in the working directory is used.
    pub fn project(
        &self,
        workspace: &Workspace,
        name: Option<String>,
        path: Option<PathBuf>,
    ) -> Result<Project> {
        let explicit = name.is_some();
        let Some(name) = name.or_else(|| workspace.current_project_name()) else {
            bail!("No project given and none found in {}", self.cwd.display());
        };

        let project = match path {
            Some(path) => workspace.project_at(&name, path),
            None if explicit => workspace.project(&name),
            None => workspace.project_at(&name, self.cwd.clone()),
        };
        project
            .validate()
            .with_context(|| format!("Cannot use project '{name}'"))?;
        Ok(project)
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a package and its sibling dependencies
    Build {
        /// Package name (defaults to the package in the current directory)
        #[arg(short, long)]
        project: Option<String>,

        /// Package directory, overriding the conventional location
        #[arg(long)]
        path: Option<PathBuf>,

        /// Dependency-mode build: no dependencies, i18n, types or watch
        #[arg(long)]
        slim: bool,

        /// Minify stylesheets
        #[arg(long)]
        minify: bool,

        /// Keep rebuilding on source changes
        #[arg(short, long)]
        watch: bool,

        /// Pre-built dependency bundles to include (comma separated)
        #[arg(long, value_delimiter = ',')]
        deps: Vec<String>,

        /// Extra stylesheet globs (comma separated)
        #[arg(long = "style-patterns", value_delimiter = ',')]
        style_patterns: Vec<String>,

        /// Launch storybook after the build, optionally on a given port
        #[arg(long, num_args = 0..=1)]
        storybook: Option<Option<u16>>,

        /// Dependencies to leave out (comma separated)
        #[arg(long = "except")]
        except: Vec<String>,

        /// Build kind
        #[arg(long, default_value = defaults::DEFAULT_BUILD_TARGET)]
        target: String,
    },

    /// Build every package of the workspace with its own build script
    BuildAll {
        /// Packages to leave out (comma separated)
        #[arg(long = "except")]
        except: Vec<String>,

        /// Packages to build instead of the root manifest's (comma separated)
        #[arg(long, value_delimiter = ',')]
        projects: Option<Vec<String>>,

        /// Use watch scripts
        #[arg(short, long)]
        watch: bool,

        /// Use slim scripts
        #[arg(long)]
        slim: bool,

        /// Build one package at a time
        #[arg(long)]
        sequential: bool,

        /// Build kind
        #[arg(long, default_value = defaults::DEFAULT_BUILD_TARGET)]
        target: String,

        /// Print the commands without running them
        #[arg(long)]
        dry_run: bool,
    },

    /// Run a package's tests
    Test {
        /// Package name (defaults to the package in the current directory)
        #[arg(short, long)]
        project: Option<String>,

        /// CI mode: build first and serve a static storybook
        #[arg(long, env = "ci")]
        ci: bool,

        /// Run the storybook test runner
        #[arg(long, env = "storybook")]
        storybook: bool,

        /// Run Jest tests
        #[arg(long, env = "jest")]
        jest: bool,

        /// Build before testing
        #[arg(long, env = "build")]
        build: bool,

        /// Only run stories matching this case-insensitive regex
        #[arg(long, env = "query")]
        query: Option<String>,

        /// Browsers for the storybook test runner
        #[arg(long, env = "browsers")]
        browsers: Option<String>,

        /// Storybook port
        #[arg(long, env = "port")]
        port: Option<u16>,
    },

    /// Show a package's resolved dependencies and themes
    Deps {
        /// Package name (defaults to the package in the current directory)
        #[arg(short, long)]
        project: Option<String>,
    },
}

impl Commands {
    /// Execute the command
    pub async fn run(self, context: &CommandContext) -> Result<()> {
        match self {
            Self::Build {
                project,
                path,
                slim,
                minify,
                watch,
                deps,
                style_patterns,
                storybook,
                except,
                target,
            } => {
                let args = build::BuildArgs {
                    project,
                    path,
                    slim,
                    minify,
                    watch,
                    deps,
                    style_patterns,
                    storybook,
                    except,
                    target,
                };
                build::execute(context, args).await
            }
            Self::BuildAll {
                except,
                projects,
                watch,
                slim,
                sequential,
                target,
                dry_run,
            } => {
                let args = build_all::BuildAllArgs {
                    except,
                    projects,
                    watch,
                    slim,
                    sequential,
                    target,
                    dry_run,
                };
                build_all::execute(context, args).await
            }
            Self::Test {
                project,
                ci,
                storybook,
                jest,
                build,
                query,
                browsers,
                port,
            } => {
                let args = test::TestArgs {
                    project,
                    ci,
                    storybook,
                    jest,
                    build,
                    query,
                    browsers,
                    port,
                };
                test::execute(context, args).await
            }
            Self::Deps { project } => deps::execute(context, project),
        }
    }
}
