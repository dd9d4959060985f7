//! Package test runs
//!
//! Discovers a package's stories and Jest tests, plans the shell steps that
//! exercise them and runs those steps in order through a [`StepRunner`].

use std::path::{Path, PathBuf};

use regex::RegexBuilder;

use crate::config::defaults;
use crate::core::project::{BuildScript, Project};
use crate::core::workspace::Workspace;
use crate::error::TestError;
use crate::infra::process::quote_path;

/// Jest configuration files looked up in the package, in priority order
const JEST_CONFIGS: &[&str] = &["jest.config.mjs", "jest.config.cjs", "jest.config.js"];

/// Options for a test run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestOptions {
    /// Run the storybook test runner over discovered stories
    pub storybook: bool,
    /// Run Jest over discovered tests
    pub jest: bool,
    /// CI mode: pre-build and serve a static storybook
    pub ci: bool,
    /// Build before testing even outside CI
    pub build: bool,
    /// Case-insensitive regular expression selecting stories
    pub query: Option<String>,
    /// Browsers for the storybook test runner
    pub browsers: String,
    /// Storybook port
    pub port: u16,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            storybook: false,
            jest: false,
            ci: false,
            build: false,
            query: None,
            browsers: defaults::DEFAULT_BROWSERS.to_string(),
            port: defaults::DEFAULT_STORYBOOK_PORT,
        }
    }
}

/// Whether a step's failure ends the run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    /// Failure fails the run and skips later required steps
    Required,
    /// Always runs; failure is ignored
    Cleanup,
}

/// One shell step of a test run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestStep {
    /// Short description for logs
    pub label: String,
    /// Shell command line
    pub command: String,
    /// Directory the command runs in
    pub cwd: PathBuf,
    pub kind: StepKind,
}

/// Everything a test run will do
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestPlan {
    /// Package under test
    pub project: String,
    /// Story files selected for the storybook test runner
    pub stories: Vec<PathBuf>,
    /// Jest test files found
    pub jest_tests: Vec<PathBuf>,
    /// Steps in execution order
    pub steps: Vec<TestStep>,
}

impl TestPlan {
    /// Whether discovery found nothing to test
    pub fn is_empty(&self) -> bool {
        self.stories.is_empty() && self.jest_tests.is_empty()
    }
}

/// Outcome of a test run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestResult {
    pub success: bool,
    pub message: String,
    /// Labels of the steps that ran successfully
    pub payloads: Vec<String>,
}

/// Runs one test step to completion
pub trait StepRunner {
    /// Run `step` for `package`
    fn run(&self, package: &str, step: &TestStep) -> Result<(), TestError>;
}

/// Plans and runs package tests
pub struct ProjectTest<'a> {
    workspace: &'a Workspace,
}

impl<'a> ProjectTest<'a> {
    /// Create a test planner over `workspace`
    pub fn new(workspace: &'a Workspace) -> Self {
        Self { workspace }
    }

    /// Discover tests and plan the steps for `project`
    pub fn plan(&self, project: &Project, options: &TestOptions) -> Result<TestPlan, TestError> {
        project.validate()?;

        let src = project.path().join("src");
        let mut plan = TestPlan {
            project: project.name().to_string(),
            ..TestPlan::default()
        };
        if options.storybook {
            plan.stories = filter_stories(glob_files(&src, "**/*.stories.js"), options.query.as_deref())?;
        }
        if options.jest {
            plan.jest_tests = glob_files(&src, "**/*.test.js");
        }
        if plan.is_empty() {
            return Ok(plan);
        }

        let cwd = project.path().to_path_buf();
        let settings = self.workspace.settings();
        let step = |label: &str, command: String, kind| TestStep {
            label: label.to_string(),
            command,
            cwd: cwd.clone(),
            kind,
        };

        if (options.ci || options.build) && project.capabilities().build {
            plan.steps.push(step(
                "build",
                format!(
                    "{} {} -- --logHeading=false",
                    settings.script_runner(),
                    BuildScript::Build.script_name()
                ),
                StepKind::Required,
            ));
        }

        let node_tests = project.path().join("test").join("test.mjs");
        if node_tests.is_file() {
            plan.steps.push(step(
                "node tests",
                format!("{} {}", settings.node(), quote_path(&node_tests)),
                StepKind::Required,
            ));
        }

        if !plan.jest_tests.is_empty() {
            plan.steps.push(step(
                "jest tests",
                format!(
                    "{} --experimental-vm-modules node_modules/jest/bin/jest.js --rootDir={} --config={}",
                    settings.node(),
                    quote_path(project.path()),
                    quote_path(&self.jest_config(project))
                ),
                StepKind::Required,
            ));
        }

        if !plan.stories.is_empty() {
            let server = StorybookServer::new(self.workspace, project, options.port);
            if options.ci {
                plan.steps.push(step("stop storybook", server.stop_command(), StepKind::Cleanup));
                plan.steps.push(step("start storybook", server.start_command(), StepKind::Required));
            }
            plan.steps.push(step(
                "storybook tests",
                server.test_command(&options.browsers, &plan.stories),
                StepKind::Required,
            ));
            if options.ci {
                plan.steps.push(step("stop storybook", server.stop_command(), StepKind::Cleanup));
            }
        } else if options.storybook && options.query.is_some() {
            tracing::info!("No stories of {} match the query", project.name());
        }

        Ok(plan)
    }

    /// Run a planned test
    pub fn run(&self, plan: &TestPlan, runner: &dyn StepRunner) -> TestResult {
        if plan.is_empty() {
            tracing::info!("Nothing to test in {}", plan.project);
            return TestResult {
                success: true,
                message: "Nothing to test".to_string(),
                payloads: Vec::new(),
            };
        }

        let mut failure: Option<TestError> = None;
        let mut payloads = Vec::new();
        for step in &plan.steps {
            if failure.is_some() && step.kind == StepKind::Required {
                continue;
            }
            tracing::info!("{}: {}", plan.project, step.label);
            match runner.run(&plan.project, step) {
                Ok(()) => payloads.push(step.label.clone()),
                Err(e) if step.kind == StepKind::Cleanup => {
                    tracing::debug!("{}: ignoring {} failure: {e}", plan.project, step.label);
                }
                Err(e) => {
                    tracing::error!("{e}");
                    failure = Some(e);
                }
            }
        }

        match failure {
            Some(e) => TestResult {
                success: false,
                message: e.to_string(),
                payloads,
            },
            None => TestResult {
                success: true,
                message: format!("Tests passed for {}", plan.project),
                payloads,
            },
        }
    }

    /// Plan and run; planning errors become a failed result
    pub fn test(&self, project: &Project, options: &TestOptions, runner: &dyn StepRunner) -> TestResult {
        match self.plan(project, options) {
            Ok(plan) => self.run(&plan, runner),
            Err(e) => TestResult {
                success: false,
                message: e.to_string(),
                payloads: Vec::new(),
            },
        }
    }

    /// First Jest config present in the package, else the shared default
    pub fn jest_config(&self, project: &Project) -> PathBuf {
        JEST_CONFIGS
            .iter()
            .map(|name| project.path().join(name))
            .find(|path| path.is_file())
            .unwrap_or_else(|| {
                project
                    .path()
                    .join(self.workspace.settings().packages_dir())
                    .join("arpadroid")
                    .join("src")
                    .join("jest")
                    .join("jest.config.mjs")
            })
    }
}

/// Commands driving the storybook test runner and its CI static server
struct StorybookServer {
    cwd: PathBuf,
    config_dir: PathBuf,
    tooling: PathBuf,
    storybook: String,
    node: String,
    port: u16,
}

impl StorybookServer {
    fn new(workspace: &Workspace, project: &Project, port: u16) -> Self {
        let settings = workspace.settings();
        let tooling = workspace.tooling_path();
        let storybook = settings.storybook_command().map_or_else(
            || quote_path(&tooling.join("node_modules/.bin").join(defaults::STORYBOOK_COMMAND)),
            str::to_string,
        );
        Self {
            cwd: project.path().to_path_buf(),
            config_dir: project.path().join(settings.storybook_config_dir()),
            tooling,
            storybook,
            node: settings.node().to_string(),
            port,
        }
    }

    fn pm2(&self) -> String {
        quote_path(&self.tooling.join("node_modules/pm2/bin/pm2"))
    }

    fn start_command(&self) -> String {
        let static_dir = self.cwd.join("storybook-static");
        let http_server = self.tooling.join("node_modules/http-server/bin/http-server");
        format!(
            "rm -rf {} && {} build -c {} && {} start {} --name '{}' -- ./storybook-static --port {} --host 127.0.0.1 --silent",
            quote_path(&static_dir),
            self.storybook,
            quote_path(&self.config_dir),
            self.pm2(),
            quote_path(&http_server),
            defaults::STORYBOOK_CI_SERVER,
            self.port
        )
    }

    fn stop_command(&self) -> String {
        let pm2 = self.pm2();
        let name = defaults::STORYBOOK_CI_SERVER;
        format!("{pm2} stop {name} && {pm2} delete {name}")
    }

    fn test_command(&self, browsers: &str, stories: &[PathBuf]) -> String {
        let runner = self
            .tooling
            .join("node_modules/@storybook/test-runner/dist/test-storybook");
        let mut command = format!(
            "{} {} -c {} --maxWorkers=9 --browsers {browsers} --url=\"http://127.0.0.1:{}\"",
            self.node,
            quote_path(&runner),
            quote_path(&self.config_dir),
            self.port
        );
        for story in stories {
            let relative = story.strip_prefix(&self.cwd).unwrap_or(story);
            command.push(' ');
            command.push_str(&quote_path(relative));
        }
        command
    }
}

/// Files under `dir` matching `pattern`, sorted
fn glob_files(dir: &Path, pattern: &str) -> Vec<PathBuf> {
    let full = format!("{}/{pattern}", dir.display());
    let Ok(paths) = glob::glob(&full) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = paths.filter_map(Result::ok).collect();
    files.sort();
    files
}

/// Keep stories whose path matches `query`, case-insensitively
fn filter_stories(stories: Vec<PathBuf>, query: Option<&str>) -> Result<Vec<PathBuf>, TestError> {
    let Some(query) = query.filter(|q| !q.is_empty()) else {
        return Ok(stories);
    };
    let regex = RegexBuilder::new(query)
        .case_insensitive(true)
        .build()
        .map_err(|e| TestError::InvalidQuery {
            query: query.to_string(),
            error: e.to_string(),
        })?;
    Ok(stories
        .into_iter()
        .filter(|story| regex.is_match(&story.to_string_lossy()))
        .collect())
}
