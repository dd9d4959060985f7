//! Error types for arpadroid-build
//!
//! Domain-specific error types using thiserror.

use std::path::PathBuf;
use thiserror::Error;

/// Project discovery and manifest errors
#[derive(Error, Debug)]
pub enum ProjectError {
    /// Resolved project path does not exist
    #[error("Project '{name}' does not exist at {path}")]
    ProjectNotFound { name: String, path: PathBuf },

    /// package.json missing
    #[error("Project '{name}' has no package.json at {path}")]
    ManifestNotFound { name: String, path: PathBuf },

    /// package.json present but could not be read
    #[error("Failed to read {path} for '{name}': {error}")]
    ManifestRead {
        name: String,
        path: PathBuf,
        error: String,
    },

    /// package.json read but not valid
    #[error("Failed to parse package.json for '{name}': {error}")]
    ManifestParse { name: String, error: String },
}

/// Workspace settings errors
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Failed to read settings file
    #[error("Failed to read settings file '{path}': {error}")]
    ReadError { path: String, error: String },

    /// Failed to parse settings file
    #[error("Failed to parse settings file '{path}': {error}")]
    ParseError { path: String, error: String },
}

/// Filesystem errors
#[derive(Error, Debug)]
pub enum FilesystemError {
    /// Failed to create directory
    #[error("Failed to create directory '{path}': {error}")]
    CreateDir { path: PathBuf, error: String },

    /// Failed to remove directory
    #[error("Failed to remove directory '{path}': {error}")]
    RemoveDir { path: PathBuf, error: String },

    /// Failed to write file
    #[error("Failed to write file '{path}': {error}")]
    WriteFile { path: PathBuf, error: String },

    /// Failed to read file
    #[error("Failed to read file '{path}': {error}")]
    ReadFile { path: PathBuf, error: String },

    /// Failed to copy a file or directory tree
    #[error("Failed to copy '{from}' to '{to}': {error}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        error: String,
    },
}

/// A stylesheet expected during aggregation was not on disk
///
/// Never fatal; recorded in the aggregate report and logged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Could not bundle '{path}' for theme '{theme}' of '{package}': file does not exist")]
pub struct MissingArtifactWarning {
    pub package: String,
    pub theme: String,
    pub path: PathBuf,
}

/// Build errors
#[derive(Error, Debug)]
pub enum BuildError {
    /// A recursive dependency build failed
    #[error("Dependency '{dependency}' of '{package}' failed to build: {source}")]
    DependencyBuildFailure {
        package: String,
        dependency: String,
        #[source]
        source: Box<BuildError>,
    },

    /// An external compiler or process exited non-zero
    #[error("{tool} failed for package '{package}' (exit code {})", display_code(*code))]
    ExternalToolFailure {
        package: String,
        tool: String,
        code: Option<i32>,
    },

    /// An external tool could not be started at all
    #[error("Failed to launch {tool} for package '{package}': {error}")]
    ToolLaunch {
        package: String,
        tool: String,
        error: String,
    },

    /// Unknown build kind requested
    #[error("Invalid build target: '{name}' (available: {})", available.join(", "))]
    InvalidBuildTarget {
        name: String,
        available: Vec<String>,
    },

    /// Project lookup failure during a build
    #[error(transparent)]
    Project(#[from] ProjectError),

    /// Filesystem failure during a build phase
    #[error("Filesystem error while building '{package}': {source}")]
    Filesystem {
        package: String,
        #[source]
        source: FilesystemError,
    },
}

impl BuildError {
    /// Name of the package this error is attributed to, if any
    pub fn package(&self) -> Option<&str> {
        match self {
            Self::DependencyBuildFailure { package, .. }
            | Self::ExternalToolFailure { package, .. }
            | Self::ToolLaunch { package, .. }
            | Self::Filesystem { package, .. } => Some(package),
            Self::Project(ProjectError::ProjectNotFound { name, .. })
            | Self::Project(ProjectError::ManifestNotFound { name, .. })
            | Self::Project(ProjectError::ManifestRead { name, .. })
            | Self::Project(ProjectError::ManifestParse { name, .. }) => Some(name),
            Self::InvalidBuildTarget { .. } => None,
        }
    }

    /// The innermost package that actually failed, following dependency chains
    pub fn failing_package(&self) -> Option<&str> {
        match self {
            Self::DependencyBuildFailure { source, .. } => source.failing_package(),
            other => other.package(),
        }
    }

    pub(crate) fn fs(package: &str, source: FilesystemError) -> Self {
        Self::Filesystem {
            package: package.to_string(),
            source,
        }
    }
}

fn display_code(code: Option<i32>) -> String {
    code.map_or_else(|| "signal".to_string(), |c| c.to_string())
}

/// Test run errors
#[derive(Error, Debug)]
pub enum TestError {
    /// Story filter is not a valid regular expression
    #[error("Invalid test query '{query}': {error}")]
    InvalidQuery { query: String, error: String },

    /// A test step exited non-zero
    #[error("{step} failed for package '{package}' (exit code {})", display_code(*code))]
    StepFailed {
        package: String,
        step: String,
        code: Option<i32>,
    },

    /// A test step could not be started
    #[error("Failed to launch {step} for package '{package}': {error}")]
    StepLaunch {
        package: String,
        step: String,
        error: String,
    },

    /// Project lookup failure
    #[error(transparent)]
    Project(#[from] ProjectError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependency_failure_mentions_dependency() {
        let err = BuildError::DependencyBuildFailure {
            package: "lists".to_string(),
            dependency: "ui".to_string(),
            source: Box::new(BuildError::ExternalToolFailure {
                package: "ui".to_string(),
                tool: "rollup".to_string(),
                code: Some(2),
            }),
        };

        let message = err.to_string();
        assert!(message.contains("'ui'"));
        assert!(message.contains("'lists'"));
        assert_eq!(err.package(), Some("lists"));
        assert_eq!(err.failing_package(), Some("ui"));
    }

    #[test]
    fn test_external_tool_failure_reports_exit_code() {
        let err = BuildError::ExternalToolFailure {
            package: "form".to_string(),
            tool: "tsc".to_string(),
            code: Some(1),
        };
        assert_eq!(
            err.to_string(),
            "tsc failed for package 'form' (exit code 1)"
        );

        let killed = BuildError::ExternalToolFailure {
            package: "form".to_string(),
            tool: "tsc".to_string(),
            code: None,
        };
        assert!(killed.to_string().contains("exit code signal"));
    }

    #[test]
    fn test_invalid_build_target_lists_available() {
        let err = BuildError::InvalidBuildTarget {
            name: "webapp".to_string(),
            available: vec!["ui-component".to_string()],
        };
        assert!(err.to_string().contains("ui-component"));
        assert_eq!(err.package(), None);
    }
}
