//! i18n compiler invocation
//!
//! Runs a package's i18n build script with Node. Each non-empty stdout line is
//! the path of a produced file.

use std::path::{Path, PathBuf};

use crate::core::project::Project;
use crate::core::toolchain::I18nCompiler;
use crate::error::BuildError;
use crate::infra::process;

/// Node-backed i18n compiler
#[derive(Debug, Clone)]
pub struct NodeI18nCompiler {
    node: String,
    verbose: bool,
}

impl NodeI18nCompiler {
    /// Create a compiler running scripts with `node`
    pub fn new(node: impl Into<String>, verbose: bool) -> Self {
        Self {
            node: node.into(),
            verbose,
        }
    }
}

impl I18nCompiler for NodeI18nCompiler {
    fn compile(&self, project: &Project, script: &Path) -> Result<Vec<PathBuf>, BuildError> {
        let mut command = process::shell(&format!("{} {}", self.node, process::quote_path(script)));
        command.current_dir(project.path());
        let stdout = process::run_tool(project.name(), "i18n", &mut command, self.verbose)?;
        Ok(parse_output(project.path(), &stdout))
    }
}

fn parse_output(base: &Path, stdout: &str) -> Vec<PathBuf> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| process::output_path(base, line))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::workspace::Workspace;

    #[test]
    fn test_parse_output_skips_blank_lines() {
        let files = parse_output(Path::new("/pkg"), "dist/i18n/en.json\n\n  dist/i18n/es.json  \n");
        assert_eq!(
            files,
            vec![
                PathBuf::from("/pkg/dist/i18n/en.json"),
                PathBuf::from("/pkg/dist/i18n/es.json")
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_script_path_with_space_is_one_argument() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let package = temp_dir.path().join("my pkg");
        std::fs::create_dir_all(&package).unwrap();
        let script = package.join("i18n.js");
        std::fs::write(&script, "dist/i18n/en.json\n").unwrap();

        let workspace = Workspace::new(
            temp_dir.path().to_path_buf(),
            temp_dir.path().to_path_buf(),
            crate::core::settings::Settings::default(),
        );
        let project = workspace.project_at("ui", package.clone());

        let files = NodeI18nCompiler::new("cat", false).compile(&project, &script).unwrap();
        assert_eq!(files, vec![package.join("dist/i18n/en.json")]);
    }
}
