//! Type declaration compiler invocation

use std::path::Path;

use crate::core::project::Project;
use crate::core::toolchain::DeclarationCompiler;
use crate::error::BuildError;
use crate::infra::{filesystem, process};

/// `tsc`-backed declaration compiler
#[derive(Debug, Clone)]
pub struct TscCompiler {
    program: String,
    verbose: bool,
}

impl TscCompiler {
    /// Create a compiler running `program`
    pub fn new(program: impl Into<String>, verbose: bool) -> Self {
        Self {
            program: program.into(),
            verbose,
        }
    }

    /// Command line compiling the declarations staged in `staging`
    pub fn command_line(&self, staging: &Path, out_dir: &Path) -> String {
        let mut line = format!(
            "{} --declaration --emitDeclarationOnly --allowJs --skipLibCheck --rootDir {} --outDir {}",
            self.program,
            process::quote_path(staging),
            process::quote_path(out_dir)
        );
        for file in filesystem::find_files(staging, ".d.ts") {
            line.push(' ');
            line.push_str(&process::quote_path(&file));
        }
        line
    }
}

impl DeclarationCompiler for TscCompiler {
    fn compile(&self, project: &Project, staging: &Path, out_dir: &Path) -> Result<(), BuildError> {
        filesystem::create_dir_all(out_dir).map_err(|e| BuildError::fs(project.name(), e))?;
        let mut command = process::shell(&self.command_line(staging, out_dir));
        command.current_dir(project.path());
        process::run_tool(project.name(), "tsc", &mut command, self.verbose)?;
        Ok(())
    }
}
