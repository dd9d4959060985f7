//! Theme stylesheet aggregation
//!
//! Merges the compiled stylesheets of a package's style dependencies, in style
//! priority order, with its own into one final stylesheet per theme.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::config::defaults::UI_PACKAGE;
use crate::core::project::Project;
use crate::core::workspace::Workspace;
use crate::error::{BuildError, MissingArtifactWarning};
use crate::infra::filesystem;

/// Final stylesheets written for one theme
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThemeOutput {
    /// `<theme>.final.css`, when any minified input existed
    pub final_css: Option<PathBuf>,
    /// `<theme>.bundled.final.css`, when any bundled input existed
    pub bundled_css: Option<PathBuf>,
    /// Inputs concatenated into `final_css`, in order
    pub sources: Vec<PathBuf>,
}

/// Result of one aggregation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateReport {
    /// Theme name to written outputs
    pub themes: BTreeMap<String, ThemeOutput>,
    /// Expected inputs that were not on disk
    pub missing: Vec<MissingArtifactWarning>,
    /// Asset directories copied from the base UI package
    pub copied_assets: Vec<PathBuf>,
}

impl AggregateReport {
    /// Final stylesheet written for `theme`
    pub fn final_css(&self, theme: &str) -> Option<&PathBuf> {
        self.themes.get(theme).and_then(|t| t.final_css.as_ref())
    }
}

/// Style aggregator
pub struct StyleAggregator<'a> {
    workspace: &'a Workspace,
}

impl<'a> StyleAggregator<'a> {
    /// Create an aggregator resolving style packages through `workspace`
    pub fn new(workspace: &'a Workspace) -> Self {
        Self { workspace }
    }

    /// Packages whose styles feed `project`'s final stylesheets, in merge order
    ///
    /// Dependencies ordered by the style priority list, then the package itself.
    pub fn style_packages(&self, project: &Project) -> Vec<String> {
        let mut packages = project.dependencies(&self.workspace.style_order());
        packages.retain(|name| name != project.name());
        packages.push(project.name().to_string());
        packages
    }

    /// Write `<theme>.final.css` and `<theme>.bundled.final.css` for `project`
    ///
    /// Missing inputs are reported, not fatal. Only write failures are errors.
    pub fn aggregate(&self, project: &Project) -> Result<AggregateReport, BuildError> {
        let mut report = AggregateReport::default();
        let mut inputs: BTreeMap<String, Vec<(String, PathBuf)>> = BTreeMap::new();

        for name in self.style_packages(project) {
            let style_project = if name == project.name() {
                project.clone()
            } else {
                self.workspace.project(&name)
            };
            if !style_project.has_styles() {
                continue;
            }

            for theme in style_project.themes() {
                inputs
                    .entry(theme.clone())
                    .or_default()
                    .push((name.clone(), style_project.minified_theme_file(theme)));
            }

            if name == UI_PACKAGE && name != project.name() {
                self.copy_ui_assets(&style_project, project, &mut report)?;
            }
        }

        for (theme, files) in inputs {
            let output = self.merge_theme(project, &theme, &files, &mut report.missing)?;
            report.themes.insert(theme, output);
        }

        tracing::debug!(
            "Aggregated {} theme(s) for {} ({} missing input(s))",
            report.themes.len(),
            project.name(),
            report.missing.len()
        );
        Ok(report)
    }

    fn merge_theme(
        &self,
        project: &Project,
        theme: &str,
        files: &[(String, PathBuf)],
        missing: &mut Vec<MissingArtifactWarning>,
    ) -> Result<ThemeOutput, BuildError> {
        let mut output = ThemeOutput::default();
        let mut css = String::new();
        let mut bundled = String::new();

        for (package, file) in files {
            if !file.is_file() {
                let warning = MissingArtifactWarning {
                    package: package.clone(),
                    theme: theme.to_string(),
                    path: file.clone(),
                };
                tracing::warn!("{warning}");
                missing.push(warning);
                continue;
            }
            css.push_str(&read(project, file)?);
            output.sources.push(file.clone());

            let bundled_file = bundled_sibling(file);
            if bundled_file.is_file() {
                bundled.push_str(&read(project, &bundled_file)?);
            }
        }

        let theme_dir = project.theme_output_dir(theme);
        if !css.is_empty() {
            let path = theme_dir.join(format!("{theme}.final.css"));
            filesystem::write_file(&path, &css).map_err(|e| BuildError::fs(project.name(), e))?;
            output.final_css = Some(path);
        }
        if !bundled.is_empty() {
            let path = theme_dir.join(format!("{theme}.bundled.final.css"));
            filesystem::write_file(&path, &bundled)
                .map_err(|e| BuildError::fs(project.name(), e))?;
            output.bundled_css = Some(path);
        }
        Ok(output)
    }

    fn copy_ui_assets(
        &self,
        ui: &Project,
        target: &Project,
        report: &mut AggregateReport,
    ) -> Result<(), BuildError> {
        let fonts = PathBuf::from("themes").join("default").join("fonts");
        let icons = PathBuf::from("material-symbols");

        for relative in [fonts, icons] {
            let from = ui.dist_dir().join(&relative);
            if !from.is_dir() {
                tracing::warn!(
                    "{} assets not found at {}, skipping copy",
                    ui.name(),
                    from.display()
                );
                continue;
            }
            let to = target.dist_dir().join(&relative);
            filesystem::copy_dir_all(&from, &to)
                .map_err(|e| BuildError::fs(target.name(), e))?;
            report.copied_assets.push(to);
        }
        Ok(())
    }
}

fn read(project: &Project, path: &std::path::Path) -> Result<String, BuildError> {
    filesystem::read_file(path).map_err(|e| BuildError::fs(project.name(), e))
}

/// `x.min.css` -> `x.bundled.css`
fn bundled_sibling(min_file: &std::path::Path) -> PathBuf {
    let name = min_file
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .replace(".min.css", ".bundled.css");
    min_file.with_file_name(name)
}
