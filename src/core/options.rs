//! Build options
//!
//! Options are plain values threaded through every call of a build. A dependency
//! build receives a derived copy from [`BuildOptions::for_dependency`]; nothing is
//! communicated through process-wide state.

use std::collections::BTreeSet;
use std::convert::Infallible;
use std::str::FromStr;

/// Set of package names to leave out of a build
///
/// Accepts either a list or comma-delimited strings; entries are trimmed and
/// blanks dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Exceptions(BTreeSet<String>);

impl Exceptions {
    /// Empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `name` is excepted
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    /// Add a name
    pub fn insert(&mut self, name: impl Into<String>) {
        self.0.insert(name.into());
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the names in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl FromStr for Exceptions {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(std::iter::once(s).collect())
    }
}

impl<S: AsRef<str>> FromIterator<S> for Exceptions {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .flat_map(|item| split_list(item.as_ref()))
                .collect(),
        )
    }
}

/// Split a comma-delimited list, trimming entries and dropping blanks
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Options for a single package build
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Dependency-mode build: no sub-dependencies, types, i18n, watch or explorer
    pub slim: bool,
    /// Keep rebuilding on source changes
    pub watch: bool,
    /// Minify stylesheets
    pub minify: bool,
    /// Serialize independent builds instead of running them concurrently
    pub sequential: bool,
    /// Forward full tool output
    pub verbose: bool,
    /// Packages to skip
    pub exceptions: Exceptions,
    /// Package that requested this build as one of its dependencies
    pub parent: Option<String>,
    /// Whether this is a dependency build
    pub is_dependency: bool,
    /// Extra dependency bundles to include in a fat build
    pub deps: Vec<String>,
    /// Extra stylesheet globs
    pub style_patterns: Vec<String>,
    /// Component explorer port to launch after a fat build
    pub storybook: Option<u16>,
}

impl BuildOptions {
    /// Options for building a dependency of `parent`
    ///
    /// Forces slim mode and drops everything that only applies to the primary target.
    pub fn for_dependency(&self, parent: &str) -> Self {
        Self {
            slim: true,
            watch: self.watch,
            minify: self.minify,
            sequential: true,
            verbose: self.verbose,
            exceptions: self.exceptions.clone(),
            parent: Some(parent.to_string()),
            is_dependency: true,
            deps: Vec::new(),
            style_patterns: Vec::new(),
            storybook: None,
        }
    }

    /// Human readable mode label for logs
    pub fn mode(&self) -> &'static str {
        if self.slim {
            "slim"
        } else {
            "fat"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exceptions_from_delimited_string() {
        let exceptions: Exceptions = "b, c,,d ".parse().unwrap();
        assert!(exceptions.contains("b"));
        assert!(exceptions.contains("c"));
        assert!(exceptions.contains("d"));
        assert!(!exceptions.contains(""));
        assert_eq!(exceptions.iter().count(), 3);
    }

    #[test]
    fn test_exceptions_from_list() {
        let exceptions: Exceptions = vec!["ui", "lists,form"].into_iter().collect();
        assert_eq!(exceptions.iter().collect::<Vec<_>>(), vec!["form", "lists", "ui"]);
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list("a, b ,c"), vec!["a", "b", "c"]);
        assert!(split_list("").is_empty());
    }

    #[test]
    fn test_for_dependency_forces_slim() {
        let options = BuildOptions {
            watch: true,
            minify: true,
            verbose: true,
            deps: vec!["ui".to_string()],
            style_patterns: vec!["extra/**/*.css".to_string()],
            storybook: Some(6006),
            ..BuildOptions::default()
        };

        let dep = options.for_dependency("lists");
        assert!(dep.slim);
        assert!(dep.is_dependency);
        assert!(dep.minify);
        assert!(dep.verbose);
        assert_eq!(dep.parent.as_deref(), Some("lists"));
        assert!(dep.deps.is_empty());
        assert!(dep.style_patterns.is_empty());
        assert_eq!(dep.storybook, None);
        assert_eq!(dep.mode(), "slim");
        assert_eq!(options.mode(), "fat");
    }
}
