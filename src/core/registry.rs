//! Package dependency resolution
//!
//! Extracts the namespace-scoped peer dependencies of a manifest and orders them
//! against a priority list.

use std::collections::HashSet;

use crate::core::manifest::Manifest;

/// Resolves inter-package dependencies within one npm scope
#[derive(Debug, Clone)]
pub struct PackageRegistry {
    /// Scope prefix including the trailing slash, e.g. `@arpadroid/`
    prefix: String,
}

impl PackageRegistry {
    /// Create a registry for the given scope prefix
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Scope prefix including the trailing slash
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Strip the scope prefix from a full package name
    ///
    /// Returns `None` for names outside the scope.
    pub fn strip_namespace<'a>(&self, full_name: &'a str) -> Option<&'a str> {
        full_name
            .strip_prefix(self.prefix.as_str())
            .filter(|name| !name.is_empty())
    }

    /// Namespace peer dependencies of `manifest`, prefix stripped, in manifest order
    pub fn namespace_packages(&self, manifest: &Manifest) -> Vec<String> {
        let mut seen = HashSet::new();
        manifest
            .peer_dependency_names()
            .filter_map(|name| self.strip_namespace(name))
            .filter(|name| seen.insert(*name))
            .map(str::to_string)
            .collect()
    }

    /// Resolve the ordered dependency list of `manifest`
    ///
    /// With a non-empty `sort_order`, names listed there come first in list order,
    /// followed by the remaining names in manifest order.
    pub fn resolve_dependencies(&self, manifest: &Manifest, sort_order: &[String]) -> Vec<String> {
        let packages = self.namespace_packages(manifest);
        sort_by_priority(packages, sort_order, |name| name.as_str())
    }
}

/// Order `items` by a priority list
///
/// Items whose key appears in `order` are emitted first, in `order`'s order; every
/// other item follows in its original relative order. An empty `order` leaves the
/// input untouched. Each item is emitted at most once.
pub fn sort_by_priority<T, F>(items: Vec<T>, order: &[String], key: F) -> Vec<T>
where
    F: Fn(&T) -> &str,
{
    if order.is_empty() {
        return items;
    }

    let mut remaining: Vec<Option<T>> = items.into_iter().map(Some).collect();
    let mut sorted = Vec::with_capacity(remaining.len());

    for wanted in order {
        let position = remaining
            .iter()
            .position(|slot| slot.as_ref().is_some_and(|item| key(item) == wanted.as_str()));
        if let Some(item) = position.and_then(|i| remaining[i].take()) {
            sorted.push(item);
        }
    }

    sorted.extend(remaining.into_iter().flatten());
    sorted
}
