//! Package manifest (package.json) parsing
//!
//! Only the parts of `package.json` the orchestrator cares about are modelled:
//! the package name, its scripts and its peer dependencies. Peer dependency
//! order is significant and preserved exactly as written in the file.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::ProjectError;

/// Parsed `package.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Full package name, including scope
    #[serde(default)]
    pub name: Option<String>,

    /// Package version
    #[serde(default)]
    pub version: Option<String>,

    /// npm scripts by name
    #[serde(default)]
    pub scripts: BTreeMap<String, String>,

    /// Peer dependencies, in file order
    #[serde(default)]
    pub peer_dependencies: Map<String, Value>,
}

impl Manifest {
    /// Parse a manifest from JSON text
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Load `package.json` from a project directory
    ///
    /// `name` is only used to attribute errors.
    pub fn load(name: &str, project_dir: &Path) -> Result<Self, ProjectError> {
        let path = project_dir.join("package.json");
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ProjectError::ManifestNotFound {
                    name: name.to_string(),
                    path,
                });
            }
            Err(e) => {
                return Err(ProjectError::ManifestRead {
                    name: name.to_string(),
                    path,
                    error: e.to_string(),
                });
            }
        };

        Self::from_json(&content).map_err(|e| ProjectError::ManifestParse {
            name: name.to_string(),
            error: e.to_string(),
        })
    }

    /// Peer dependency names in file order
    pub fn peer_dependency_names(&self) -> impl Iterator<Item = &str> {
        self.peer_dependencies.keys().map(String::as_str)
    }

    /// Whether the manifest declares a script
    pub fn has_script(&self, name: &str) -> bool {
        self.scripts.contains_key(name)
    }
}
