// src/config.rs

//! Bind configuration
//!
//! All settings are optional. A project may carry a `depbind.toml` next to
//! its manifest to override them:
//!
//! ```toml
//! package_manager = "npm"
//! cache_dir = "node_modules"
//! workspace_levels = 2
//! archive_extension = "tgz"
//! precedence = "runtime"
//! ```

use crate::error::{Error, Result};
use crate::manifest::Precedence;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Config file looked up in the project root when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "depbind.toml";

/// Settings for one bind run
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BindConfig {
    /// Program invoked for registry queries, installs and packing
    pub package_manager: String,
    /// Package descriptor file name
    pub manifest_file: String,
    /// Materialized cache directory, relative to the project root
    pub cache_dir: String,
    /// Number of directory levels above the project where siblings live
    pub workspace_levels: usize,
    /// Suffix of archives produced by the pack operation
    pub archive_extension: String,
    /// Which dependency set wins when a name is declared in both
    pub precedence: Precedence,
    /// Skip every mutating operation (not settable from the file)
    #[serde(skip)]
    pub dry_run: bool,
}

impl Default for BindConfig {
    fn default() -> Self {
        Self {
            package_manager: "npm".to_string(),
            manifest_file: "package.json".to_string(),
            cache_dir: "node_modules".to_string(),
            workspace_levels: 2,
            archive_extension: "tgz".to_string(),
            precedence: Precedence::default(),
            dry_run: false,
        }
    }
}

impl BindConfig {
    /// Parse a config from TOML text
    pub fn from_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Load the config for a project
    ///
    /// An explicit path must exist. Without one, `depbind.toml` in the
    /// project root is used if present, otherwise the defaults.
    pub fn load(project_dir: &Path, explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let candidate = project_dir.join(DEFAULT_CONFIG_FILE);
                if !candidate.is_file() {
                    return Ok(Self::default());
                }
                candidate
            }
        };

        let content = std::fs::read_to_string(&path).map_err(|e| Error::Config {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&content, &path)
    }

    /// Root of the sibling workspace for a project
    pub fn workspace_root(&self, project_dir: &Path) -> PathBuf {
        let mut root = project_dir.to_path_buf();
        for _ in 0..self.workspace_levels {
            root.push("..");
        }
        root
    }

    /// Materialized cache directory for a project
    pub fn cache_root(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.cache_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BindConfig::default();
        assert_eq!(config.package_manager, "npm");
        assert_eq!(config.cache_dir, "node_modules");
        assert_eq!(config.workspace_levels, 2);
        assert_eq!(config.precedence, Precedence::Development);
        assert!(!config.dry_run);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = BindConfig::from_toml(
            "package_manager = \"pnpm\"\nprecedence = \"runtime\"\n",
            Path::new("depbind.toml"),
        )
        .unwrap();
        assert_eq!(config.package_manager, "pnpm");
        assert_eq!(config.precedence, Precedence::Runtime);
        assert_eq!(config.archive_extension, "tgz");
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result = BindConfig::from_toml("registry = \"x\"\n", Path::new("depbind.toml"));
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = BindConfig::load(dir.path(), None).unwrap();
        assert_eq!(config, BindConfig::default());
    }

    #[test]
    fn test_load_from_project_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "workspace_levels = 1\n").unwrap();
        let config = BindConfig::load(dir.path(), None).unwrap();
        assert_eq!(config.workspace_levels, 1);
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(BindConfig::load(dir.path(), Some(&missing)).is_err());
    }

    #[test]
    fn test_roots() {
        let config = BindConfig::default();
        let project = Path::new("/work/group/app");
        assert_eq!(config.workspace_root(project), Path::new("/work/group/app/../.."));
        assert_eq!(config.cache_root(project), Path::new("/work/group/app/node_modules"));
    }
}
