// tests/common/mod.rs

//! Shared test utilities: temporary monorepo layouts and a recording
//! package manager.

#![allow(dead_code)]

use depbind::{Error, PackageManager, Result};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A monorepo on disk: `<root>/apps/web` is the project, siblings live
/// anywhere under `<root>`.
///
/// Keep the value alive for the duration of the test to prevent cleanup.
pub struct Workspace {
    _temp: TempDir,
    pub root: PathBuf,
    pub project: PathBuf,
}

impl Workspace {
    /// Create a workspace whose project declares `dependencies`
    pub fn new(dependencies: &[(&str, &str)]) -> Self {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path().canonicalize().unwrap();
        let project = root.join("apps").join("web");
        write_manifest(&project, "web", "0.1.0", dependencies, &[]);
        Self {
            _temp: temp,
            root,
            project,
        }
    }

    /// Add a sibling package at `<root>/<rel>`; returns its directory
    pub fn sibling(&self, rel: &str, name: &str, version: &str, deps: &[(&str, &str)]) -> PathBuf {
        let dir = self.root.join(rel);
        write_manifest(&dir, name, version, deps, &[]);
        dir
    }

    /// Add an already materialized package to the project's cache
    pub fn cached(&self, name: &str, version: &str) -> PathBuf {
        let dir = self.project.join("node_modules").join(name);
        write_manifest(&dir, name, version, &[], &[]);
        dir
    }
}

/// Write a `package.json` into `dir`
pub fn write_manifest(
    dir: &Path,
    name: &str,
    version: &str,
    dependencies: &[(&str, &str)],
    dev_dependencies: &[(&str, &str)],
) {
    let to_map = |pairs: &[(&str, &str)]| -> serde_json::Map<String, serde_json::Value> {
        pairs
            .iter()
            .map(|(n, r)| (n.to_string(), serde_json::Value::String(r.to_string())))
            .collect()
    };
    let manifest = serde_json::json!({
        "name": name,
        "version": version,
        "dependencies": to_map(dependencies),
        "devDependencies": to_map(dev_dependencies),
    });
    fs::create_dir_all(dir).unwrap();
    fs::write(
        dir.join("package.json"),
        serde_json::to_string_pretty(&manifest).unwrap(),
    )
    .unwrap();
}

/// Operation recorded by [`RecordingManager`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    View(String),
    Install(String),
    Pack(PathBuf),
    InstallArchive(PathBuf),
    CleanInstall,
}

/// Package manager double backed by an in-memory registry
#[derive(Default)]
pub struct RecordingManager {
    registry: BTreeMap<String, Vec<String>>,
    calls: RefCell<Vec<Call>>,
}

impl RecordingManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(mut self, name: &str, versions: &[&str]) -> Self {
        self.registry.insert(
            name.to_string(),
            versions.iter().map(|v| v.to_string()).collect(),
        );
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }
}

impl PackageManager for RecordingManager {
    fn published_versions(&self, name: &str) -> Result<Vec<String>> {
        self.record(Call::View(name.to_string()));
        self.registry
            .get(name)
            .cloned()
            .ok_or_else(|| Error::CommandFailed {
                command: format!("npm view {} versions --json", name),
                code: Some(1),
                stderr: "npm ERR! code E404".to_string(),
            })
    }

    fn install_from_registry(&self, name: &str, range: &str) -> Result<()> {
        self.record(Call::Install(format!("{}@{}", name, range)));
        Ok(())
    }

    fn pack(&self, _label: &str, package_dir: &Path) -> Result<Option<String>> {
        self.record(Call::Pack(package_dir.to_path_buf()));
        Ok(None)
    }

    fn install_archive(&self, _label: &str, archive: &Path) -> Result<()> {
        self.record(Call::InstallArchive(archive.to_path_buf()));
        Ok(())
    }

    fn clean_install(&self) -> Result<()> {
        self.record(Call::CleanInstall);
        Ok(())
    }
}
