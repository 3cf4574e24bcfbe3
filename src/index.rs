// src/index.rs

//! Package indexing
//!
//! Scans a directory tree for package descriptors and builds a name-keyed
//! snapshot of what was found. Used twice per run: once for the
//! materialized cache (`node_modules`) and once for the sibling workspace.
//!
//! The walk is depth-first and sorted by file name. A directory that holds a
//! valid descriptor is a package root: it is recorded and never descended
//! into, so packages nested inside other packages are not visited.
//!
//! A descriptor without a `name` or `version` (bundler output such as
//! `node_modules/.vite/deps`, private workspace apps) does not make its
//! directory a package; the walk continues below it. Unparseable
//! descriptors still abort the scan.

use crate::error::{Error, Result};
use crate::manifest::{Manifest, Precedence, Requirements};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Where a package lives and what it declares
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionLocation {
    /// Concrete version from the descriptor
    pub version: String,
    /// Package root directory
    pub location: PathBuf,
    /// Merged requirements (empty unless dependencies were requested)
    pub dependencies: Requirements,
}

/// What to read while scanning
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Descriptor file name looked up in each directory
    pub manifest_file: String,
    /// Record each package's merged requirements
    pub with_dependencies: bool,
    /// Merge policy for the recorded requirements
    pub precedence: Precedence,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            manifest_file: "package.json".to_string(),
            with_dependencies: false,
            precedence: Precedence::default(),
        }
    }
}

impl ScanOptions {
    pub fn with_dependencies(mut self, with_dependencies: bool) -> Self {
        self.with_dependencies = with_dependencies;
        self
    }
}

/// Lazy depth-first scan yielding `(name, VersionLocation)` pairs
///
/// The first error ends the scan; no partial results follow it.
pub struct PackageScan {
    walker: walkdir::IntoIter,
    root: PathBuf,
    options: ScanOptions,
    failed: bool,
}

impl PackageScan {
    /// Start scanning below `root` (the root itself is never a package)
    pub fn new(root: &Path, options: ScanOptions) -> Result<Self> {
        let root = root.canonicalize().map_err(|e| Error::IndexScan {
            path: root.to_path_buf(),
            reason: e.to_string(),
        })?;
        if !root.is_dir() {
            return Err(Error::IndexScan {
                path: root,
                reason: "not a directory".to_string(),
            });
        }

        let walker = WalkDir::new(&root)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();

        Ok(Self {
            walker,
            root,
            options,
            failed: false,
        })
    }

    /// Read the descriptor in `dir`; `None` if it does not describe a package
    fn record(&self, dir: &Path, descriptor: &Path) -> Result<Option<(String, VersionLocation)>> {
        let manifest = match Manifest::read(descriptor) {
            Ok(manifest) => manifest,
            Err(Error::ManifestSchema { field, .. }) => {
                warn!(
                    "Skipping {} (no '{}'), scanning below it",
                    descriptor.display(),
                    field
                );
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let dependencies = if self.options.with_dependencies {
            manifest
                .requirements(self.options.precedence)
                .unwrap_or_else(|| {
                    warn!(
                        "Ignoring malformed dependencies in {}",
                        descriptor.display()
                    );
                    Requirements::new()
                })
        } else {
            Requirements::new()
        };

        Ok(Some((
            manifest.name,
            VersionLocation {
                version: manifest.version,
                location: dir.to_path_buf(),
                dependencies,
            },
        )))
    }
}

impl Iterator for PackageScan {
    type Item = Result<(String, VersionLocation)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            let entry = match self.walker.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    self.failed = true;
                    let path = e.path().unwrap_or(&self.root).to_path_buf();
                    return Some(Err(Error::IndexScan {
                        path,
                        reason: e.to_string(),
                    }));
                }
            };

            if !entry.file_type().is_dir() {
                continue;
            }

            let descriptor = entry.path().join(&self.options.manifest_file);
            if !descriptor.is_file() {
                continue;
            }

            match self.record(entry.path(), &descriptor) {
                Ok(Some(record)) => {
                    // Package root: do not look inside
                    self.walker.skip_current_dir();
                    return Some(Ok(record));
                }
                Ok(None) => continue,
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

/// Immutable name -> location snapshot of a scanned tree
#[derive(Debug, Clone, Default)]
pub struct PackageIndex {
    packages: BTreeMap<String, VersionLocation>,
}

impl PackageIndex {
    /// Scan `root` and keep the first occurrence of each name
    pub fn build(root: &Path, options: ScanOptions) -> Result<Self> {
        let mut index = Self::default();
        for record in PackageScan::new(root, options)? {
            let (name, location) = record?;
            index.insert_first(name, location);
        }
        debug!("Indexed {} package(s) under {}", index.len(), root.display());
        Ok(index)
    }

    fn insert_first(&mut self, name: String, location: VersionLocation) {
        if let Some(existing) = self.packages.get(&name) {
            warn!(
                "Duplicate package '{}' at {} (keeping {})",
                name,
                location.location.display(),
                existing.location.display()
            );
            return;
        }
        self.packages.insert(name, location);
    }

    pub fn get(&self, name: &str) -> Option<&VersionLocation> {
        self.packages.get(name)
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

}

impl FromIterator<(String, VersionLocation)> for PackageIndex {
    fn from_iter<T: IntoIterator<Item = (String, VersionLocation)>>(iter: T) -> Self {
        let mut index = Self::default();
        for (name, location) in iter {
            index.insert_first(name, location);
        }
        index
    }
}
