// src/manifest.rs

//! Package descriptor (`package.json`) reading
//!
//! Only the fields the resolver needs are read: `name`, `version`,
//! `dependencies` and `devDependencies`. Everything else in the file is
//! ignored.

use crate::error::{Error, Result};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// Requirement mapping: dependency name to version-range expression
pub type Requirements = BTreeMap<String, String>;

/// Which dependency set wins when a name appears in both
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precedence {
    /// `devDependencies` overrides `dependencies`
    #[default]
    Development,
    /// `dependencies` overrides `devDependencies`
    Runtime,
}

/// State of a dependency field in a descriptor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DependencyField {
    /// Field not present (or `null`)
    #[default]
    Absent,
    /// Well-formed name -> range object
    Declared(Requirements),
    /// Present but not an object of strings
    Malformed,
}

impl DependencyField {
    fn from_value(value: Option<Value>) -> Self {
        match value {
            None | Some(Value::Null) => Self::Absent,
            Some(Value::Object(map)) => {
                let mut requirements = Requirements::new();
                for (name, range) in map {
                    match range {
                        Value::String(range) => {
                            requirements.insert(name, range);
                        }
                        _ => return Self::Malformed,
                    }
                }
                Self::Declared(requirements)
            }
            Some(_) => Self::Malformed,
        }
    }

    fn entries(&self) -> impl Iterator<Item = (&String, &String)> {
        let map = match self {
            Self::Declared(map) => Some(map),
            _ => None,
        };
        map.into_iter().flatten()
    }
}

#[derive(Deserialize)]
struct RawManifest {
    name: Option<String>,
    version: Option<String>,
    dependencies: Option<Value>,
    #[serde(rename = "devDependencies")]
    dev_dependencies: Option<Value>,
}

/// A parsed package descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub name: String,
    pub version: String,
    pub dependencies: DependencyField,
    pub dev_dependencies: DependencyField,
}

impl Manifest {
    /// Read and parse a descriptor file
    pub fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::ManifestRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    /// Parse descriptor text; `path` is only used in error messages
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let raw: RawManifest =
            serde_json::from_str(content).map_err(|source| Error::ManifestParse {
                path: path.to_path_buf(),
                source,
            })?;

        let name = raw.name.ok_or_else(|| Error::ManifestSchema {
            path: path.to_path_buf(),
            field: "name",
        })?;
        let version = raw.version.ok_or_else(|| Error::ManifestSchema {
            path: path.to_path_buf(),
            field: "version",
        })?;

        Ok(Self {
            name,
            version,
            dependencies: DependencyField::from_value(raw.dependencies),
            dev_dependencies: DependencyField::from_value(raw.dev_dependencies),
        })
    }

    /// Merge runtime and development dependencies into one mapping
    ///
    /// Returns `None` when either field is present but malformed.
    pub fn requirements(&self, precedence: Precedence) -> Option<Requirements> {
        if self.dependencies == DependencyField::Malformed
            || self.dev_dependencies == DependencyField::Malformed
        {
            return None;
        }

        let (low, high) = match precedence {
            Precedence::Development => (&self.dependencies, &self.dev_dependencies),
            Precedence::Runtime => (&self.dev_dependencies, &self.dependencies),
        };

        let mut merged = Requirements::new();
        for (name, range) in low.entries().chain(high.entries()) {
            merged.insert(name.clone(), range.clone());
        }
        Some(merged)
    }
}
