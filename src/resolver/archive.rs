// src/resolver/archive.rs

//! Archive naming for sibling packages
//!
//! The expected archive of a sibling lives in the sibling's own directory and
//! is named from the package name with every `@` and `/` removed, followed by
//! `-<version>.<extension>`.

use std::path::{Path, PathBuf};

/// File name of the archive for `name` at `version`
pub fn archive_file_name(name: &str, version: &str, extension: &str) -> String {
    let stem: String = name.chars().filter(|c| !matches!(c, '@' | '/')).collect();
    format!("{}-{}.{}", stem, version, extension)
}

/// Full path of the archive inside the package directory
pub fn archive_path(package_dir: &Path, name: &str, version: &str, extension: &str) -> PathBuf {
    package_dir.join(archive_file_name(name, version, extension))
}
