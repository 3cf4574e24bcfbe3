// src/error.rs

//! Error types for depbind
//!
//! Fatal conditions (unreadable manifests, failed index scans, a shell that
//! cannot be spawned) are `Error`s. Per-dependency failures are collected as
//! [`crate::resolver::ResolveError`] values instead, so one missing package
//! does not hide the others.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a bind run
#[derive(Error, Debug)]
pub enum Error {
    /// Package descriptor could not be read
    #[error("Failed to read manifest '{}': {source}", .path.display())]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Package descriptor is not valid JSON
    #[error("Failed to parse manifest '{}': {source}", .path.display())]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Package descriptor is missing a required field
    #[error("Manifest '{}' is missing required field '{field}'", .path.display())]
    ManifestSchema { path: PathBuf, field: &'static str },

    /// Directory tree could not be indexed
    #[error("Failed to scan packages under '{}': {reason}", .path.display())]
    IndexScan { path: PathBuf, reason: String },

    /// The shell for an external command could not be started
    #[error("Failed to run '{command}': {source}")]
    CommandSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// An external command exited unsuccessfully
    #[error("'{command}' failed with exit code {}: {stderr}", .code.map_or_else(|| "none".to_string(), |c| c.to_string()))]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// Registry version query returned something other than version strings
    #[error("Unexpected registry response for '{name}': {reason}")]
    RegistryResponse { name: String, reason: String },

    /// Configuration file could not be loaded
    #[error("Failed to load config '{}': {reason}", .path.display())]
    Config { path: PathBuf, reason: String },
}

/// Result type alias using depbind's Error
pub type Result<T> = std::result::Result<T, Error>;
