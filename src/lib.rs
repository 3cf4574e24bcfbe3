// src/lib.rs

//! depbind
//!
//! Makes sure every dependency a project declares (transitively) is present
//! in its local dependency cache before a final clean install runs.
//!
//! # Sources
//!
//! Each requirement is satisfied from the first source that can:
//! - the materialized cache (`node_modules`)
//! - the package registry
//! - a sibling package in the surrounding monorepo, packed into an archive
//!   and installed from it
//!
//! Siblings bring their own requirements, which are resolved in a further
//! pass until no new requirements appear.

pub mod app;
pub mod command;
pub mod config;
mod error;
pub mod index;
pub mod manifest;
pub mod package_manager;
pub mod resolver;
pub mod version;

pub use app::{run, RunSummary};
pub use command::{CommandOutput, CommandRunner, ShellRunner};
pub use config::BindConfig;
pub use error::{Error, Result};
pub use index::{PackageIndex, PackageScan, ScanOptions, VersionLocation};
pub use manifest::{Manifest, Precedence, Requirements};
pub use package_manager::{NpmClient, PackageManager};
pub use resolver::{ResolutionOutcome, ResolveError, Resolver};
pub use version::VersionRange;
