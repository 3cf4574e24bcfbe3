// src/app.rs

//! Bind run for one project
//!
//! Reads the project's manifest, indexes the sibling workspace and the
//! materialized cache, resolves to a fixed point and finishes with a clean
//! install when something changed and nothing failed.

use crate::config::BindConfig;
use crate::error::Result;
use crate::index::{PackageIndex, ScanOptions};
use crate::manifest::Manifest;
use crate::package_manager::PackageManager;
use crate::resolver::{ResolutionOutcome, Resolver};
use std::path::Path;
use tracing::{debug, info};

/// What a bind run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub outcome: ResolutionOutcome,
    /// Whether the final clean install ran
    pub clean_installed: bool,
    /// Mutations were only logged; nothing was installed
    pub dry_run: bool,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }

    /// Process exit code: 0 on success, 1 if any requirement failed
    pub fn exit_code(&self) -> i32 {
        if self.is_success() { 0 } else { 1 }
    }
}

/// Bind all dependencies of the project at `project_dir`
///
/// Manifest and index failures abort the run; unresolvable requirements are
/// reported in the returned summary.
pub fn run<P: PackageManager>(
    project_dir: &Path,
    config: &BindConfig,
    manager: &P,
) -> Result<RunSummary> {
    let manifest = Manifest::read(&project_dir.join(&config.manifest_file))?;

    let requirements = match manifest.requirements(config.precedence) {
        Some(requirements) if !requirements.is_empty() => requirements,
        _ => {
            info!("{} has no dependencies to bind", manifest.name);
            return Ok(RunSummary {
                dry_run: manager.is_dry_run(),
                ..RunSummary::default()
            });
        }
    };
    info!(
        "Binding {} dependencies of {}@{}",
        requirements.len(),
        manifest.name,
        manifest.version
    );

    let scan = ScanOptions {
        manifest_file: config.manifest_file.clone(),
        with_dependencies: false,
        precedence: config.precedence,
    };

    let siblings = PackageIndex::build(
        &config.workspace_root(project_dir),
        scan.clone().with_dependencies(true),
    )?;

    let cache_root = config.cache_root(project_dir);
    let cache = if cache_root.exists() {
        PackageIndex::build(&cache_root, scan)?
    } else {
        debug!("No cache at {}, starting empty", cache_root.display());
        PackageIndex::default()
    };

    let mut resolver = Resolver::new(manager, &cache, &siblings)
        .with_archive_extension(config.archive_extension.clone());
    let outcome = resolver.resolve(requirements);

    let mut summary = RunSummary {
        outcome,
        clean_installed: false,
        dry_run: manager.is_dry_run(),
    };

    if summary.is_success() && summary.outcome.changed {
        manager.clean_install()?;
        summary.clean_installed = !summary.dry_run;
    }

    Ok(summary)
}
