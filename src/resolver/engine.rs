// src/resolver/engine.rs

//! Fallback resolution engine
//!
//! Each requirement is tried against the sources in a fixed order:
//! 1. the materialized cache (or a binding made earlier in this run)
//! 2. the registry
//! 3. a sibling package built from source
//!
//! Binding a sibling enqueues the sibling's own requirements for the next
//! pass; passes repeat until nothing new is enqueued.

use crate::index::{PackageIndex, VersionLocation};
use crate::manifest::Requirements;
use crate::package_manager::PackageManager;
use crate::version::VersionRange;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

use super::archive::archive_path;
use super::outcome::{PassResult, ResolutionOutcome, ResolveError};

/// How a requirement ended up bound
#[derive(Debug, Clone, PartialEq, Eq)]
enum Binding {
    /// Already present, nothing done
    Satisfied,
    /// Installed from the registry
    Registry,
    /// Installed from a sibling archive; carries requirements to enqueue
    Sibling(Requirements),
}

/// Dependency resolver over a cache snapshot and a sibling snapshot
pub struct Resolver<'a, P: PackageManager> {
    manager: &'a P,
    cache: &'a PackageIndex,
    siblings: &'a PackageIndex,
    archive_extension: String,
    /// Versions bound during this run; supersede the cache snapshot
    bound: BTreeMap<String, String>,
    /// Siblings whose requirements were already enqueued
    expanded: BTreeSet<String>,
}

impl<'a, P: PackageManager> Resolver<'a, P> {
    pub fn new(manager: &'a P, cache: &'a PackageIndex, siblings: &'a PackageIndex) -> Self {
        Self {
            manager,
            cache,
            siblings,
            archive_extension: "tgz".to_string(),
            bound: BTreeMap::new(),
            expanded: BTreeSet::new(),
        }
    }

    /// Set the extension used for sibling archive names
    pub fn with_archive_extension(mut self, extension: impl Into<String>) -> Self {
        self.archive_extension = extension.into();
        self
    }

    /// Resolve `requirements` and everything siblings pull in
    pub fn resolve(&mut self, requirements: Requirements) -> ResolutionOutcome {
        let mut outcome = ResolutionOutcome::default();
        let mut pending = requirements;
        let mut pass = 0;

        while !pending.is_empty() {
            pass += 1;
            debug!("Resolution pass {} ({} requirement(s))", pass, pending.len());
            let result = self.resolve_pass(&pending);
            outcome.absorb(result.outcome);
            pending = result.next;
        }

        outcome
    }

    /// Run a single pass over `requirements`
    pub fn resolve_pass(&mut self, requirements: &Requirements) -> PassResult {
        let mut result = PassResult::default();

        for (name, range) in requirements {
            match self.resolve_one(name, range) {
                Ok(Binding::Satisfied) => {}
                Ok(Binding::Registry) => result.outcome.changed = true,
                Ok(Binding::Sibling(requirements)) => {
                    result.outcome.changed = true;
                    result.next.extend(requirements);
                }
                Err(e) => {
                    error!("{}", e);
                    result.outcome.errors.push(e);
                }
            }
        }

        result
    }

    /// Version currently bound for `name`, if any
    pub fn bound_version(&self, name: &str) -> Option<&str> {
        self.bound
            .get(name)
            .map(String::as_str)
            .or_else(|| self.cache.get(name).map(|loc| loc.version.as_str()))
    }

    fn resolve_one(&mut self, name: &str, range: &str) -> Result<Binding, ResolveError> {
        let parsed = match VersionRange::parse(range) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("{}", e);
                return Err(not_found(name, range));
            }
        };

        if self
            .bound_version(name)
            .is_some_and(|version| parsed.satisfies(version))
        {
            debug!("{}@{} already satisfied", name, range);
            return Ok(Binding::Satisfied);
        }

        if let Some(version) = self.registry_match(name, &parsed) {
            self.manager
                .install_from_registry(name, range)
                .map_err(|e| bind_failed(name, range, e))?;
            self.bound.insert(name.to_string(), version);
            return Ok(Binding::Registry);
        }

        let siblings = self.siblings;
        match siblings.get(name) {
            Some(local) if parsed.satisfies(&local.version) => self.bind_sibling(name, range, local),
            _ => Err(not_found(name, range)),
        }
    }

    /// Highest published version satisfying the range
    fn registry_match(&self, name: &str, range: &VersionRange) -> Option<String> {
        match self.manager.published_versions(name) {
            Ok(versions) => {
                let best = range.best_match(versions.iter().map(String::as_str));
                match &best {
                    Some(version) => debug!("{}@{} matches published {}", name, range, version),
                    None => debug!("No published {} satisfies {}", name, range),
                }
                best.map(|v| v.to_string())
            }
            Err(e) => {
                warn!("Registry lookup for {} failed: {}", name, e);
                None
            }
        }
    }

    fn bind_sibling(
        &mut self,
        name: &str,
        range: &str,
        local: &VersionLocation,
    ) -> Result<Binding, ResolveError> {
        let label = format!("{}@{}", name, range);
        let archive = self.ensure_archive(name, range, local)?;

        self.manager
            .install_archive(&label, &archive)
            .map_err(|e| bind_failed(name, range, e))?;
        self.bound.insert(name.to_string(), local.version.clone());

        if !self.expanded.insert(name.to_string()) {
            info!("{} rebound; its requirements were already queued", label);
            return Ok(Binding::Sibling(Requirements::new()));
        }
        Ok(Binding::Sibling(local.dependencies.clone()))
    }

    /// Locate the sibling's archive, packing it first if it is missing
    fn ensure_archive(
        &self,
        name: &str,
        range: &str,
        local: &VersionLocation,
    ) -> Result<PathBuf, ResolveError> {
        let expected = archive_path(
            &local.location,
            name,
            &local.version,
            &self.archive_extension,
        );
        if expected.exists() {
            debug!("Reusing archive {}", expected.display());
            return Ok(expected);
        }

        let label = format!("{}@{}", name, range);
        let reported = self
            .manager
            .pack(&label, &local.location)
            .map_err(|e| bind_failed(name, range, e))?;

        if !expected.exists()
            && let Some(file) = reported
        {
            let candidate = local.location.join(file);
            if candidate.is_file() {
                debug!("Using reported archive {}", candidate.display());
                return Ok(candidate);
            }
        }

        Ok(expected)
    }
}

fn not_found(name: &str, range: &str) -> ResolveError {
    ResolveError::NotFound {
        name: name.to_string(),
        range: range.to_string(),
    }
}

fn bind_failed(name: &str, range: &str, reason: impl ToString) -> ResolveError {
    ResolveError::BindFailed {
        name: name.to_string(),
        range: range.to_string(),
        reason: reason.to_string(),
    }
}
