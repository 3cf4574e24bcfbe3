// src/resolver/mod.rs

//! Dependency binding
//!
//! Resolves a requirement mapping against the materialized cache, the
//! registry and the sibling workspace, installing whatever is missing.
//! Per-requirement failures are collected in a [`ResolutionOutcome`] rather
//! than returned as errors.

mod archive;
mod engine;
mod outcome;

pub use archive::{archive_file_name, archive_path};
pub use engine::Resolver;
pub use outcome::{PassResult, ResolutionOutcome, ResolveError};
