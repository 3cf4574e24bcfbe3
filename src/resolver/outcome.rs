// src/resolver/outcome.rs

//! Resolution result types

use crate::manifest::Requirements;
use thiserror::Error;

/// Why a single requirement could not be bound
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// No source offers a satisfying version
    #[error("{name}@{range} is not found")]
    NotFound { name: String, range: String },

    /// A source matched but packing or installing failed
    #[error("{name}@{range} could not be bound: {reason}")]
    BindFailed {
        name: String,
        range: String,
        reason: String,
    },
}

impl ResolveError {
    pub fn name(&self) -> &str {
        match self {
            Self::NotFound { name, .. } | Self::BindFailed { name, .. } => name,
        }
    }
}

/// Accumulated result of one or more resolution passes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionOutcome {
    /// One entry per requirement that could not be bound
    pub errors: Vec<ResolveError>,
    /// Whether anything was installed
    pub changed: bool,
}

impl ResolutionOutcome {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Fold a later outcome into this one
    pub fn absorb(&mut self, other: ResolutionOutcome) {
        self.errors.extend(other.errors);
        self.changed |= other.changed;
    }
}

/// Result of a single pass over a requirement mapping
#[derive(Debug, Clone, Default)]
pub struct PassResult {
    pub outcome: ResolutionOutcome,
    /// Requirements introduced by siblings bound during the pass
    pub next: Requirements,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = ResolveError::NotFound {
            name: "missing-pkg".to_string(),
            range: "^2.0.0".to_string(),
        };
        assert_eq!(err.to_string(), "missing-pkg@^2.0.0 is not found");
        assert_eq!(err.name(), "missing-pkg");
    }

    #[test]
    fn test_absorb() {
        let mut total = ResolutionOutcome::default();
        assert!(total.is_success());
        total.absorb(ResolutionOutcome {
            errors: vec![],
            changed: true,
        });
        total.absorb(ResolutionOutcome {
            errors: vec![ResolveError::NotFound {
                name: "x".to_string(),
                range: "*".to_string(),
            }],
            changed: false,
        });
        assert!(total.changed);
        assert_eq!(total.errors.len(), 1);
        assert!(!total.is_success());
    }
}
