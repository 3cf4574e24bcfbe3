// src/version.rs

//! npm-style version ranges
//!
//! Ranges are translated into one `semver::VersionReq` per `||` alternative.
//! Supported forms:
//! - `*`, `x`, empty string and `latest` (any version)
//! - bare and partial versions (`1.2.3`, `1.2`, `1.x`), which are exact
//!   matches as in npm rather than caret matches as in Cargo
//! - operators `=`, `>`, `>=`, `<`, `<=`, `^`, `~`, with or without a space
//!   before the version
//! - space-separated comparator sets (`>=1.2.0 <2.0.0`)
//! - hyphen ranges (`1.2.3 - 2.0.0`)
//! - unions (`^1.0.0 || ^2.0.0`)
//!
//! Anything else (git URLs, `file:` paths, dist-tags other than `latest`)
//! is rejected by [`VersionRange::parse`] and never satisfied.

use semver::{Version, VersionReq};
use std::fmt;
use thiserror::Error;

/// Errors from range parsing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RangeParseError {
    #[error("Invalid version range '{range}': {reason}")]
    InvalidRange { range: String, reason: String },
}

/// A parsed range: satisfied when any alternative matches
#[derive(Debug, Clone)]
pub struct VersionRange {
    raw: String,
    alternatives: Vec<VersionReq>,
}

impl VersionRange {
    /// Parse a range expression
    pub fn parse(raw: &str) -> Result<Self, RangeParseError> {
        let alternatives = raw
            .split("||")
            .map(|set| translate_set(set.trim()))
            .map(|set| {
                VersionReq::parse(&set).map_err(|e| RangeParseError::InvalidRange {
                    range: raw.to_string(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            raw: raw.to_string(),
            alternatives,
        })
    }

    /// Check whether a concrete version string satisfies this range
    pub fn satisfies(&self, version: &str) -> bool {
        parse_version(version).is_some_and(|v| self.matches(&v))
    }

    /// Check an already parsed version
    pub fn matches(&self, version: &Version) -> bool {
        self.alternatives.iter().any(|req| req.matches(version))
    }

    /// Highest version from `versions` that satisfies this range
    pub fn best_match<'a, I>(&self, versions: I) -> Option<Version>
    where
        I: IntoIterator<Item = &'a str>,
    {
        versions
            .into_iter()
            .filter_map(parse_version)
            .filter(|v| self.matches(v))
            .max()
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Lenient satisfaction check: an unparseable range or version is unsatisfied
pub fn satisfies(version: &str, range: &str) -> bool {
    VersionRange::parse(range).is_ok_and(|r| r.satisfies(version))
}

/// Parse a concrete version, tolerating a leading `v` or `=`
pub fn parse_version(version: &str) -> Option<Version> {
    let trimmed = version.trim();
    let trimmed = trimmed.strip_prefix('=').unwrap_or(trimmed);
    let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);
    Version::parse(trimmed).ok()
}

const OPERATORS: [&str; 7] = [">=", "<=", ">", "<", "=", "^", "~"];

/// Turn one space-separated npm comparator set into `VersionReq` syntax
fn translate_set(set: &str) -> String {
    if set.is_empty() || set == "latest" {
        return "*".to_string();
    }

    let tokens: Vec<&str> = set.split_whitespace().collect();

    // Hyphen range: "a - b" means ">=a, <=b"
    if tokens.len() == 3 && tokens[1] == "-" {
        return format!(">={}, <={}", strip_v(tokens[0]), strip_v(tokens[2]));
    }

    let mut comparators = Vec::new();
    let mut pending_op: Option<&str> = None;
    for token in tokens {
        if OPERATORS.contains(&token) {
            // Operator separated from its version by whitespace
            pending_op = Some(token);
            continue;
        }
        let comparator = match pending_op.take() {
            Some(op) => format!("{}{}", op, strip_v(token)),
            None => translate_comparator(token),
        };
        comparators.push(comparator);
    }
    if let Some(op) = pending_op {
        // Dangling operator; let VersionReq report it
        comparators.push(op.to_string());
    }

    comparators.join(", ")
}

fn translate_comparator(token: &str) -> String {
    if let Some(op) = OPERATORS.iter().find(|op| token.starts_with(**op)) {
        let rest = &token[op.len()..];
        return format!("{}{}", op, strip_v(rest));
    }

    let version = strip_v(token);
    if is_wildcard(version) {
        version.to_string()
    } else {
        format!("={}", version)
    }
}

fn is_wildcard(version: &str) -> bool {
    version
        .split('.')
        .any(|part| matches!(part, "*" | "x" | "X"))
}

fn strip_v(token: &str) -> &str {
    token.strip_prefix('v').unwrap_or(token)
}
