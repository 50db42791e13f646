//! Core data models for the harvester

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel version stored when the resolver cannot determine one.
pub const UNKNOWN_VERSION: &str = "unknown";

/// Namespace prefix the resolver puts on every attribute name.
const ATTR_PREFIX: &str = "nixpkgs.";

/// Reference to one commit in the upstream nixpkgs history.
///
/// Produced by a commit source, consumed read-only by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRef {
    /// Full commit SHA
    pub sha: String,

    /// Commit timestamp (Unix epoch), when the source knows it
    pub timestamp: Option<u64>,
}

impl CommitRef {
    pub fn new(sha: impl Into<String>) -> Self {
        Self {
            sha: sha.into(),
            timestamp: None,
        }
    }

    pub fn with_timestamp(sha: impl Into<String>, timestamp: u64) -> Self {
        Self {
            sha: sha.into(),
            timestamp: Some(timestamp),
        }
    }

    /// Abbreviated SHA for log lines
    pub fn short(&self) -> &str {
        &self.sha[..self.sha.len().min(12)]
    }
}

impl fmt::Display for CommitRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sha)
    }
}

/// One package listed by the resolver at a given commit.
///
/// No uniqueness is enforced: the same name/version pair may recur across
/// commits, and a single commit's listing is kept verbatim as the resolver
/// emitted it, duplicates included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRecord {
    /// Attribute name with the `nixpkgs.` prefix stripped
    pub name: String,

    /// Package version, or [`UNKNOWN_VERSION`] when the resolver had none
    pub version: String,
}

impl PackageRecord {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// Builds a record from one entry of the resolver's attribute map.
    ///
    /// Strips the `nixpkgs.` namespace prefix from the raw attribute name and
    /// falls back to [`UNKNOWN_VERSION`] when the `version` attribute is
    /// absent or not a string. A malformed entry therefore never fails the
    /// rest of the commit's listing.
    pub fn from_resolver_entry(raw_name: &str, attrs: &serde_json::Value) -> Self {
        let name = raw_name.strip_prefix(ATTR_PREFIX).unwrap_or(raw_name);
        let version = attrs
            .get("version")
            .and_then(|v| v.as_str())
            .unwrap_or(UNKNOWN_VERSION);
        Self::new(name, version)
    }
}

impl fmt::Display for PackageRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.version)
    }
}

/// Export-only view of one processed commit, written as a single JSON line.
///
/// Each record is an independent unit; consumers must not assume any
/// cross-record ordering or framing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitData {
    pub sha: String,

    /// Commit timestamp (Unix epoch), if known
    pub date: Option<u64>,

    pub packages: Vec<PackageRecord>,
}

impl CommitData {
    pub fn new(commit: &CommitRef, packages: Vec<PackageRecord>) -> Self {
        Self {
            sha: commit.sha.clone(),
            date: commit.timestamp,
            packages,
        }
    }
}
