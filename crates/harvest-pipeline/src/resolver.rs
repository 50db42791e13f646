//! Resolver adapter — wraps the external `nix-env` invocation for one commit

use harvest_core::{CommitRef, PackageRecord, ResolveError};
use std::process::Command;

const NIXPKGS_TARBALL: &str = "https://github.com/NixOS/nixpkgs/archive/{commit}.tar.gz";

/// Lists the packages available at one commit of the upstream tree.
///
/// Implementations do not retry; retry policy, if any, belongs to the
/// pipeline. A failure aborts only the affected commit.
pub trait PackageResolver: Send + Sync {
    fn resolve(&self, commit: &CommitRef) -> Result<Vec<PackageRecord>, ResolveError>;
}

/// Production resolver: runs `nix-env -qa --json -f <archive-url>` against
/// the nixpkgs tarball for the commit. Invocations can take seconds to
/// minutes since nix-env downloads and evaluates the whole tree.
pub struct NixEnvResolver {
    archive_url: String,
}

impl NixEnvResolver {
    pub fn new() -> Self {
        Self {
            archive_url: NIXPKGS_TARBALL.to_string(),
        }
    }

    /// Overrides the archive URL template (`{commit}` placeholder), e.g. to
    /// point at a mirror.
    pub fn with_archive_url(archive_url: impl Into<String>) -> Self {
        Self {
            archive_url: archive_url.into(),
        }
    }
}

impl Default for NixEnvResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageResolver for NixEnvResolver {
    fn resolve(&self, commit: &CommitRef) -> Result<Vec<PackageRecord>, ResolveError> {
        let url = self.archive_url.replace("{commit}", &commit.sha);
        let out = Command::new("nix-env")
            .args(["-qa", "--json", "-f", &url])
            .output()?;

        if !out.status.success() {
            return Err(ResolveError::Tool {
                status: out.status.to_string(),
                stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
            });
        }

        let stdout = std::str::from_utf8(&out.stdout).map_err(|_| ResolveError::NonUtf8Output)?;
        parse_listing(stdout)
    }
}

/// Parses the resolver's top-level JSON object: a map from attribute name to
/// an attribute object. The listing is kept verbatim — no deduplication, and
/// a malformed single entry degrades to an `"unknown"` version rather than
/// failing the commit. Only unparsable top-level output is an error.
fn parse_listing(raw: &str) -> Result<Vec<PackageRecord>, ResolveError> {
    let attrs: serde_json::Map<String, serde_json::Value> = serde_json::from_str(raw)?;
    Ok(attrs
        .iter()
        .map(|(name, value)| PackageRecord::from_resolver_entry(name, value))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use harvest_core::UNKNOWN_VERSION;

    #[test]
    fn test_parse_listing_strips_prefix_and_reads_versions() {
        let raw = r#"{
            "nixpkgs.foo": {"version": "1.0"},
            "nixpkgs.bar": {"version": "2.3.4", "pname": "bar"}
        }"#;
        let records = parse_listing(raw).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.contains(&PackageRecord::new("foo", "1.0")));
        assert!(records.contains(&PackageRecord::new("bar", "2.3.4")));
    }

    #[test]
    fn test_parse_listing_malformed_entry_does_not_abort_commit() {
        let raw = r#"{
            "nixpkgs.good": {"version": "1.0"},
            "nixpkgs.noversion": {},
            "nixpkgs.badversion": {"version": 7}
        }"#;
        let records = parse_listing(raw).unwrap();
        assert_eq!(records.len(), 3);
        for rec in records.iter().filter(|r| r.name != "good") {
            assert_eq!(rec.version, UNKNOWN_VERSION);
        }
    }

    #[test]
    fn test_parse_listing_unparsable_output_is_an_error() {
        assert!(matches!(
            parse_listing("nix-env: command not found"),
            Err(ResolveError::Malformed(_))
        ));
    }

    #[test]
    fn test_parse_listing_empty_object_yields_no_records() {
        assert!(parse_listing("{}").unwrap().is_empty());
    }
}
