//! Commit sources
//!
//! Produces the ordered list of commit references the pipeline consumes.
//! The list is fully drained before the pipeline starts.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use git2::Repository;
use harvest_core::CommitRef;
use std::path::Path;

/// Walks a local git checkout from `rev` (SHA, branch name, or "HEAD")
/// backwards, newest first, and returns the commits inside the optional
/// `[since, until]` date window (`YYYY-MM-DD`), capped at `max`.
pub fn commits_from_repo(
    repo_path: &Path,
    rev: &str,
    since: Option<&str>,
    until: Option<&str>,
    max: Option<usize>,
) -> Result<Vec<CommitRef>> {
    let since_ts = since.map(parse_date).transpose()?;
    let until_ts = until.map(parse_date).transpose()?;

    let repo = Repository::open(repo_path)
        .with_context(|| format!("Failed to open repository at {:?}", repo_path))?;
    let start = repo
        .revparse_single(rev)
        .with_context(|| format!("Failed to resolve revision {:?}", rev))?
        .peel_to_commit()
        .with_context(|| format!("Revision {:?} is not a commit", rev))?;

    let mut revwalk = repo.revwalk().context("Failed to start revwalk")?;
    revwalk.push(start.id()).context("Failed to push start commit")?;
    revwalk
        .set_sorting(git2::Sort::TIME)
        .context("Failed to set revwalk sorting")?;

    let mut commits = Vec::new();
    for oid_result in revwalk {
        let oid = oid_result.context("Failed to get commit OID")?;
        let commit = repo.find_commit(oid).context("Failed to find commit")?;
        let timestamp = commit.time().seconds();

        if let Some(until) = until_ts {
            if timestamp > until {
                continue;
            }
        }
        if let Some(since) = since_ts {
            // Walk is newest-first, so everything past this point is older
            if timestamp < since {
                break;
            }
        }

        commits.push(CommitRef::with_timestamp(oid.to_string(), timestamp as u64));
        if let Some(max) = max {
            if commits.len() >= max {
                break;
            }
        }
    }

    log::info!("Commit source yielded {} commits from {:?}", commits.len(), repo_path);
    Ok(commits)
}

/// Parses `YYYY-MM-DD` into a Unix timestamp at midnight UTC.
fn parse_date(date: &str) -> Result<i64> {
    let day = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .with_context(|| format!("Invalid date format: {}. Expected YYYY-MM-DD", date))?;
    Ok(day
        .and_hms_opt(0, 0, 0)
        .expect("midnight is always valid")
        .and_utc()
        .timestamp())
}
