//! Harvest command implementation

use anyhow::{bail, Result};
use colored::Colorize;
use harvest_core::CommitRef;
use harvest_db::PackageStore;
use harvest_pipeline::{commits_from_repo, CancelToken, JsonlSink, NixEnvResolver, Pipeline};
use std::path::{Path, PathBuf};

pub struct HarvestArgs {
    pub repo: Option<PathBuf>,
    pub rev: String,
    pub since: Option<String>,
    pub until: Option<String>,
    pub max_commits: Option<usize>,
    pub commits: Vec<String>,
    pub jobs: usize,
    pub jsonl: Option<PathBuf>,
    pub failure_threshold: usize,
}

/// Runs the extraction pipeline over the selected commit range.
pub fn cmd_harvest(args: HarvestArgs, db_path: &Path) -> Result<()> {
    let commits = collect_commits(&args)?;
    if commits.is_empty() {
        println!("{} No commits to process.", "✓".green());
        return Ok(());
    }

    log::info!("Harvesting {} commits with {} jobs", commits.len(), args.jobs);
    let pipeline = Pipeline::new(NixEnvResolver::new(), args.jobs)?
        .with_failure_threshold(args.failure_threshold);
    let cancel = CancelToken::new();

    // The sink is the only mode switch: database (default) or JSONL stream.
    let stats = match &args.jsonl {
        Some(path) => {
            let mut sink = JsonlSink::create(path)?;
            let stats = pipeline.run(&commits, &mut sink, &cancel)?;
            sink.finish()?;
            println!(
                "{} Wrote {} commit records to {}",
                "✓".green(),
                stats.processed.to_string().bold(),
                path.display()
            );
            stats
        }
        None => {
            let mut store = PackageStore::open(db_path)?;
            let stats = pipeline.run(&commits, &mut store, &cancel)?;
            println!(
                "{} Stored {} packages from {} commits in {}",
                "✓".green(),
                stats.packages_inserted.to_string().bold(),
                stats.processed.to_string().bold(),
                db_path.display()
            );
            stats
        }
    };

    // Individual failures were already logged with their SHA; surface the
    // totals so the operator sees them without scanning the log.
    if stats.failed() > 0 {
        println!(
            "{} {} commits failed and were skipped (see log)",
            "⚠".yellow(),
            stats.failed().to_string().bold()
        );
    }
    Ok(())
}

fn collect_commits(args: &HarvestArgs) -> Result<Vec<CommitRef>> {
    if !args.commits.is_empty() {
        return Ok(args.commits.iter().map(|sha| CommitRef::new(sha.as_str())).collect());
    }
    let Some(repo) = &args.repo else {
        bail!("either --repo or at least one --commit is required");
    };
    commits_from_repo(
        repo,
        &args.rev,
        args.since.as_deref(),
        args.until.as_deref(),
        args.max_commits,
    )
}
