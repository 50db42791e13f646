//! Nix-Harvest CLI - Historical package inventory of nixpkgs
//!
//! Provides:
//! - Harvesting package listings across a range of commits
//! - Ranked full-text search over harvested packages
//! - SQL dump export of the harvested store

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::{cmd_dump, cmd_harvest, cmd_search, cmd_stats, HarvestArgs};

#[derive(Parser)]
#[command(name = "nix-harvest")]
#[command(about = "Builds a searchable historical inventory of nixpkgs packages", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the package database
    #[arg(short, long, default_value = "./nix-harvest.db")]
    database: PathBuf,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Walks commit history and extracts package listings into the store
    Harvest {
        /// Path to a local nixpkgs git checkout
        #[arg(short, long)]
        repo: Option<PathBuf>,

        /// Revision to walk back from (SHA, branch name, or HEAD)
        #[arg(long, default_value = "HEAD")]
        rev: String,

        /// Oldest commit date to include (YYYY-MM-DD)
        #[arg(long)]
        since: Option<String>,

        /// Newest commit date to include (YYYY-MM-DD)
        #[arg(long)]
        until: Option<String>,

        /// Maximum number of commits to process
        #[arg(short, long)]
        max_commits: Option<usize>,

        /// Explicit commit SHA to process (repeatable, bypasses the repo walk)
        #[arg(long = "commit", conflicts_with = "repo")]
        commits: Vec<String>,

        /// Number of concurrent resolver invocations
        #[arg(short, long, default_value = "4")]
        jobs: usize,

        /// Stream CommitData JSON lines to this file instead of the database
        #[arg(long)]
        jsonl: Option<PathBuf>,

        /// Consecutive persistence failures tolerated before aborting
        #[arg(long, default_value = "5")]
        failure_threshold: usize,
    },

    /// Ranked full-text search over package names and versions
    Search {
        /// Search query (FTS5 syntax; must not be empty)
        query: String,

        /// Maximum number of results to return
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,
    },

    /// Writes the store contents as SQL INSERT statements
    Dump {
        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Show database statistics
    Stats,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Configure logger
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(&cli.log_level),
    )
    .init();

    match cli.command {
        Commands::Harvest {
            repo,
            rev,
            since,
            until,
            max_commits,
            commits,
            jobs,
            jsonl,
            failure_threshold,
        } => {
            cmd_harvest(
                HarvestArgs {
                    repo,
                    rev,
                    since,
                    until,
                    max_commits,
                    commits,
                    jobs,
                    jsonl,
                    failure_threshold,
                },
                &cli.database,
            )?;
        }
        Commands::Search { query, limit } => {
            cmd_search(&query, limit, &cli.database)?;
        }
        Commands::Dump { output } => {
            cmd_dump(&output, &cli.database)?;
        }
        Commands::Stats => {
            cmd_stats(&cli.database)?;
        }
    }

    Ok(())
}
