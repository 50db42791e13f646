//! Bounded worker pool over commit references
//!
//! Exactly `concurrency` resolver invocations are in flight at any time: the
//! pool has that many threads and a finishing worker immediately picks up the
//! next unconsumed commit. All writes go through one mutex-guarded sink, and
//! the run returns only after every commit has either committed or been
//! logged and skipped.

use anyhow::{bail, Context, Result};
use harvest_core::{CommitRef, PackageRecord};
use harvest_db::PackageStore;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::resolver::PackageResolver;
use crate::stats::PipelineStats;

/// Default number of consecutive persistence failures before the run aborts.
pub const DEFAULT_FAILURE_THRESHOLD: usize = 5;

/// The single shared output of a pipeline run: either the package store or
/// an export stream. At most one worker is inside `append` at a time, and
/// commit-to-commit order in the sink is completion order, not input order.
pub trait CommitSink {
    /// Appends one commit's records as an atomic unit. An error means
    /// nothing from this commit is visible in the sink.
    fn append(&mut self, commit: &CommitRef, records: &[PackageRecord]) -> Result<usize>;
}

impl CommitSink for PackageStore {
    fn append(&mut self, commit: &CommitRef, records: &[PackageRecord]) -> Result<usize> {
        self.insert_batch(&commit.sha, records)
    }
}

/// Cooperative cancellation, checked at the per-commit admission point.
/// In-flight resolver calls run to completion and still commit.
#[derive(Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Outcome of one unit of work.
enum UnitOutcome {
    /// Committed to the sink with this many records
    Committed(usize),
    ResolveFailed,
    SinkFailed,
    /// Not admitted (cancellation or tripped breaker)
    Skipped,
}

/// Fans commit references out to a fixed-size worker pool.
pub struct Pipeline<R> {
    resolver: R,
    concurrency: usize,
    failure_threshold: usize,
}

impl<R: PackageResolver> Pipeline<R> {
    /// `concurrency` is the hard ceiling on in-flight resolver invocations;
    /// it must be at least 1.
    pub fn new(resolver: R, concurrency: usize) -> Result<Self> {
        if concurrency == 0 {
            bail!("pipeline concurrency must be at least 1");
        }
        Ok(Self {
            resolver,
            concurrency,
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
        })
    }

    /// Overrides how many consecutive persistence failures abort the run.
    pub fn with_failure_threshold(mut self, failure_threshold: usize) -> Self {
        self.failure_threshold = failure_threshold.max(1);
        self
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Processes every commit and returns aggregate statistics.
    ///
    /// This is a join/barrier: it returns only once each commit has either
    /// produced a committed batch or a logged, non-fatal failure. A single
    /// commit never fails the run; only a persistence outage (consecutive
    /// sink failures reaching the threshold) does.
    pub fn run<S>(
        &self,
        commits: &[CommitRef],
        sink: &mut S,
        cancel: &CancelToken,
    ) -> Result<PipelineStats>
    where
        S: CommitSink + Send,
    {
        let start = Instant::now();
        log::info!(
            "Processing {} commits with {} workers",
            commits.len(),
            self.concurrency
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.concurrency)
            .build()
            .context("Failed to build worker pool")?;

        let sink = Mutex::new(sink);
        let consecutive_sink_failures = AtomicUsize::new(0);

        let outcomes: Vec<UnitOutcome> = pool.install(|| {
            commits
                .par_iter()
                .map(|commit| self.process_one(commit, &sink, cancel, &consecutive_sink_failures))
                .collect()
        });

        let mut stats = PipelineStats::default();
        for outcome in outcomes {
            match outcome {
                UnitOutcome::Committed(n) => {
                    stats.processed += 1;
                    stats.packages_inserted += n;
                }
                UnitOutcome::ResolveFailed => stats.resolve_failures += 1,
                UnitOutcome::SinkFailed => stats.sink_failures += 1,
                UnitOutcome::Skipped => stats.skipped += 1,
            }
        }
        stats.elapsed = start.elapsed();
        log::info!("Pipeline finished: {}", stats);

        if consecutive_sink_failures.load(Ordering::SeqCst) >= self.failure_threshold {
            bail!(
                "aborted after {} consecutive persistence failures — check the database connection",
                self.failure_threshold
            );
        }
        Ok(stats)
    }

    fn process_one<S>(
        &self,
        commit: &CommitRef,
        sink: &Mutex<&mut S>,
        cancel: &CancelToken,
        consecutive_sink_failures: &AtomicUsize,
    ) -> UnitOutcome
    where
        S: CommitSink + Send,
    {
        // Admission check: cancelled runs and a tripped breaker stop taking
        // new work but let in-flight units drain.
        if cancel.is_cancelled() {
            log::debug!("Skipping commit {} (cancelled)", commit.short());
            return UnitOutcome::Skipped;
        }
        if consecutive_sink_failures.load(Ordering::SeqCst) >= self.failure_threshold {
            log::debug!("Skipping commit {} (persistence breaker open)", commit.short());
            return UnitOutcome::Skipped;
        }

        log::debug!("Resolving commit {}", commit.short());
        let records = match self.resolver.resolve(commit) {
            Ok(records) => records,
            Err(e) => {
                log::warn!("Failed to resolve commit {}: {}", commit.sha, e);
                return UnitOutcome::ResolveFailed;
            }
        };

        let mut sink = sink.lock().unwrap();
        match sink.append(commit, &records) {
            Ok(n) => {
                consecutive_sink_failures.store(0, Ordering::SeqCst);
                log::debug!("Committed {} packages for commit {}", n, commit.short());
                UnitOutcome::Committed(n)
            }
            Err(e) => {
                let failures = consecutive_sink_failures.fetch_add(1, Ordering::SeqCst) + 1;
                log::warn!(
                    "Failed to persist commit {} ({} consecutive persistence failures): {:?}",
                    commit.sha,
                    failures,
                    e
                );
                UnitOutcome::SinkFailed
            }
        }
    }
}
