//! Aggregate statistics for a pipeline run

use std::time::Duration;

/// Counters produced by one pipeline run, reported after the join/barrier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Commits whose batch committed to the sink
    pub processed: usize,
    /// Commits whose resolver invocation failed (logged, skipped)
    pub resolve_failures: usize,
    /// Commits whose batch rolled back on a sink error (logged, skipped)
    pub sink_failures: usize,
    /// Commits never admitted (cancellation or open breaker)
    pub skipped: usize,
    /// Total rows durably inserted across all committed batches
    pub packages_inserted: usize,
    pub elapsed: Duration,
}

impl PipelineStats {
    /// Commits that failed for either reason.
    pub fn failed(&self) -> usize {
        self.resolve_failures + self.sink_failures
    }
}

impl std::fmt::Display for PipelineStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Commits: {} processed, {} failed, {} skipped | Packages: {} inserted | Time: {:.1}s",
            self.processed,
            self.failed(),
            self.skipped,
            self.packages_inserted,
            self.elapsed.as_secs_f64()
        )
    }
}
