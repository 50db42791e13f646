//! JSONL export sink — the concurrent-export mode
//!
//! One `CommitData` JSON object per line, each independently parsable.
//! Line order is completion order; consumers must not rely on it.

use anyhow::{Context, Result};
use harvest_core::{CommitData, CommitRef, PackageRecord};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::pipeline::CommitSink;

/// Writes one commit per line to any writer. Lines are written whole under
/// the pipeline's sink lock, so records never interleave.
pub struct JsonlSink<W: Write> {
    out: W,
    lines: usize,
}

impl JsonlSink<BufWriter<File>> {
    /// Creates (truncates) the output file. The stream is append-only and
    /// write-once per record.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path.as_ref())
            .with_context(|| format!("Failed to create export file {:?}", path.as_ref()))?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> JsonlSink<W> {
    pub fn new(out: W) -> Self {
        Self { out, lines: 0 }
    }

    /// Number of commit records written so far.
    pub fn lines(&self) -> usize {
        self.lines
    }

    /// Flushes and returns the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        self.out.flush().context("Failed to flush export stream")?;
        Ok(self.out)
    }
}

impl<W: Write> CommitSink for JsonlSink<W> {
    fn append(&mut self, commit: &CommitRef, records: &[PackageRecord]) -> Result<usize> {
        let data = CommitData::new(commit, records.to_vec());
        let line = serde_json::to_string(&data)
            .with_context(|| format!("Failed to serialize commit {}", commit.short()))?;
        self.out
            .write_all(line.as_bytes())
            .and_then(|_| self.out.write_all(b"\n"))
            .with_context(|| format!("Failed to write export record for {}", commit.short()))?;
        self.lines += 1;
        Ok(records.len())
    }
}
