//! Harvest Pipeline - Bounded-concurrency extraction engine
//!
//! This crate turns an ordered list of commit references into durably stored
//! package records:
//! - Resolver adapter around the external `nix-env` tool (resolver.rs)
//! - Commit sources: local git history or an explicit SHA list (source.rs)
//! - The bounded worker pool with per-commit failure isolation (pipeline.rs)
//! - The JSONL export sink for the concurrent-export mode (export.rs)

mod export;
mod pipeline;
mod resolver;
mod source;
mod stats;

pub use export::JsonlSink;
pub use pipeline::{CancelToken, CommitSink, Pipeline, DEFAULT_FAILURE_THRESHOLD};
pub use resolver::{NixEnvResolver, PackageResolver};
pub use source::commits_from_repo;
pub use stats::PipelineStats;
