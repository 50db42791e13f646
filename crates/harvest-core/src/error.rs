//! Error types for harvest-core

/// Failures produced by a package resolver for a single commit.
///
/// Every variant aborts only the affected commit's extraction; the pipeline
/// logs it and moves on to the next commit.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The resolver process could not be spawned at all.
    #[error("failed to invoke resolver: {0}")]
    Invocation(#[from] std::io::Error),

    /// The resolver ran but exited non-zero (network failure, bad commit, ...).
    #[error("resolver exited with {status}: {stderr}")]
    Tool { status: String, stderr: String },

    /// The resolver's stdout was not valid UTF-8.
    #[error("resolver output is not valid UTF-8")]
    NonUtf8Output,

    /// The resolver's top-level output could not be parsed.
    #[error("unparsable resolver output: {0}")]
    Malformed(#[from] serde_json::Error),
}
