//! Harvest Core - Shared data models for the nixpkgs harvesting system
//!
//! This crate defines the core data structures used throughout the project:
//! `CommitRef`, `PackageRecord`, the `CommitData` export view, and the
//! resolver error taxonomy.

mod error;
mod models;

pub use error::ResolveError;
pub use models::{CommitData, CommitRef, PackageRecord, UNKNOWN_VERSION};
