//! Harvest DB - Persistence store with a synchronized full-text index
//!
//! This crate owns the durable `packages` table and its FTS5 mirror. Every
//! mutating operation updates both inside one transaction, so the search
//! index is never observably stale to a reader that can see the committed
//! row. Index maintenance is done in application code, not engine triggers.

mod dump;
mod store;

pub use dump::write_sql_dump;
pub use store::{PackageStore, SearchHit, StoredPackageRow};
