//! Command implementations

mod dump;
mod harvest;
mod search;
mod stats;

pub use dump::cmd_dump;
pub use harvest::{cmd_harvest, HarvestArgs};
pub use search::cmd_search;
pub use stats::cmd_stats;
