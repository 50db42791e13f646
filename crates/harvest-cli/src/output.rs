//! Output formatting structures for CLI display

use tabled::Tabled;

/// Table row for displaying ranked search results
#[derive(Tabled)]
pub struct SearchRow {
    #[tabled(rename = "#")]
    pub position: usize,
    #[tabled(rename = "Package")]
    pub name: String,
    #[tabled(rename = "Version")]
    pub version: String,
    #[tabled(rename = "Rank")]
    pub rank: String,
}
