//! Search command implementation

use anyhow::{bail, Result};
use colored::Colorize;
use harvest_db::PackageStore;
use std::path::Path;
use tabled::{
    settings::{object::Rows, Color, Modify, Style},
    Table,
};

use crate::output::SearchRow;

/// Runs a ranked full-text query against the store.
///
/// Argument validation happens before the database is touched: an empty
/// query or a zero limit is a fatal caller error.
pub fn cmd_search(query: &str, limit: usize, db_path: &Path) -> Result<()> {
    if query.trim().is_empty() {
        bail!("search query must not be empty");
    }
    if limit == 0 {
        bail!("result limit must be at least 1");
    }

    let store = PackageStore::open(db_path)?;
    let hits = store.search(query, limit)?;

    println!(
        "\n{} Found {} result{} for {}",
        "🔍".bright_cyan(),
        hits.len().to_string().bold(),
        if hits.len() == 1 { "" } else { "s" },
        query.bold()
    );

    if hits.is_empty() {
        return Ok(());
    }

    let rows: Vec<SearchRow> = hits
        .iter()
        .enumerate()
        .map(|(i, hit)| SearchRow {
            position: i + 1,
            name: hit.name.clone(),
            version: hit.version.clone(),
            rank: format!("{:.2}", hit.rank),
        })
        .collect();

    let mut table = Table::new(rows);
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Color::FG_BRIGHT_CYAN));
    println!("{}", table);

    Ok(())
}
