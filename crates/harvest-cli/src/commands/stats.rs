//! Stats command implementation

use anyhow::Result;
use colored::Colorize;
use harvest_db::PackageStore;
use std::path::Path;

/// Displays database statistics
pub fn cmd_stats(db_path: &Path) -> Result<()> {
    let store = PackageStore::open(db_path)?;
    let size = std::fs::metadata(db_path).map(|m| m.len()).unwrap_or(0);

    println!("{}", "Database Statistics:".bright_cyan().bold());
    println!("  {}: {}", "Rows".bright_yellow(), store.count()?.to_string().bold());
    println!(
        "  {}: {}",
        "Distinct packages".bright_yellow(),
        store.distinct_names()?.to_string().bold()
    );
    println!(
        "  {}: {}",
        "Size on disk".bright_yellow(),
        format!("{:.1} KiB", size as f64 / 1024.0).bold()
    );
    Ok(())
}
