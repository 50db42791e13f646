//! Dump command implementation

use anyhow::{Context, Result};
use colored::Colorize;
use harvest_db::{write_sql_dump, PackageStore};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Writes the store contents as one INSERT statement per row.
pub fn cmd_dump(output: &Path, db_path: &Path) -> Result<()> {
    let store = PackageStore::open(db_path)?;

    let file = File::create(output)
        .with_context(|| format!("Failed to create dump file {:?}", output))?;
    let written = write_sql_dump(&store, BufWriter::new(file))?;

    println!(
        "{} Wrote {} rows to {}",
        "✓".green(),
        written.to_string().bold(),
        output.display()
    );
    Ok(())
}
