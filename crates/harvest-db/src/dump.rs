//! SQL dump export
//!
//! Serializes the store contents as one INSERT statement per row. Names and
//! versions come from untrusted upstream data, so values are escaped by
//! quote-doubling rather than interpolated verbatim.

use crate::PackageStore;
use anyhow::{Context, Result};
use std::io::Write;

/// Writes `INSERT INTO packages (name, version) VALUES ('…', '…');` lines
/// for every stored row, in id order. Returns the number of rows written.
pub fn write_sql_dump<W: Write>(store: &PackageStore, mut out: W) -> Result<usize> {
    let rows = store.read_all()?;
    for row in &rows {
        writeln!(
            out,
            "INSERT INTO packages (name, version) VALUES ('{}', '{}');",
            sql_escape(&row.name),
            sql_escape(&row.version),
        )
        .context("Failed to write dump line")?;
    }
    out.flush().context("Failed to flush dump output")?;
    Ok(rows.len())
}

/// Escapes a string literal for SQL by doubling single quotes.
fn sql_escape(value: &str) -> String {
    value.replace('\'', "''")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_escape_doubles_quotes() {
        assert_eq!(sql_escape("it's"), "it''s");
        assert_eq!(sql_escape("plain"), "plain");
        assert_eq!(
            sql_escape("x'); DROP TABLE packages;--"),
            "x''); DROP TABLE packages;--"
        );
    }
}
