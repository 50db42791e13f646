//! SQLite-backed package store and search index

use anyhow::{bail, Context, Result};
use harvest_core::PackageRecord;
use rusqlite::{params, Connection};
use std::path::Path;

/// Primary table plus its FTS5 mirror. `content='packages'` makes the index
/// an external-content table joined back on the surrogate `id`, so the index
/// stores no second copy of the text.
const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS packages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL CHECK (name <> ''),
    version TEXT NOT NULL
);

CREATE VIRTUAL TABLE IF NOT EXISTS packages_fts USING fts5(
    name,
    version,
    content='packages',
    content_rowid='id'
);
"#;

/// One durably stored package row. `id` is assigned by the store and is the
/// join key between the primary table and the search index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPackageRow {
    pub id: i64,
    pub name: String,
    pub version: String,
}

/// One ranked search result. Lower `rank` means more relevant (bm25).
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub name: String,
    pub version: String,
    pub rank: f64,
}

/// Main structure managing the package database.
///
/// The connection is `Send` but not `Sync`; callers that share a store across
/// workers wrap it in a mutex (the pipeline owns that lock).
pub struct PackageStore {
    conn: Connection,
}

impl PackageStore {
    /// Opens or creates the database at the given path and ensures the schema
    /// exists. Safe to call on every startup.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path.as_ref())
            .with_context(|| format!("Failed to open database at {:?}", path.as_ref()))?;

        // Both pragmas report their value back, so read the row instead of
        // executing blindly.
        let _mode: String = conn
            .query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))
            .context("Failed to enable WAL mode")?;
        let _timeout: i64 = conn
            .query_row("PRAGMA busy_timeout = 5000", [], |row| row.get(0))
            .context("Failed to set busy timeout")?;

        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// In-memory store, used by tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Idempotently creates the primary table and its FTS index.
    pub fn init_schema(&self) -> Result<()> {
        self.conn
            .execute_batch(SCHEMA_SQL)
            .context("Failed to initialize database schema")
    }

    /// Inserts one commit's extracted records as a single transaction.
    ///
    /// One prepared statement is executed per record; every inserted row is
    /// mirrored into the FTS index before the transaction commits. On any
    /// failure the whole batch rolls back and nothing from this commit is
    /// durably visible. Returns the number of rows inserted.
    pub fn insert_batch(&mut self, commit_key: &str, records: &[PackageRecord]) -> Result<usize> {
        let tx = self
            .conn
            .transaction()
            .context("Failed to begin transaction")?;

        {
            let mut insert = tx
                .prepare("INSERT INTO packages (name, version) VALUES (?1, ?2)")
                .context("Failed to prepare insert statement")?;
            let mut mirror = tx
                .prepare("INSERT INTO packages_fts (rowid, name, version) VALUES (?1, ?2, ?3)")
                .context("Failed to prepare index statement")?;

            for rec in records {
                insert
                    .execute(params![rec.name, rec.version])
                    .with_context(|| format!("Failed to insert {} for {}", rec, commit_key))?;
                let id = tx.last_insert_rowid();
                mirror
                    .execute(params![id, rec.name, rec.version])
                    .with_context(|| format!("Failed to index {} for {}", rec, commit_key))?;
            }
        }

        // Dropping an uncommitted transaction rolls it back.
        tx.commit()
            .with_context(|| format!("Failed to commit batch for {}", commit_key))?;
        log::debug!("Committed {} rows for {}", records.len(), commit_key);
        Ok(records.len())
    }

    /// Rewrites one row, keeping the FTS index in step within the same
    /// transaction. Returns false when no row has that id.
    pub fn update(&mut self, id: i64, name: &str, version: &str) -> Result<bool> {
        let tx = self
            .conn
            .transaction()
            .context("Failed to begin transaction")?;

        let Some((old_name, old_version)) = lookup_row(&tx, id)? else {
            return Ok(false);
        };

        tx.execute(
            "UPDATE packages SET name = ?1, version = ?2 WHERE id = ?3",
            params![name, version, id],
        )
        .with_context(|| format!("Failed to update row {}", id))?;
        tx.execute(
            "INSERT INTO packages_fts (packages_fts, rowid, name, version) VALUES ('delete', ?1, ?2, ?3)",
            params![id, old_name, old_version],
        )
        .context("Failed to remove old index entry")?;
        tx.execute(
            "INSERT INTO packages_fts (rowid, name, version) VALUES (?1, ?2, ?3)",
            params![id, name, version],
        )
        .context("Failed to add new index entry")?;

        tx.commit().context("Failed to commit update")?;
        Ok(true)
    }

    /// Removes one row and its index entry in the same transaction.
    /// Returns false when no row has that id.
    pub fn delete(&mut self, id: i64) -> Result<bool> {
        let tx = self
            .conn
            .transaction()
            .context("Failed to begin transaction")?;

        let Some((old_name, old_version)) = lookup_row(&tx, id)? else {
            return Ok(false);
        };

        tx.execute("DELETE FROM packages WHERE id = ?1", params![id])
            .with_context(|| format!("Failed to delete row {}", id))?;
        tx.execute(
            "INSERT INTO packages_fts (packages_fts, rowid, name, version) VALUES ('delete', ?1, ?2, ?3)",
            params![id, old_name, old_version],
        )
        .context("Failed to remove index entry")?;

        tx.commit().context("Failed to commit delete")?;
        Ok(true)
    }

    /// Full scan of the primary table, ordered by id. Used by export.
    pub fn read_all(&self) -> Result<Vec<StoredPackageRow>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, version FROM packages ORDER BY id")
            .context("Failed to prepare scan")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(StoredPackageRow {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    version: row.get(2)?,
                })
            })
            .context("Failed to scan packages")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("Failed to read row")?;
        Ok(rows)
    }

    /// Ranked full-text search over package names and versions.
    ///
    /// Results are ordered by bm25 rank (lower = more relevant) and truncated
    /// to `limit`. A query with no matches returns an empty vec. `limit` must
    /// be at least 1; zero is rejected as a caller error, never coerced.
    pub fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        if limit == 0 {
            bail!("search limit must be at least 1");
        }

        let mut stmt = self
            .conn
            .prepare(
                "SELECT p.name, p.version, fts.rank
                 FROM packages_fts fts
                 JOIN packages p ON fts.rowid = p.id
                 WHERE packages_fts MATCH ?1
                 ORDER BY fts.rank
                 LIMIT ?2",
            )
            .context("Failed to prepare search query")?;

        let hits = stmt
            .query_map(params![query, limit as i64], |row| {
                Ok(SearchHit {
                    name: row.get(0)?,
                    version: row.get(1)?,
                    rank: row.get(2)?,
                })
            })
            .with_context(|| format!("Failed to execute search for {:?}", query))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("Failed to read search result row")?;
        Ok(hits)
    }

    /// Total number of stored rows.
    pub fn count(&self) -> Result<usize> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM packages", [], |row| row.get(0))
            .context("Failed to count packages")?;
        Ok(n as usize)
    }

    /// Number of distinct package names.
    pub fn distinct_names(&self) -> Result<usize> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(DISTINCT name) FROM packages", [], |row| {
                row.get(0)
            })
            .context("Failed to count distinct names")?;
        Ok(n as usize)
    }
}

fn lookup_row(tx: &rusqlite::Transaction<'_>, id: i64) -> Result<Option<(String, String)>> {
    use rusqlite::OptionalExtension;
    tx.query_row(
        "SELECT name, version FROM packages WHERE id = ?1",
        params![id],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )
    .optional()
    .with_context(|| format!("Failed to look up row {}", id))
}
