//! Tests for store and search index functionality

use anyhow::Result;
use harvest_core::PackageRecord;
use harvest_db::{write_sql_dump, PackageStore};
use tempfile::TempDir;

fn rec(name: &str, version: &str) -> PackageRecord {
    PackageRecord::new(name, version)
}

// ── schema init ──────────────────────────────────────────────────────────────

#[test]
fn test_schema_init_is_idempotent() -> Result<()> {
    let tmp = TempDir::new()?;
    let path = tmp.path().join("packages.db");

    let store = PackageStore::open(&path)?;
    // Explicit second init on a live store
    store.init_schema()?;
    drop(store);

    // Reopen runs init again on the same file
    let store = PackageStore::open(&path)?;
    assert_eq!(store.count()?, 0);
    Ok(())
}

// ── insert_batch ─────────────────────────────────────────────────────────────

#[test]
fn test_insert_batch_and_read_all() -> Result<()> {
    let mut store = PackageStore::open_in_memory()?;

    let inserted = store.insert_batch("aaa111", &[rec("foo", "1.0"), rec("bar", "2.1")])?;
    assert_eq!(inserted, 2);

    let rows = store.read_all()?;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].name, "foo");
    assert_eq!(rows[1].name, "bar");
    // Surrogate keys are assigned in insert order
    assert!(rows[0].id < rows[1].id);
    Ok(())
}

#[test]
fn test_duplicate_records_within_a_batch_are_kept() -> Result<()> {
    let mut store = PackageStore::open_in_memory()?;

    store.insert_batch("aaa111", &[rec("foo", "1.0"), rec("foo", "1.0")])?;
    assert_eq!(store.count()?, 2);
    assert_eq!(store.distinct_names()?, 1);
    Ok(())
}

#[test]
fn test_failed_batch_leaves_no_partial_rows() -> Result<()> {
    let mut store = PackageStore::open_in_memory()?;

    // The empty name violates the schema check mid-batch
    let batch = [rec("ok-one", "1.0"), rec("", "2.0"), rec("ok-two", "3.0")];
    assert!(store.insert_batch("bbb222", &batch).is_err());

    // All-or-nothing: the row inserted before the failure must be gone too
    assert_eq!(store.count()?, 0);
    assert!(store.search("ok", 10)?.is_empty());
    Ok(())
}

#[test]
fn test_failed_batch_does_not_affect_other_commits() -> Result<()> {
    let mut store = PackageStore::open_in_memory()?;

    store.insert_batch("aaa111", &[rec("keep", "1.0")])?;
    assert!(store
        .insert_batch("bbb222", &[rec("", "broken")])
        .is_err());

    let rows = store.read_all()?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "keep");
    Ok(())
}

// ── search ───────────────────────────────────────────────────────────────────

#[test]
fn test_search_finds_inserted_rows_immediately() -> Result<()> {
    let mut store = PackageStore::open_in_memory()?;

    store.insert_batch("aaa111", &[rec("nodejs", "20.1.0"), rec("python3", "3.12.1")])?;

    let hits = store.search("nodejs", 10)?;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "nodejs");
    assert_eq!(hits[0].version, "20.1.0");
    Ok(())
}

#[test]
fn test_search_matches_version_text() -> Result<()> {
    let mut store = PackageStore::open_in_memory()?;

    store.insert_batch("aaa111", &[rec("nodejs", "20.1.0"), rec("python3", "3.12.1")])?;

    // Dots are not bareword characters in FTS5 queries, so phrase-quote it
    let hits = store.search("\"3.12.1\"", 10)?;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "python3");
    Ok(())
}

#[test]
fn test_search_respects_limit_and_rank_order() -> Result<()> {
    let mut store = PackageStore::open_in_memory()?;

    // "python" appears twice in the first row's text, once in the others
    store.insert_batch(
        "aaa111",
        &[
            rec("python", "python"),
            rec("python-lib", "1.0"),
            rec("python-tool", "2.0"),
        ],
    )?;

    let hits = store.search("python", 2)?;
    assert_eq!(hits.len(), 2);
    // bm25: lower rank value first
    assert!(hits[0].rank <= hits[1].rank);
    assert_eq!(hits[0].name, "python");
    Ok(())
}

#[test]
fn test_search_no_match_returns_empty_not_error() -> Result<()> {
    let mut store = PackageStore::open_in_memory()?;
    store.insert_batch("aaa111", &[rec("foo", "1.0")])?;

    assert!(store.search("zzz_nothing", 10)?.is_empty());
    Ok(())
}

#[test]
fn test_search_rejects_zero_limit() -> Result<()> {
    let store = PackageStore::open_in_memory()?;
    assert!(store.search("foo", 0).is_err());
    Ok(())
}

// ── index consistency under update / delete ──────────────────────────────────

#[test]
fn test_index_follows_update() -> Result<()> {
    let mut store = PackageStore::open_in_memory()?;

    store.insert_batch("aaa111", &[rec("oldname", "1.0")])?;
    let id = store.read_all()?[0].id;

    assert!(store.update(id, "newname", "2.0")?);

    assert!(store.search("oldname", 10)?.is_empty());
    let hits = store.search("newname", 10)?;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].version, "2.0");
    Ok(())
}

#[test]
fn test_index_follows_delete() -> Result<()> {
    let mut store = PackageStore::open_in_memory()?;

    store.insert_batch("aaa111", &[rec("doomed", "1.0"), rec("spared", "1.0")])?;
    let id = store.read_all()?[0].id;

    assert!(store.delete(id)?);

    assert!(store.search("doomed", 10)?.is_empty());
    assert_eq!(store.search("spared", 10)?.len(), 1);
    assert_eq!(store.count()?, 1);
    Ok(())
}

#[test]
fn test_update_and_delete_of_missing_row_return_false() -> Result<()> {
    let mut store = PackageStore::open_in_memory()?;
    assert!(!store.update(999, "x", "y")?);
    assert!(!store.delete(999)?);
    Ok(())
}

// ── sql dump ─────────────────────────────────────────────────────────────────

#[test]
fn test_sql_dump_one_statement_per_row() -> Result<()> {
    let mut store = PackageStore::open_in_memory()?;
    store.insert_batch("aaa111", &[rec("foo", "1.0"), rec("bar", "2.0")])?;

    let mut out = Vec::new();
    let written = write_sql_dump(&store, &mut out)?;
    assert_eq!(written, 2);

    let text = String::from_utf8(out)?;
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(
        lines[0],
        "INSERT INTO packages (name, version) VALUES ('foo', '1.0');"
    );
    Ok(())
}

#[test]
fn test_sql_dump_escapes_untrusted_values() -> Result<()> {
    let mut store = PackageStore::open_in_memory()?;
    store.insert_batch("aaa111", &[rec("it's-a-lib", "1.0")])?;

    let mut out = Vec::new();
    write_sql_dump(&store, &mut out)?;

    let text = String::from_utf8(out)?;
    assert!(text.contains("'it''s-a-lib'"));
    Ok(())
}
