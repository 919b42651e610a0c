//! Connection tuning shared by every endpoint opened by the loader

use rusqlite::Connection;

/// Apply the PRAGMAs used for load runs.
///
/// - `journal_mode = WAL` (in-memory databases report `memory` and keep it)
/// - `synchronous = NORMAL`
/// - `temp_store = MEMORY`
/// - `cache_size = -65536` (64 MiB)
///
/// Returns the journal mode SQLite settled on.
pub fn apply_optimized_pragmas(conn: &Connection) -> rusqlite::Result<String> {
    let journal_mode: String =
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.pragma_update(None, "temp_store", "MEMORY")?;
    conn.pragma_update(None, "cache_size", -65536)?;

    log::debug!("SQLite pragmas applied (journal_mode={})", journal_mode);
    Ok(journal_mode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_wal_enabled_on_file_database() {
        let dir = tempdir().unwrap();
        let conn = Connection::open(dir.path().join("pragma.db")).unwrap();

        let mode = apply_optimized_pragmas(&conn).unwrap();
        assert_eq!(mode.to_lowercase(), "wal");

        let synchronous: i64 = conn.query_row("PRAGMA synchronous", [], |row| row.get(0)).unwrap();
        assert_eq!(synchronous, 1); // NORMAL
    }

    #[test]
    fn test_in_memory_keeps_memory_journal() {
        let conn = Connection::open_in_memory().unwrap();
        let mode = apply_optimized_pragmas(&conn).unwrap();
        assert_eq!(mode.to_lowercase(), "memory");
    }
}
