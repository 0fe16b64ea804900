//! Database schema definitions

/// Name of the only table
pub const TABLE: &str = "indexing_urls";

/// SQL to drop the indexing_urls table (its indexes go with it)
pub const DROP_INDEXING_URLS_TABLE: &str = "DROP TABLE IF EXISTS indexing_urls";

/// SQL to create the indexing_urls table.
///
/// Only `id` is NOT NULL. AUTOINCREMENT keeps ids of deleted rows from
/// being handed out again.
pub const CREATE_INDEXING_URLS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS indexing_urls (
    id INTEGER PRIMARY KEY AUTOINCREMENT UNIQUE,
    url TEXT UNIQUE,
    status TEXT,
    created DATETIME,
    updated DATETIME
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE UNIQUE INDEX IF NOT EXISTS indexing_urls_id_uindex ON indexing_urls(id)",
    "CREATE UNIQUE INDEX IF NOT EXISTS indexing_urls_url_uindex ON indexing_urls(url)",
];

/// Names of the explicit unique indexes, in creation order
pub const INDEX_NAMES: &[&str] = &["indexing_urls_id_uindex", "indexing_urls_url_uindex"];

/// Statements that create the schema without touching existing data
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![CREATE_INDEXING_URLS_TABLE];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}

/// Statements that wipe and recreate the schema.
///
/// Running these twice in a row leaves the same empty table both times.
pub fn init_statements() -> Vec<&'static str> {
    let mut stmts = vec![DROP_INDEXING_URLS_TABLE];
    stmts.extend(all_schema_statements());
    stmts
}

/// The init statements as one script, e.g. for `sqlite3 db < init.sql`
pub fn init_script() -> String {
    init_statements()
        .iter()
        .map(|stmt| format!("{};\n", stmt.trim()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_drops_first() {
        let stmts = init_statements();
        assert_eq!(stmts[0], DROP_INDEXING_URLS_TABLE);
        assert_eq!(stmts.len(), 1 + all_schema_statements().len());
    }

    #[test]
    fn test_init_script_runs_as_batch() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch(&init_script()).unwrap();
        conn.execute_batch(&init_script()).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [TABLE],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }
}
