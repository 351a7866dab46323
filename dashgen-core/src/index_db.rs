use std::path::Path;

use rusqlite::{Connection, params};

use crate::site::IndexEntry;

/// Write the Dash search index. Duplicate (name, type, path) rows are
/// dropped. Returns the number of rows stored.
pub fn write_search_index(path: &Path, entries: &[IndexEntry]) -> rusqlite::Result<usize> {
    let mut conn = Connection::open(path)?;
    init_schema(&conn)?;

    let tx = conn.transaction()?;
    let mut inserted = 0;
    {
        let mut stmt = tx.prepare(
            "INSERT OR IGNORE INTO searchIndex(name, type, path) VALUES (?1, ?2, ?3)",
        )?;
        for entry in entries {
            inserted += stmt.execute(params![entry.name, entry.kind.as_str(), entry.path()])?;
        }
    }
    tx.commit()?;

    Ok(inserted)
}

fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS searchIndex(
            id   INTEGER PRIMARY KEY,
            name TEXT,
            type TEXT,
            path TEXT
        );
        CREATE UNIQUE INDEX IF NOT EXISTS anchor ON searchIndex (name, type, path);
        ",
    )
}
