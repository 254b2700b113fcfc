use rusqlite::Connection;

use crate::error::AppError;

const SCHEMA_V1: &str = "
CREATE TABLE IF NOT EXISTS indices (
    name TEXT PRIMARY KEY NOT NULL,
    created_at TEXT DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS documents (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    index_name TEXT NOT NULL,
    file_name TEXT NOT NULL,
    file_path TEXT NOT NULL,
    relative_path TEXT NOT NULL,
    indexed_at TEXT DEFAULT CURRENT_TIMESTAMP,
    UNIQUE(index_name, file_path)
);

CREATE INDEX IF NOT EXISTS idx_documents_index ON documents(index_name);

CREATE VIRTUAL TABLE IF NOT EXISTS documents_fts USING fts5(
    terms,
    index_name UNINDEXED
);
";

pub fn run_migrations(conn: &Connection) -> Result<(), AppError> {
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    conn.execute_batch(SCHEMA_V1)?;
    Ok(())
}
