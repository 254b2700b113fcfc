use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use rusqlite::{params, Connection};

use crate::data::migrations;
use crate::data::tokenizer;
use crate::data::IndexStore;
use crate::error::AppError;
use crate::models::file_entry::IndexedFile;
use crate::models::search::SearchHit;

pub fn index_exists(conn: &Connection, name: &str) -> Result<bool, AppError> {
    let exists = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM indices WHERE name = ?1)",
        params![name],
        |row| row.get(0),
    )?;
    Ok(exists)
}

pub fn create_index(conn: &Connection, name: &str) -> Result<(), AppError> {
    conn.execute(
        "INSERT OR IGNORE INTO indices (name) VALUES (?1)",
        params![name],
    )?;
    Ok(())
}

pub fn upsert_document(conn: &Connection, index: &str, doc: &IndexedFile) -> Result<i64, AppError> {
    let tx = conn.unchecked_transaction()?;
    let id: i64 = tx.query_row(
        "INSERT INTO documents (index_name, file_name, file_path, relative_path)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(index_name, file_path) DO UPDATE SET
             file_name = excluded.file_name,
             relative_path = excluded.relative_path,
             indexed_at = CURRENT_TIMESTAMP
         RETURNING id",
        params![index, doc.file_name, doc.file_path, doc.relative_path],
        |row| row.get(0),
    )?;
    tx.execute("DELETE FROM documents_fts WHERE rowid = ?1", params![id])?;
    tx.execute(
        "INSERT INTO documents_fts (rowid, terms, index_name) VALUES (?1, ?2, ?3)",
        params![id, tokenizer::analyzed_text(&doc.file_name), index],
    )?;
    tx.commit()?;
    Ok(id)
}

#[cfg(test)]
pub fn get_by_path(
    conn: &Connection,
    index: &str,
    file_path: &str,
) -> Result<Option<IndexedFile>, AppError> {
    use rusqlite::OptionalExtension;

    let mut stmt = conn.prepare(
        "SELECT file_name, file_path, relative_path
         FROM documents WHERE index_name = ?1 AND file_path = ?2",
    )?;

    let doc = stmt
        .query_row(params![index, file_path], |row| {
            Ok(IndexedFile {
                file_name: row.get(0)?,
                file_path: row.get(1)?,
                relative_path: row.get(2)?,
            })
        })
        .optional()?;

    Ok(doc)
}

/// Ranks by BM25 over the analysed file name. SQLite reports BM25 as a
/// negative number where lower is better, so the sign is flipped.
pub fn search_by_name(
    conn: &Connection,
    index: &str,
    keyword: &str,
    limit: usize,
) -> Result<Vec<SearchHit>, AppError> {
    let Some(expression) = tokenizer::match_expression(keyword) else {
        return Ok(Vec::new());
    };

    let mut stmt = conn.prepare(
        "SELECT d.file_path, bm25(documents_fts) AS rank
         FROM documents_fts
         JOIN documents d ON d.id = documents_fts.rowid
         WHERE documents_fts MATCH ?1 AND documents_fts.index_name = ?2
         ORDER BY rank ASC, d.id ASC
         LIMIT ?3",
    )?;

    let hits = stmt
        .query_map(params![expression, index, limit as i64], |row| {
            let rank: f64 = row.get(1)?;
            Ok(SearchHit {
                file_path: row.get(0)?,
                score: -rank,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(hits)
}

pub fn count_documents(conn: &Connection, index: &str) -> Result<usize, AppError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM documents WHERE index_name = ?1",
        params![index],
        |row| row.get(0),
    )?;
    Ok(count as usize)
}

/// Embedded index store backed by SQLite full-text search.
pub struct SqliteIndexStore {
    conn: Mutex<Connection>,
}

impl SqliteIndexStore {
    pub fn open(path: &Path) -> Result<Self, AppError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        migrations::run_migrations(&conn)?;
        tracing::debug!(path = %path.display(), "opened sqlite index store");
        Ok(Self::from_connection(conn))
    }

    pub fn open_in_memory() -> Result<Self, AppError> {
        let conn = Connection::open_in_memory()?;
        migrations::run_migrations(&conn)?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn with_conn<F, T>(&self, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&Connection) -> Result<T, AppError>,
    {
        let conn = self
            .conn
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&conn)
    }

    #[cfg(test)]
    pub fn get_by_path(&self, index: &str, file_path: &str) -> Result<Option<IndexedFile>, AppError> {
        self.with_conn(|conn| get_by_path(conn, index, file_path))
    }
}

#[async_trait]
impl IndexStore for SqliteIndexStore {
    async fn index_exists(&self, index: &str) -> Result<bool, AppError> {
        self.with_conn(|conn| index_exists(conn, index))
    }

    async fn create_index(&self, index: &str) -> Result<(), AppError> {
        self.with_conn(|conn| create_index(conn, index))
    }

    async fn submit_document(&self, index: &str, doc: &IndexedFile) -> Result<(), AppError> {
        self.with_conn(|conn| upsert_document(conn, index, doc).map(|_| ()))
    }

    async fn query(
        &self,
        index: &str,
        keyword: &str,
        size: usize,
    ) -> Result<Vec<SearchHit>, AppError> {
        self.with_conn(|conn| search_by_name(conn, index, keyword, size))
    }

    async fn count_documents(&self, index: &str) -> Result<usize, AppError> {
        self.with_conn(|conn| count_documents(conn, index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::migrations::run_migrations;

    fn setup_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn doc(path: &str) -> IndexedFile {
        let name = path.rsplit('/').next().unwrap();
        IndexedFile {
            file_name: name.to_string(),
            file_path: path.to_string(),
            relative_path: path.trim_start_matches("/docs/").to_string(),
        }
    }

    #[test]
    fn test_create_index_idempotent() {
        let conn = setup_db();
        assert!(!index_exists(&conn, "file_index").unwrap());

        create_index(&conn, "file_index").unwrap();
        create_index(&conn, "file_index").unwrap();

        assert!(index_exists(&conn, "file_index").unwrap());
        assert!(!index_exists(&conn, "other").unwrap());
    }

    #[test]
    fn test_upsert_replaces_same_path() {
        let conn = setup_db();
        let mut file = doc("/docs/a/readme.md");

        let first = upsert_document(&conn, "idx", &file).unwrap();
        file.relative_path = "moved/readme.md".to_string();
        let second = upsert_document(&conn, "idx", &file).unwrap();

        assert_eq!(first, second);
        assert_eq!(count_documents(&conn, "idx").unwrap(), 1);
        let fetched = get_by_path(&conn, "idx", "/docs/a/readme.md").unwrap().unwrap();
        assert_eq!(fetched.relative_path, "moved/readme.md");

        let hits = search_by_name(&conn, "idx", "readme", 10).unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_search_ranks_shorter_names_first() {
        let conn = setup_db();
        upsert_document(&conn, "idx", &doc("/docs/report_old.pdf")).unwrap();
        upsert_document(&conn, "idx", &doc("/docs/report.pdf")).unwrap();
        upsert_document(&conn, "idx", &doc("/docs/notes.txt")).unwrap();

        let hits = search_by_name(&conn, "idx", "report", 10).unwrap();
        let paths: Vec<&str> = hits.iter().map(|h| h.file_path.as_str()).collect();
        assert_eq!(paths, vec!["/docs/report.pdf", "/docs/report_old.pdf"]);
        assert!(hits[0].score >= hits[1].score);
        assert!(hits.iter().all(|h| h.score > 0.0));
    }

    #[test]
    fn test_search_matches_any_query_term() {
        let conn = setup_db();
        upsert_document(&conn, "idx", &doc("/docs/budget.xlsx")).unwrap();
        upsert_document(&conn, "idx", &doc("/docs/holiday.jpg")).unwrap();

        let hits = search_by_name(&conn, "idx", "Open the budget please.", 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].file_path, "/docs/budget.xlsx");
    }

    #[test]
    fn test_search_cjk_names() {
        let conn = setup_db();
        upsert_document(&conn, "idx", &doc("/docs/年度报告.pdf")).unwrap();
        upsert_document(&conn, "idx", &doc("/docs/会议纪要.docx")).unwrap();

        let hits = search_by_name(&conn, "idx", "报告", 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].file_path, "/docs/年度报告.pdf");
    }

    #[test]
    fn test_search_is_scoped_to_index() {
        let conn = setup_db();
        upsert_document(&conn, "a", &doc("/docs/report.pdf")).unwrap();
        upsert_document(&conn, "b", &doc("/other/report.pdf")).unwrap();

        let hits = search_by_name(&conn, "a", "report", 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].file_path, "/docs/report.pdf");
        assert!(search_by_name(&conn, "missing", "report", 10).unwrap().is_empty());
    }

    #[test]
    fn test_search_respects_limit_and_empty_keyword() {
        let conn = setup_db();
        for i in 0..30 {
            upsert_document(&conn, "idx", &doc(&format!("/docs/common_file_{i}.txt"))).unwrap();
        }

        assert_eq!(search_by_name(&conn, "idx", "common", 5).unwrap().len(), 5);
        assert!(search_by_name(&conn, "idx", "", 5).unwrap().is_empty());
        assert!(search_by_name(&conn, "idx", "  ?! ", 5).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_trait_round_trip() {
        let store = SqliteIndexStore::open_in_memory().unwrap();
        assert!(!store.index_exists("file_index").await.unwrap());
        store.create_index("file_index").await.unwrap();
        store
            .submit_document("file_index", &doc("/docs/notes.txt"))
            .await
            .unwrap();

        assert_eq!(store.count_documents("file_index").await.unwrap(), 1);
        let hits = store.query("file_index", "notes", 100).await.unwrap();
        assert_eq!(hits[0].file_path, "/docs/notes.txt");
    }

    #[test]
    fn test_open_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("echofind.db");
        let store = SqliteIndexStore::open(&path).unwrap();
        assert!(path.exists());
        assert!(store.get_by_path("idx", "/nope").unwrap().is_none());
    }
}
