use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::data::IndexStore;
use crate::error::AppError;
use crate::models::file_entry::IndexedFile;

const PROGRESS_EVERY: usize = 50;

#[derive(Debug, Clone, Serialize)]
pub struct IndexReport {
    pub index_name: String,
    pub root: PathBuf,
    pub indexed: usize,
    pub skipped: usize,
    pub finished_at: String,
}

/// Creates `index_name` if the store does not have it yet. Returns whether
/// it had to be created.
pub async fn ensure_index(store: &dyn IndexStore, index_name: &str) -> Result<bool, AppError> {
    if store.index_exists(index_name).await? {
        return Ok(false);
    }
    store.create_index(index_name).await?;
    Ok(true)
}

/// Every regular file below `root`, plus the number of entries that could
/// not be read, were neither files nor directories (symlinks, sockets) or
/// have a path that is not valid UTF-8.
pub fn collect_files(root: &Path) -> (Vec<IndexedFile>, usize) {
    let mut files = Vec::new();
    let mut skipped = 0usize;

    for entry in walkdir::WalkDir::new(root).min_depth(1).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("skipping unreadable entry: {e}");
                skipped += 1;
                continue;
            }
        };

        let file_type = entry.file_type();
        if file_type.is_dir() {
            continue;
        }
        if !file_type.is_file() {
            tracing::debug!(path = %entry.path().display(), "skipping non-regular entry");
            skipped += 1;
            continue;
        }

        match IndexedFile::from_path(root, entry.path()) {
            Some(doc) => files.push(doc),
            None => {
                tracing::warn!(path = %entry.path().display(), "skipping file with non UTF-8 path");
                skipped += 1;
            }
        }
    }

    (files, skipped)
}

#[cfg(test)]
pub async fn index_directory(
    store: &dyn IndexStore,
    root: &Path,
    index_name: &str,
) -> Result<IndexReport, AppError> {
    index_directory_with_progress(store, root, index_name, |_, _| {}).await
}

/// Walks `root` and submits one document per regular file. Fails with
/// [`AppError::PathNotFound`] before touching the store when `root` is not
/// a directory. Submission is not transactional: a store failure midway
/// leaves the documents submitted so far in place.
pub async fn index_directory_with_progress<F>(
    store: &dyn IndexStore,
    root: &Path,
    index_name: &str,
    on_progress: F,
) -> Result<IndexReport, AppError>
where
    F: Fn(usize, usize) + Send + Sync,
{
    if !root.is_dir() {
        return Err(AppError::PathNotFound(root.display().to_string()));
    }
    let root = root.canonicalize()?;

    if ensure_index(store, index_name).await? {
        tracing::info!(index = index_name, "created missing index");
    }

    let walk_root = root.clone();
    let (files, skipped) = tokio::task::spawn_blocking(move || collect_files(&walk_root))
        .await
        .map_err(|e| AppError::General(format!("directory walk failed: {e}")))?;

    let total = files.len();
    on_progress(0, total);

    for (i, doc) in files.iter().enumerate() {
        store.submit_document(index_name, doc).await?;
        let processed = i + 1;
        if processed % PROGRESS_EVERY == 0 {
            on_progress(processed, total);
        }
    }
    on_progress(total, total);

    tracing::info!(
        root = %root.display(),
        index = index_name,
        indexed = total,
        skipped,
        "indexing finished"
    );

    Ok(IndexReport {
        index_name: index_name.to_string(),
        root,
        indexed: total,
        skipped,
        finished_at: chrono::Utc::now().to_rfc3339(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::repository::SqliteIndexStore;
    use std::fs;
    use std::sync::Mutex;

    fn canonical(p: &Path) -> String {
        p.canonicalize().unwrap().to_string_lossy().to_string()
    }

    #[tokio::test]
    async fn test_indexes_nested_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("sub/deeper")).unwrap();
        fs::write(dir.path().join("a.txt"), "aaa").unwrap();
        fs::write(dir.path().join("sub/b.txt"), "bbb").unwrap();
        fs::write(dir.path().join("sub/deeper/c.md"), "ccc").unwrap();

        let store = SqliteIndexStore::open_in_memory().unwrap();
        let report = index_directory(&store, dir.path(), "file_index").await.unwrap();

        assert_eq!(report.indexed, 3);
        assert_eq!(report.skipped, 0);
        assert!(store.index_exists("file_index").await.unwrap());

        let c = store
            .get_by_path("file_index", &canonical(&dir.path().join("sub/deeper/c.md")))
            .unwrap()
            .expect("nested file should be indexed");
        assert_eq!(c.file_name, "c.md");
        assert_eq!(
            Path::new(&c.relative_path),
            Path::new("sub").join("deeper").join("c.md")
        );
    }

    #[tokio::test]
    async fn test_every_indexed_name_is_searchable() {
        let dir = tempfile::tempdir().unwrap();
        let names = ["alpha.txt", "beta_report.pdf", "gamma.tar.gz", "報告.docx"];
        fs::create_dir_all(dir.path().join("nested")).unwrap();
        for (i, name) in names.iter().enumerate() {
            let target = if i % 2 == 0 {
                dir.path().join(name)
            } else {
                dir.path().join("nested").join(name)
            };
            fs::write(target, "x").unwrap();
        }

        let store = SqliteIndexStore::open_in_memory().unwrap();
        index_directory(&store, dir.path(), "file_index").await.unwrap();

        for (i, name) in names.iter().enumerate() {
            let expected = if i % 2 == 0 {
                canonical(&dir.path().join(name))
            } else {
                canonical(&dir.path().join("nested").join(name))
            };
            let hits = store.query("file_index", name, 100).await.unwrap();
            assert!(
                hits.iter().any(|h| h.file_path == expected),
                "{name} should be found by its exact name"
            );
        }
    }

    #[tokio::test]
    async fn test_missing_root_leaves_index_untouched() {
        let store = SqliteIndexStore::open_in_memory().unwrap();
        let err = index_directory(&store, Path::new("/nonexistent/echofind_root"), "file_index")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::PathNotFound(_)));
        assert!(!store.index_exists("file_index").await.unwrap());
        assert_eq!(store.count_documents("file_index").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_file_as_root_is_path_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain.txt");
        fs::write(&file, "x").unwrap();

        let store = SqliteIndexStore::open_in_memory().unwrap();
        let err = index_directory(&store, &file, "file_index").await.unwrap_err();
        assert!(matches!(err, AppError::PathNotFound(_)));
    }

    #[tokio::test]
    async fn test_reindexing_does_not_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::write(dir.path().join("b.txt"), "b").unwrap();

        let store = SqliteIndexStore::open_in_memory().unwrap();
        index_directory(&store, dir.path(), "file_index").await.unwrap();
        index_directory(&store, dir.path(), "file_index").await.unwrap();

        assert_eq!(store.count_documents("file_index").await.unwrap(), 2);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlinks_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("real.txt"), "x").unwrap();
        std::os::unix::fs::symlink(dir.path().join("real.txt"), dir.path().join("link.txt"))
            .unwrap();

        let store = SqliteIndexStore::open_in_memory().unwrap();
        let report = index_directory(&store, dir.path(), "file_index").await.unwrap();

        assert_eq!(report.indexed, 1);
        assert_eq!(report.skipped, 1);
        let hits = store.query("file_index", "link", 10).await.unwrap();
        assert!(hits.is_empty());
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_non_utf8_names_are_skipped() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("good.txt"), "x").unwrap();
        fs::write(dir.path().join(OsStr::from_bytes(b"bad\xff.txt")), "x").unwrap();

        let store = SqliteIndexStore::open_in_memory().unwrap();
        let report = index_directory(&store, dir.path(), "file_index").await.unwrap();

        assert_eq!(report.indexed, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(store.count_documents("file_index").await.unwrap(), 1);
        let hits = store.query("file_index", "bad", 10).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_progress_reaches_total() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..120 {
            fs::write(dir.path().join(format!("f{i}.txt")), "x").unwrap();
        }

        let store = SqliteIndexStore::open_in_memory().unwrap();
        let seen = Mutex::new(Vec::new());
        index_directory_with_progress(&store, dir.path(), "file_index", |done, total| {
            seen.lock().unwrap().push((done, total));
        })
        .await
        .unwrap();

        let seen = seen.into_inner().unwrap();
        assert_eq!(seen.first(), Some(&(0, 120)));
        assert!(seen.contains(&(50, 120)));
        assert_eq!(seen.last(), Some(&(120, 120)));
    }

    #[test]
    fn test_collect_files_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        let (files, skipped) = collect_files(dir.path());
        assert!(files.is_empty());
        assert_eq!(skipped, 0);
    }
}
