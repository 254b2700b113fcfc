pub mod elasticsearch;
pub mod migrations;
pub mod repository;
pub mod tokenizer;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::file_entry::IndexedFile;
use crate::models::search::SearchHit;

/// The document store the indexer writes to and the search client reads from.
///
/// Implementations own persistence and relevance scoring. Documents are
/// keyed by `(index, file_path)`: submitting the same path twice replaces
/// the earlier document.
#[async_trait]
pub trait IndexStore: Send + Sync {
    async fn index_exists(&self, index: &str) -> Result<bool, AppError>;

    async fn create_index(&self, index: &str) -> Result<(), AppError>;

    async fn submit_document(&self, index: &str, doc: &IndexedFile) -> Result<(), AppError>;

    /// Documents whose `file_name` matches `keyword`, best first, at most `size`.
    async fn query(&self, index: &str, keyword: &str, size: usize)
        -> Result<Vec<SearchHit>, AppError>;

    async fn count_documents(&self, index: &str) -> Result<usize, AppError>;
}
