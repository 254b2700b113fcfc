use std::collections::HashSet;

use crate::data::IndexStore;
use crate::error::AppError;
use crate::models::search::SearchHit;

pub const DEFAULT_MAX_RESULTS: usize = 100;

/// Orders hits by descending score. Equal scores keep retrieval order.
pub fn rank_hits(mut hits: Vec<SearchHit>) -> Vec<SearchHit> {
    hits.sort_by(|a, b| b.score.total_cmp(&a.score));
    hits
}

/// Keeps the first occurrence of every path.
pub fn dedup_by_path(hits: Vec<SearchHit>) -> Vec<SearchHit> {
    let mut seen = HashSet::new();
    hits.into_iter()
        .filter(|hit| seen.insert(hit.file_path.clone()))
        .collect()
}

/// Ranked, deduplicated hits for `keyword` against the names in `index_name`.
pub async fn search_hits(
    store: &dyn IndexStore,
    keyword: &str,
    index_name: &str,
    max_results: usize,
) -> Result<Vec<SearchHit>, AppError> {
    let trimmed = keyword.trim();
    if trimmed.is_empty() || max_results == 0 {
        return Ok(Vec::new());
    }

    let hits = store.query(index_name, trimmed, max_results).await?;
    tracing::debug!(keyword = trimmed, hits = hits.len(), "index query returned");
    Ok(dedup_by_path(rank_hits(hits)))
}

/// Unique file paths matching `keyword`, most relevant first.
pub async fn search(
    store: &dyn IndexStore,
    keyword: &str,
    index_name: &str,
    max_results: usize,
) -> Result<Vec<String>, AppError> {
    let hits = search_hits(store, keyword, index_name, max_results).await?;
    Ok(hits.into_iter().map(|hit| hit.file_path).collect())
}
