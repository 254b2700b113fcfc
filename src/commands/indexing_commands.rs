use serde::Serialize;

use crate::error::AppError;
use crate::services::indexing_service::{self, IndexReport};
use crate::state::AppState;

/// What the store itself knows about the configured index. Indexing progress
/// lives only in the process running the indexer and is not part of this.
#[derive(Debug, Clone, Serialize)]
pub struct IndexStatus {
    pub index_name: String,
    pub exists: bool,
    pub documents: usize,
}

fn progress_status(processed: usize, total: usize) -> &'static str {
    if total == 0 || processed >= total {
        "done"
    } else {
        "active"
    }
}

/// Indexes the configured root into the configured index.
pub async fn start_indexing(state: &AppState) -> Result<IndexReport, AppError> {
    let root = state.config.root_dir.clone();
    let index_name = state.config.index_name.clone();
    tracing::info!(root = %root.display(), index = %index_name, "indexing started");
    state.set_indexing_status(0, 0, "starting");

    let result = indexing_service::index_directory_with_progress(
        state.store.as_ref(),
        &root,
        &index_name,
        |processed, total| {
            state.set_indexing_status(processed, total, progress_status(processed, total));
        },
    )
    .await;

    match result {
        Ok(report) => Ok(report),
        Err(err) => {
            let status = state.indexing_status();
            state.set_indexing_status(status.processed, status.total, "failed");
            Err(err.log())
        }
    }
}

pub async fn get_index_status(state: &AppState) -> Result<IndexStatus, AppError> {
    let index_name = state.config.index_name.clone();
    let exists = state.store.index_exists(&index_name).await?;
    let documents = if exists {
        state.store.count_documents(&index_name).await?
    } else {
        0
    };

    Ok(IndexStatus {
        index_name,
        exists,
        documents,
    })
}
