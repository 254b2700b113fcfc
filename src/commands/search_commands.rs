use std::path::PathBuf;

use crate::error::AppError;
use crate::models::pipeline::PipelineResult;
use crate::models::transcription::AudioInput;
use crate::services::search_service;
use crate::state::AppState;

pub async fn search(
    state: &AppState,
    query: &str,
    limit: Option<usize>,
) -> Result<Vec<String>, AppError> {
    search_service::search(
        state.store.as_ref(),
        query,
        &state.config.index_name,
        limit.unwrap_or(state.config.max_results),
    )
    .await
    .map_err(AppError::log)
}

/// Runs the voice pipeline on an uploaded audio file.
pub async fn search_by_voice(state: &AppState, audio: PathBuf) -> Result<PipelineResult, AppError> {
    state
        .pipeline
        .process(&AudioInput::File(audio))
        .await
        .map_err(AppError::log)
}
