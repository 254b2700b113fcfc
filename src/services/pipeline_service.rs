use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::data::IndexStore;
use crate::error::AppError;
use crate::models::pipeline::{PipelineOutcome, PipelineResult, PipelineStage};
use crate::models::transcription::AudioInput;
use crate::services::search_service;
use crate::services::transcription_service::Transcriber;

/// Voice query pipeline: transcribe, search, fill the result slots.
pub struct Pipeline {
    transcriber: Transcriber,
    store: Arc<dyn IndexStore>,
    index_name: String,
    max_results: usize,
    stage_timeout: Option<Duration>,
}

impl Pipeline {
    pub fn new(transcriber: Transcriber, store: Arc<dyn IndexStore>, index_name: &str) -> Self {
        Self {
            transcriber,
            store,
            index_name: index_name.to_string(),
            max_results: search_service::DEFAULT_MAX_RESULTS,
            stage_timeout: None,
        }
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_stage_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.stage_timeout = timeout;
        self
    }

    async fn run_stage<T, F>(&self, stage: PipelineStage, fut: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, AppError>>,
    {
        tracing::debug!(%stage, "entering stage");
        match self.stage_timeout {
            Some(limit) => tokio::time::timeout(limit, fut)
                .await
                .map_err(|_| AppError::Timeout(stage))?,
            None => fut.await,
        }
    }

    /// Single pass over the audio. No speech and no matches both produce a
    /// well-formed empty result; store or engine failures are returned as
    /// errors.
    pub async fn process(&self, audio: &AudioInput) -> Result<PipelineResult, AppError> {
        tracing::debug!(stage = %PipelineStage::Start, audio = %audio.name(), "pipeline started");
        let transcript = self
            .run_stage(PipelineStage::Transcribing, self.transcriber.transcribe(audio))
            .await?;

        let Some(transcript) = transcript else {
            tracing::debug!(stage = %PipelineStage::Done, "recognition failed");
            return Ok(PipelineResult::empty(PipelineOutcome::RecognitionFailed));
        };
        tracing::info!(%transcript, "transcribed voice query");

        let paths = self
            .run_stage(
                PipelineStage::Searching,
                search_service::search(
                    self.store.as_ref(),
                    &transcript,
                    &self.index_name,
                    self.max_results,
                ),
            )
            .await?;

        tracing::debug!(stage = %PipelineStage::Done, matches = paths.len(), "pipeline finished");
        if paths.is_empty() {
            return Ok(PipelineResult::empty(PipelineOutcome::NoMatches { transcript }));
        }

        let total_matches = paths.len();
        Ok(PipelineResult::from_ranked(
            &paths,
            PipelineOutcome::Matched {
                transcript,
                total_matches,
            },
        ))
    }
}
