use std::sync::Arc;

use crate::error::AppError;
use crate::models::transcription::{AudioInput, GenerationConfig};
use crate::services::postprocess;
use crate::services::speech_engine::SpeechEngine;

pub struct Transcriber {
    engine: Arc<dyn SpeechEngine>,
    config: GenerationConfig,
}

impl Transcriber {
    pub fn new(engine: Arc<dyn SpeechEngine>, config: GenerationConfig) -> Self {
        Self { engine, config }
    }

    /// Normalized transcript, or `None` when the engine recognised no speech.
    /// Engine failures are errors, not `None`.
    pub async fn transcribe(&self, audio: &AudioInput) -> Result<Option<String>, AppError> {
        let segments = self.engine.generate(audio, &self.config).await?;

        let text = segments
            .iter()
            .map(|segment| postprocess::normalize(&segment.text))
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        if text.is_empty() {
            tracing::warn!(audio = %audio.name(), "no speech recognized");
            return Ok(None);
        }
        Ok(Some(text))
    }
}
