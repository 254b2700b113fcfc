use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;

use crate::error::AppError;
use crate::models::transcription::{AudioInput, GenerationConfig, RawSegment};

/// Speech-to-text capability. Returns raw segments, engine markup included.
#[async_trait]
pub trait SpeechEngine: Send + Sync {
    async fn generate(
        &self,
        audio: &AudioInput,
        config: &GenerationConfig,
    ) -> Result<Vec<RawSegment>, AppError>;
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    result: Vec<RawSegment>,
}

/// Client for a speech recognition server that accepts multipart uploads.
pub struct HttpSpeechEngine {
    client: Client,
    endpoint: String,
}

impl HttpSpeechEngine {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("http client: {e}")))?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }
}

fn build_form(name: String, data: Vec<u8>, config: &GenerationConfig) -> Form {
    Form::new()
        .part("audio", Part::bytes(data).file_name(name))
        .text("language", config.language.clone())
        .text("use_itn", config.use_itn.to_string())
        .text(
            "max_single_segment_time",
            (config.max_segment_seconds * 1000).to_string(),
        )
        .text("batch_size_s", config.batch_seconds.to_string())
        .text("merge_vad", config.merge_vad.to_string())
        .text("merge_length_s", config.merge_seconds.to_string())
        .text("device", config.device.to_string())
}

#[async_trait]
impl SpeechEngine for HttpSpeechEngine {
    async fn generate(
        &self,
        audio: &AudioInput,
        config: &GenerationConfig,
    ) -> Result<Vec<RawSegment>, AppError> {
        let data = audio.read().await?;
        tracing::debug!(bytes = data.len(), endpoint = %self.endpoint, "sending audio to engine");

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(build_form(audio.name(), data, config))
            .send()
            .await
            .map_err(|e| AppError::EngineUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body: String = response
                .text()
                .await
                .unwrap_or_default()
                .chars()
                .take(300)
                .collect();
            return Err(AppError::EngineUnavailable(format!(
                "engine returned {status}: {body}"
            )));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AppError::EngineUnavailable(format!("malformed engine response: {e}")))?;
        Ok(parsed.result)
    }
}
