use serde::Serialize;

use crate::models::pipeline::PipelineStage;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Path not found: {0}")]
    PathNotFound(String),

    #[error("Index store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Speech engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("{0} stage timed out")]
    Timeout(PipelineStage),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("{0}")]
    General(String),
}

impl AppError {
    pub fn log(self) -> Self {
        tracing::error!("{self}");
        self
    }
}

impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
